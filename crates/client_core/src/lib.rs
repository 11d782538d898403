//! Client-side state and data flow for the employee administration screen.
//!
//! [`gateway`] talks to the REST backend, [`dialog`] owns selection and the
//! modal state machine, and [`view`] ties both to the list's query state.
//! Rendering is left to the host.

pub mod config;
pub mod context;
pub mod debounce;
pub mod dialog;
pub mod error;
pub mod gateway;
pub mod view;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use context::{AppContext, ColorMode};
pub use dialog::{
    DialogAction, DialogButton, DialogController, DialogState, DialogView, EditField,
    MutationKind, MutationOutcome, PendingMutation, SelectionState,
};
pub use error::{DialogError, GatewayError, ViewError};
pub use gateway::{CsvUpload, EmployeeGateway, EmployeePage, HttpEmployeeGateway};
pub use view::{EmployeeListView, FilterField, ViewAction, ViewEvent, ViewSnapshot};
