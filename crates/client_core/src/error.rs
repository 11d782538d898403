use reqwest::StatusCode;
use shared::{domain::EmployeeId, error::QueryError};
use thiserror::Error;

/// Failure of a single gateway call. Both variants are recoverable from the
/// view's point of view; neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never completed or its response could not be read.
    #[error("transport failure: {message}")]
    Transport { message: String },
    /// The server answered with a non-2xx status.
    #[error("server responded with {status}")]
    Status { status: StatusCode, body: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            Self::Transport { .. } => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    #[error("another dialog is already open")]
    DialogBusy,
    #[error("no dialog is open")]
    NoDialogOpen,
    #[error("the open dialog has no confirm action")]
    NotConfirmable,
    #[error("no notification is showing")]
    NoNotification,
    #[error("no employees selected")]
    EmptySelection,
    #[error("no CSV file attached")]
    MissingFile,
    #[error("no upload dialog is open")]
    NotUploading,
    #[error("no edit dialog is open")]
    NotEditing,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error(transparent)]
    Dialog(#[from] DialogError),
    #[error("invalid query: {0}")]
    Query(#[from] QueryError),
    #[error("employee {0} is not in the current page")]
    UnknownEmployee(EmployeeId),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
