//! Row selection and the single-modal dialog state machine.
//!
//! Every dialog opens from and returns to [`DialogState::Closed`]; no
//! transition goes straight from one open dialog to another. Confirming a
//! dialog closes it and hands back the [`PendingMutation`] the caller has to
//! run; the result of that run comes back in through
//! [`DialogController::notify`].

use std::collections::VecDeque;

use shared::domain::{EmployeeId, EmployeeRecord};
use tracing::warn;

use crate::{error::DialogError, gateway::CsvUpload};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    UploadCsv {
        file: Option<CsvUpload>,
    },
    ConfirmDelete {
        ids: Vec<EmployeeId>,
    },
    Edit {
        draft: EmployeeRecord,
    },
    Notify {
        title: String,
        message: String,
    },
}

impl DialogState {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Login,
    Name,
    Salary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    DeleteMany,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::DeleteMany => "delete_many",
        }
    }

    fn notice(&self, succeeded: bool) -> Notice {
        let (title, message) = match (self, succeeded) {
            (Self::Create, true) => ("Upload successful", "File has been successfully uploaded"),
            (Self::Create, false) => ("Upload failed", "File has not been uploaded"),
            (Self::Update, true) => (
                "Update successful",
                "Employee has been successfully updated",
            ),
            (Self::Update, false) => ("Update failed", "Employee has not been updated"),
            (Self::DeleteMany, true) => (
                "Deletion successful",
                "Employees have been successfully deleted",
            ),
            (Self::DeleteMany, false) => ("Deletion failed", "Employees have not been deleted"),
        };
        Notice {
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Network action released by confirming a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    Create(CsvUpload),
    Update(EmployeeRecord),
    DeleteMany(Vec<EmployeeId>),
}

impl PendingMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update(_) => MutationKind::Update,
            Self::DeleteMany(_) => MutationKind::DeleteMany,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub succeeded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    title: String,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    Cancel,
    Confirm,
    Acknowledge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogButton {
    pub action: DialogAction,
    pub label: &'static str,
}

/// What a host needs to draw the open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: String,
    pub content: String,
    pub buttons: Vec<DialogButton>,
}

const CANCEL_OK: [DialogButton; 2] = [
    DialogButton {
        action: DialogAction::Cancel,
        label: "Cancel",
    },
    DialogButton {
        action: DialogAction::Confirm,
        label: "Ok",
    },
];

const NO_YES: [DialogButton; 2] = [
    DialogButton {
        action: DialogAction::Cancel,
        label: "No",
    },
    DialogButton {
        action: DialogAction::Confirm,
        label: "Yes",
    },
];

const OK: [DialogButton; 1] = [DialogButton {
    action: DialogAction::Acknowledge,
    label: "Ok",
}];

/// Ids currently checked in the grid, in check order and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    ids: Vec<EmployeeId>,
}

impl SelectionState {
    pub fn replace(&mut self, ids: impl IntoIterator<Item = EmployeeId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[EmployeeId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Default)]
pub struct DialogController {
    state: DialogState,
    queued_notices: VecDeque<Notice>,
}

impl DialogController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn queued_notices(&self) -> usize {
        self.queued_notices.len()
    }

    pub fn open_upload(&mut self) -> Result<(), DialogError> {
        self.open(DialogState::UploadCsv { file: None })
    }

    pub fn attach_csv(&mut self, upload: CsvUpload) -> Result<(), DialogError> {
        match &mut self.state {
            DialogState::UploadCsv { file } => {
                *file = Some(upload);
                Ok(())
            }
            _ => Err(DialogError::NotUploading),
        }
    }

    pub fn request_delete(&mut self, ids: Vec<EmployeeId>) -> Result<(), DialogError> {
        if ids.is_empty() {
            return Err(DialogError::EmptySelection);
        }
        self.open(DialogState::ConfirmDelete { ids })
    }

    pub fn open_edit(&mut self, record: &EmployeeRecord) -> Result<(), DialogError> {
        self.open(DialogState::Edit {
            draft: record.clone(),
        })
    }

    pub fn edit_field(&mut self, field: EditField, raw: &str) -> Result<(), DialogError> {
        let DialogState::Edit { draft } = &mut self.state else {
            return Err(DialogError::NotEditing);
        };
        match field {
            EditField::Login => draft.login = raw.to_string(),
            EditField::Name => draft.name = raw.to_string(),
            EditField::Salary => draft.salary = coerce_salary(raw),
        }
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<PendingMutation, DialogError> {
        let mutation = match std::mem::take(&mut self.state) {
            DialogState::UploadCsv { file: Some(file) } => PendingMutation::Create(file),
            DialogState::ConfirmDelete { ids } => PendingMutation::DeleteMany(ids),
            DialogState::Edit { draft } => PendingMutation::Update(draft),
            DialogState::Closed => return Err(DialogError::NoDialogOpen),
            unconfirmable => {
                let err = match unconfirmable {
                    DialogState::UploadCsv { .. } => DialogError::MissingFile,
                    _ => DialogError::NotConfirmable,
                };
                self.state = unconfirmable;
                return Err(err);
            }
        };
        self.close();
        Ok(mutation)
    }

    /// Closes whatever is open without releasing its mutation.
    pub fn cancel(&mut self) -> Result<(), DialogError> {
        if self.state.is_closed() {
            return Err(DialogError::NoDialogOpen);
        }
        self.close();
        Ok(())
    }

    pub fn acknowledge(&mut self) -> Result<(), DialogError> {
        if !matches!(self.state, DialogState::Notify { .. }) {
            return Err(DialogError::NoNotification);
        }
        self.close();
        Ok(())
    }

    /// Shows the outcome right away when nothing else is open, otherwise
    /// holds it until the open dialog closes.
    pub fn notify(&mut self, outcome: MutationOutcome) {
        let notice = outcome.kind.notice(outcome.succeeded);
        if self.state.is_closed() {
            self.show(notice);
        } else {
            self.queued_notices.push_back(notice);
        }
    }

    pub fn view(&self) -> Option<DialogView> {
        let (title, content, buttons): (String, String, &[DialogButton]) = match &self.state {
            DialogState::Closed => return None,
            DialogState::UploadCsv { file } => (
                "Upload CSV".into(),
                file.as_ref()
                    .map(|f| f.filename.clone())
                    .unwrap_or_else(|| "Choose a .csv file to upload".into()),
                &CANCEL_OK[..],
            ),
            DialogState::ConfirmDelete { ids } if ids.len() == 1 => (
                "Delete employee".into(),
                "Are you sure you want to delete this employee?".into(),
                &NO_YES[..],
            ),
            DialogState::ConfirmDelete { .. } => (
                "Delete selected".into(),
                "Are you sure you want to delete the selected employee/s?".into(),
                &NO_YES[..],
            ),
            DialogState::Edit { draft } => (
                "Edit".into(),
                format!("{} ({})", draft.name, draft.id),
                &CANCEL_OK[..],
            ),
            DialogState::Notify { title, message } => (title.clone(), message.clone(), &OK[..]),
        };
        Some(DialogView {
            title,
            content,
            buttons: buttons.to_vec(),
        })
    }

    fn open(&mut self, next: DialogState) -> Result<(), DialogError> {
        if !self.state.is_closed() {
            return Err(DialogError::DialogBusy);
        }
        self.state = next;
        Ok(())
    }

    fn close(&mut self) {
        self.state = DialogState::Closed;
        if let Some(notice) = self.queued_notices.pop_front() {
            self.show(notice);
        }
    }

    fn show(&mut self, notice: Notice) {
        self.state = DialogState::Notify {
            title: notice.title,
            message: notice.message,
        };
    }
}

/// Unreadable, non-finite and negative input all become `0`.
pub fn coerce_salary(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            warn!(input = raw, "salary input is not a valid amount; using 0");
            0.0
        }
    }
}

#[cfg(test)]
#[path = "tests/dialog_tests.rs"]
mod tests;
