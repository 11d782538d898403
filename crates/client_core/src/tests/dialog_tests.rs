use super::*;

fn harry() -> EmployeeRecord {
    EmployeeRecord::new("e0001", "hpotter", "Harry Potter", 1234.0)
}

fn ids(raw: &[&str]) -> Vec<EmployeeId> {
    raw.iter().map(|id| EmployeeId::new(*id)).collect()
}

#[test]
fn starts_closed_with_nothing_to_draw() {
    let controller = DialogController::new();
    assert!(controller.state().is_closed());
    assert!(controller.view().is_none());
}

#[test]
fn opening_a_second_dialog_is_rejected() {
    let mut controller = DialogController::new();
    controller.open_upload().expect("open upload");

    assert_eq!(
        controller.request_delete(ids(&["e0001"])),
        Err(DialogError::DialogBusy)
    );
    assert_eq!(controller.open_edit(&harry()), Err(DialogError::DialogBusy));
    assert_eq!(controller.open_upload(), Err(DialogError::DialogBusy));
    assert_eq!(
        controller.state(),
        &DialogState::UploadCsv { file: None }
    );
}

#[test]
fn upload_confirm_requires_an_attached_file() {
    let mut controller = DialogController::new();
    controller.open_upload().expect("open upload");

    assert_eq!(controller.confirm(), Err(DialogError::MissingFile));
    assert_eq!(
        controller.state(),
        &DialogState::UploadCsv { file: None }
    );

    let csv = CsvUpload::new("staff.csv", b"login,name,salary\n".to_vec());
    controller.attach_csv(csv.clone()).expect("attach");
    assert_eq!(controller.confirm(), Ok(PendingMutation::Create(csv)));
    assert!(controller.state().is_closed());
}

#[test]
fn attaching_outside_upload_dialog_fails() {
    let mut controller = DialogController::new();
    let csv = CsvUpload::new("staff.csv", Vec::new());
    assert_eq!(controller.attach_csv(csv), Err(DialogError::NotUploading));
}

#[test]
fn cancelling_upload_drops_file_and_releases_nothing() {
    let mut controller = DialogController::new();
    controller.open_upload().expect("open upload");
    controller
        .attach_csv(CsvUpload::new("staff.csv", b"x".to_vec()))
        .expect("attach");

    controller.cancel().expect("cancel");
    assert!(controller.state().is_closed());

    controller.open_upload().expect("reopen upload");
    assert_eq!(
        controller.state(),
        &DialogState::UploadCsv { file: None }
    );
}

#[test]
fn delete_of_empty_selection_never_opens() {
    let mut controller = DialogController::new();
    assert_eq!(
        controller.request_delete(Vec::new()),
        Err(DialogError::EmptySelection)
    );
    assert!(controller.state().is_closed());
}

#[test]
fn confirming_delete_releases_the_captured_ids() {
    let mut controller = DialogController::new();
    controller
        .request_delete(ids(&["e0001", "e0002"]))
        .expect("request delete");

    let view = controller.view().expect("dialog view");
    assert_eq!(view.title, "Delete selected");
    assert_eq!(view.buttons[0].label, "No");
    assert_eq!(view.buttons[1].label, "Yes");

    assert_eq!(
        controller.confirm(),
        Ok(PendingMutation::DeleteMany(ids(&["e0001", "e0002"])))
    );
}

#[test]
fn single_row_delete_uses_singular_prompt() {
    let mut controller = DialogController::new();
    controller
        .request_delete(ids(&["e0001"]))
        .expect("request delete");
    let view = controller.view().expect("dialog view");
    assert_eq!(view.title, "Delete employee");
    assert_eq!(
        view.content,
        "Are you sure you want to delete this employee?"
    );
}

#[test]
fn edits_mutate_a_copy_of_the_row() {
    let original = harry();
    let mut controller = DialogController::new();
    controller.open_edit(&original).expect("open edit");
    controller
        .edit_field(EditField::Name, "Harry J. Potter")
        .expect("edit name");
    controller
        .edit_field(EditField::Login, "hjpotter")
        .expect("edit login");
    controller
        .edit_field(EditField::Salary, "4200.50")
        .expect("edit salary");

    let PendingMutation::Update(draft) = controller.confirm().expect("confirm") else {
        panic!("expected update");
    };
    assert_eq!(draft.id, original.id);
    assert_eq!(draft.name, "Harry J. Potter");
    assert_eq!(draft.login, "hjpotter");
    assert_eq!(draft.salary, 4200.5);
    assert_eq!(original.name, "Harry Potter");
}

#[test]
fn non_numeric_salary_is_coerced_to_zero() {
    let mut controller = DialogController::new();
    controller.open_edit(&harry()).expect("open edit");
    controller
        .edit_field(EditField::Salary, "lots")
        .expect("edit salary");

    let Some(PendingMutation::Update(draft)) = controller.confirm().ok() else {
        panic!("expected update");
    };
    assert_eq!(draft.salary, 0.0);
}

#[test]
fn coerce_salary_rejects_negative_and_non_finite_input() {
    assert_eq!(coerce_salary(" 12.5 "), 12.5);
    assert_eq!(coerce_salary("-3"), 0.0);
    assert_eq!(coerce_salary("inf"), 0.0);
    assert_eq!(coerce_salary(""), 0.0);
}

#[test]
fn edit_field_requires_open_edit_dialog() {
    let mut controller = DialogController::new();
    assert_eq!(
        controller.edit_field(EditField::Name, "x"),
        Err(DialogError::NotEditing)
    );
}

#[test]
fn outcome_opens_notify_and_acknowledge_closes_it() {
    let mut controller = DialogController::new();
    controller.notify(MutationOutcome {
        kind: MutationKind::Create,
        succeeded: false,
    });

    assert_eq!(
        controller.state(),
        &DialogState::Notify {
            title: "Upload failed".into(),
            message: "File has not been uploaded".into(),
        }
    );
    assert_eq!(controller.confirm(), Err(DialogError::NotConfirmable));

    controller.acknowledge().expect("acknowledge");
    assert!(controller.state().is_closed());
    assert_eq!(controller.acknowledge(), Err(DialogError::NoNotification));
}

#[test]
fn outcome_waits_while_another_dialog_is_open() {
    let mut controller = DialogController::new();
    controller.open_edit(&harry()).expect("open edit");

    controller.notify(MutationOutcome {
        kind: MutationKind::DeleteMany,
        succeeded: true,
    });
    assert!(matches!(controller.state(), DialogState::Edit { .. }));
    assert_eq!(controller.queued_notices(), 1);

    controller.cancel().expect("cancel edit");
    assert_eq!(
        controller.state(),
        &DialogState::Notify {
            title: "Deletion successful".into(),
            message: "Employees have been successfully deleted".into(),
        }
    );
    assert_eq!(controller.queued_notices(), 0);
}

#[test]
fn queued_notices_surface_one_at_a_time() {
    let mut controller = DialogController::new();
    controller.notify(MutationOutcome {
        kind: MutationKind::Update,
        succeeded: true,
    });
    controller.notify(MutationOutcome {
        kind: MutationKind::Create,
        succeeded: true,
    });

    let first = controller.view().expect("first notice");
    assert_eq!(first.title, "Update successful");
    assert_eq!(first.buttons.len(), 1);

    controller.acknowledge().expect("ack first");
    let second = controller.view().expect("second notice");
    assert_eq!(second.title, "Upload successful");

    controller.acknowledge().expect("ack second");
    assert!(controller.state().is_closed());
}

#[test]
fn cancel_with_nothing_open_fails() {
    let mut controller = DialogController::new();
    assert_eq!(controller.cancel(), Err(DialogError::NoDialogOpen));
    assert_eq!(controller.confirm(), Err(DialogError::NoDialogOpen));
}

#[test]
fn selection_deduplicates_and_keeps_order() {
    let mut selection = SelectionState::default();
    selection.replace(ids(&["b", "a", "b"]));
    assert_eq!(selection.ids(), ids(&["b", "a"]).as_slice());
    assert_eq!(selection.len(), 2);

    selection.clear();
    assert!(selection.is_empty());
}
