//! The employee list screen: query state, fetched page, selection and
//! dialogs, wired to an [`EmployeeGateway`].
//!
//! Every list request is tagged with a generation number and only the latest
//! issued generation may replace the records on screen; when that request
//! fails the page is emptied rather than left showing an older query.
//! Successful mutations always end in a full refetch of the current query.

use std::sync::Arc;

use shared::{
    domain::{EmployeeId, EmployeeRecord},
    error::QueryError,
    query::{self, QueryState, SortKey, DEFAULT_LIMIT, DEFAULT_MAX_SALARY, DEFAULT_MIN_SALARY},
};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    config::ClientSettings,
    debounce::Debouncer,
    dialog::{
        DialogController, DialogState, DialogView, EditField, MutationKind, MutationOutcome,
        PendingMutation, SelectionState,
    },
    error::{GatewayError, ViewError},
    gateway::{CsvUpload, EmployeeGateway, EmployeePage},
};

const EVENT_CAPACITY: usize = 256;

/// Text inputs in the toolbar that narrow the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Limit,
    MinSalary,
    MaxSalary,
}

#[derive(Debug, Clone)]
pub enum ViewEvent {
    QueryChanged(QueryState),
    QueryRejected { reason: String },
    RecordsReplaced { generation: u64, page: EmployeePage },
    ListFailed { generation: u64, message: String },
    SelectionChanged(Vec<EmployeeId>),
    DialogChanged(Option<DialogView>),
    MutationFinished(MutationOutcome),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub query: QueryState,
    pub page: EmployeePage,
    pub selection: Vec<EmployeeId>,
    pub dialog: DialogState,
    pub applied_generation: u64,
}

/// User gestures a host forwards to the view.
#[derive(Debug, Clone)]
pub enum ViewAction {
    Mount,
    Refresh,
    ChangeQuery(QueryState),
    ChangePage { offset: u64, limit: u32 },
    ChangeSort(SortKey),
    FilterInput { field: FilterField, raw: String },
    SelectRows(Vec<EmployeeId>),
    OpenUpload,
    AttachCsv(CsvUpload),
    RequestDelete(Vec<EmployeeId>),
    RequestDeleteSelected,
    OpenEdit(EmployeeId),
    EditField { field: EditField, raw: String },
    Confirm,
    Cancel,
    Acknowledge,
}

impl ViewAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Refresh => "refresh",
            Self::ChangeQuery(_) => "change_query",
            Self::ChangePage { .. } => "change_page",
            Self::ChangeSort(_) => "change_sort",
            Self::FilterInput { .. } => "filter_input",
            Self::SelectRows(_) => "select_rows",
            Self::OpenUpload => "open_upload",
            Self::AttachCsv(_) => "attach_csv",
            Self::RequestDelete(_) => "request_delete",
            Self::RequestDeleteSelected => "request_delete_selected",
            Self::OpenEdit(_) => "open_edit",
            Self::EditField { .. } => "edit_field",
            Self::Confirm => "confirm",
            Self::Cancel => "cancel",
            Self::Acknowledge => "acknowledge",
        }
    }
}

/// Network work left over once an action's state transition is done.
enum Deferred {
    Fetch { generation: u64, query: QueryState },
    Mutation(PendingMutation),
}

#[derive(Debug, Default)]
struct PendingFilters {
    limit: Option<String>,
    min_salary: Option<String>,
    max_salary: Option<String>,
}

impl PendingFilters {
    fn set(&mut self, field: FilterField, raw: String) {
        match field {
            FilterField::Limit => self.limit = Some(raw),
            FilterField::MinSalary => self.min_salary = Some(raw),
            FilterField::MaxSalary => self.max_salary = Some(raw),
        }
    }

    /// Cleared or unreadable inputs fall back to the field's default.
    fn apply_to(&self, mut query: QueryState) -> QueryState {
        if let Some(raw) = &self.limit {
            query.limit = raw.trim().parse().unwrap_or(DEFAULT_LIMIT);
        }
        if let Some(raw) = &self.min_salary {
            query.min_salary = parse_amount(raw).unwrap_or(DEFAULT_MIN_SALARY);
        }
        if let Some(raw) = &self.max_salary {
            query.max_salary = parse_amount(raw).unwrap_or(DEFAULT_MAX_SALARY);
        }
        query
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

struct ListViewState {
    query: QueryState,
    page: EmployeePage,
    selection: SelectionState,
    dialog: DialogController,
    pending_filters: PendingFilters,
    issued_generation: u64,
    applied_generation: u64,
}

pub struct EmployeeListView {
    gateway: Arc<dyn EmployeeGateway>,
    inner: Mutex<ListViewState>,
    filter_debounce: Debouncer,
    events: broadcast::Sender<ViewEvent>,
}

impl EmployeeListView {
    pub fn new(gateway: Arc<dyn EmployeeGateway>, settings: &ClientSettings) -> Arc<Self> {
        Self::with_query(gateway, settings, QueryState::default())
    }

    /// Starts from a query restored from a URL or a shared link.
    pub fn with_query(
        gateway: Arc<dyn EmployeeGateway>,
        settings: &ClientSettings,
        query: QueryState,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(ListViewState {
                query,
                page: EmployeePage::default(),
                selection: SelectionState::default(),
                dialog: DialogController::new(),
                pending_filters: PendingFilters::default(),
                issued_generation: 0,
                applied_generation: 0,
            }),
            filter_debounce: Debouncer::new(settings.debounce()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let guard = self.inner.lock().await;
        ViewSnapshot {
            query: guard.query,
            page: guard.page.clone(),
            selection: guard.selection.ids().to_vec(),
            dialog: guard.dialog.state().clone(),
            applied_generation: guard.applied_generation,
        }
    }

    pub async fn query(&self) -> QueryState {
        self.inner.lock().await.query
    }

    /// Query string to put in the host's URL.
    pub async fn encoded_query(&self) -> String {
        query::encode(&self.query().await)
    }

    pub async fn dialog_view(&self) -> Option<DialogView> {
        self.inner.lock().await.dialog.view()
    }

    pub async fn mount(&self) -> Result<(), ViewError> {
        self.refresh().await
    }

    /// Refetches the current query. There is no cache; every call is a
    /// round trip.
    pub async fn refresh(&self) -> Result<(), ViewError> {
        let (generation, query) = self.issue_list_request().await;
        self.complete_list_request(generation, query).await?;
        Ok(())
    }

    /// Grid-driven query changes (pagination, sort) fetch immediately.
    pub async fn change_query(&self, query: QueryState) -> Result<(), ViewError> {
        self.commit_query(query).await?;
        self.refresh().await
    }

    pub async fn change_page(&self, offset: u64, limit: u32) -> Result<(), ViewError> {
        let mut query = self.query().await;
        query.offset = offset;
        query.limit = limit;
        self.change_query(query).await
    }

    pub async fn change_sort(&self, sort: SortKey) -> Result<(), ViewError> {
        let query = self.query().await.with_sort(sort);
        self.change_query(query).await
    }

    /// Records a keystroke in one of the filter inputs. Edits are collected
    /// per field and turned into a single list request once the inputs have
    /// been quiet for the debounce period.
    pub async fn filter_input(self: &Arc<Self>, field: FilterField, raw: impl Into<String>) {
        {
            let mut guard = self.inner.lock().await;
            guard.pending_filters.set(field, raw.into());
        }
        let view = Arc::clone(self);
        self.filter_debounce.call(async move {
            if let Err(err) = view.apply_pending_filters().await {
                debug!(%err, "debounced filter change not applied");
            }
        });
    }

    pub async fn select_rows(&self, ids: Vec<EmployeeId>) {
        let mut guard = self.inner.lock().await;
        guard.selection.replace(ids);
        let _ = self
            .events
            .send(ViewEvent::SelectionChanged(guard.selection.ids().to_vec()));
    }

    pub async fn open_upload(&self) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.open_upload().map_err(ViewError::from))
            .await
    }

    pub async fn attach_csv(&self, upload: CsvUpload) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.attach_csv(upload).map_err(ViewError::from))
            .await
    }

    pub async fn request_delete(&self, ids: Vec<EmployeeId>) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.request_delete(ids).map_err(ViewError::from))
            .await
    }

    pub async fn request_delete_selected(&self) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, selection| {
            dialog
                .request_delete(selection.ids().to_vec())
                .map_err(ViewError::from)
        })
        .await
    }

    /// Opens the edit dialog on a copy of a row from the current page.
    pub async fn open_edit(&self, id: &EmployeeId) -> Result<(), ViewError> {
        self.update_dialog(|dialog, page, _| {
            let record = find_record(&page.records, id)
                .ok_or_else(|| ViewError::UnknownEmployee(id.clone()))?;
            dialog.open_edit(record).map_err(ViewError::from)
        })
        .await
    }

    pub async fn edit_field(&self, field: EditField, raw: &str) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.edit_field(field, raw).map_err(ViewError::from))
            .await
    }

    pub async fn cancel_dialog(&self) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.cancel().map_err(ViewError::from))
            .await
    }

    pub async fn acknowledge(&self) -> Result<(), ViewError> {
        self.update_dialog(|dialog, _, _| dialog.acknowledge().map_err(ViewError::from))
            .await
    }

    /// Confirms the open dialog and runs its mutation once. A failed
    /// mutation is reported through the returned outcome and a notification
    /// dialog, not as an error.
    pub async fn confirm_dialog(&self) -> Result<MutationOutcome, ViewError> {
        let mutation = self.take_confirmed_mutation().await?;
        Ok(self.run_mutation(mutation).await)
    }

    /// Applies one action to completion.
    pub async fn apply(self: &Arc<Self>, action: ViewAction) -> Result<(), ViewError> {
        if let Some(deferred) = self.prepare(action).await? {
            self.run_deferred(deferred).await?;
        }
        Ok(())
    }

    /// Starts a task that applies queued actions in order. State transitions
    /// happen in arrival order; the network work an action leaves behind runs
    /// on its own task so a slow request never holds up later gestures.
    pub fn spawn_action_loop(
        self: &Arc<Self>,
        capacity: usize,
    ) -> (mpsc::Sender<ViewAction>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ViewAction>(capacity);
        let view = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(action) = rx.recv().await {
                let name = action.name();
                debug!(action = name, "processing view action");
                match view.prepare(action).await {
                    Ok(Some(deferred)) => {
                        let view = Arc::clone(&view);
                        tokio::spawn(async move {
                            if let Err(err) = view.run_deferred(deferred).await {
                                debug!(action = name, %err, "view action finished with error");
                            }
                        });
                    }
                    Ok(None) => {}
                    Err(err) => warn!(action = name, %err, "view action rejected"),
                }
            }
        });
        (tx, handle)
    }

    async fn prepare(self: &Arc<Self>, action: ViewAction) -> Result<Option<Deferred>, ViewError> {
        let deferred = match action {
            ViewAction::Mount | ViewAction::Refresh => Some(self.deferred_fetch().await),
            ViewAction::ChangeQuery(query) => {
                self.commit_query(query).await?;
                Some(self.deferred_fetch().await)
            }
            ViewAction::ChangePage { offset, limit } => {
                let mut query = self.query().await;
                query.offset = offset;
                query.limit = limit;
                self.commit_query(query).await?;
                Some(self.deferred_fetch().await)
            }
            ViewAction::ChangeSort(sort) => {
                let query = self.query().await.with_sort(sort);
                self.commit_query(query).await?;
                Some(self.deferred_fetch().await)
            }
            ViewAction::FilterInput { field, raw } => {
                self.filter_input(field, raw).await;
                None
            }
            ViewAction::SelectRows(ids) => {
                self.select_rows(ids).await;
                None
            }
            ViewAction::OpenUpload => {
                self.open_upload().await?;
                None
            }
            ViewAction::AttachCsv(upload) => {
                self.attach_csv(upload).await?;
                None
            }
            ViewAction::RequestDelete(ids) => {
                self.request_delete(ids).await?;
                None
            }
            ViewAction::RequestDeleteSelected => {
                self.request_delete_selected().await?;
                None
            }
            ViewAction::OpenEdit(id) => {
                self.open_edit(&id).await?;
                None
            }
            ViewAction::EditField { field, raw } => {
                self.edit_field(field, &raw).await?;
                None
            }
            ViewAction::Confirm => Some(Deferred::Mutation(self.take_confirmed_mutation().await?)),
            ViewAction::Cancel => {
                self.cancel_dialog().await?;
                None
            }
            ViewAction::Acknowledge => {
                self.acknowledge().await?;
                None
            }
        };
        Ok(deferred)
    }

    async fn run_deferred(&self, deferred: Deferred) -> Result<(), ViewError> {
        match deferred {
            Deferred::Fetch { generation, query } => {
                self.complete_list_request(generation, query).await?;
            }
            Deferred::Mutation(mutation) => {
                self.run_mutation(mutation).await;
            }
        }
        Ok(())
    }

    async fn deferred_fetch(&self) -> Deferred {
        let (generation, query) = self.issue_list_request().await;
        Deferred::Fetch { generation, query }
    }

    async fn commit_query(&self, query: QueryState) -> Result<(), ViewError> {
        if let Err(err) = query.validate() {
            return Err(self.reject_query(err));
        }
        self.inner.lock().await.query = query;
        let _ = self.events.send(ViewEvent::QueryChanged(query));
        Ok(())
    }

    fn reject_query(&self, err: QueryError) -> ViewError {
        warn!(%err, "rejecting employee query");
        let _ = self.events.send(ViewEvent::QueryRejected {
            reason: err.to_string(),
        });
        err.into()
    }

    /// Pending edits are only consumed once they merge into a valid query,
    /// so a bound typed ahead of its partner survives until the partner
    /// arrives.
    async fn apply_pending_filters(&self) -> Result<(), ViewError> {
        let merged = {
            let mut guard = self.inner.lock().await;
            let query = guard.pending_filters.apply_to(guard.query);
            query.validate().map(|()| {
                guard.pending_filters = PendingFilters::default();
                guard.query = query;
                query
            })
        };
        match merged {
            Ok(query) => {
                let _ = self.events.send(ViewEvent::QueryChanged(query));
                self.refresh().await
            }
            Err(err) => Err(self.reject_query(err)),
        }
    }

    async fn issue_list_request(&self) -> (u64, QueryState) {
        let mut guard = self.inner.lock().await;
        guard.issued_generation += 1;
        (guard.issued_generation, guard.query)
    }

    async fn complete_list_request(
        &self,
        generation: u64,
        query: QueryState,
    ) -> Result<(), GatewayError> {
        debug!(generation, query = %query::encode(&query), "fetching employee page");
        let result = self.gateway.list(&query).await;

        let mut guard = self.inner.lock().await;
        if generation != guard.issued_generation {
            debug!(
                generation,
                latest = guard.issued_generation,
                "discarding stale employee page"
            );
            return Ok(());
        }

        match result {
            Ok(page) => {
                self.replace_page(&mut guard, generation, page);
                Ok(())
            }
            Err(err) => {
                // Rows on screen always belong to the committed query.
                log_gateway_failure("list", &err);
                self.replace_page(&mut guard, generation, EmployeePage::default());
                let _ = self.events.send(ViewEvent::ListFailed {
                    generation,
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn replace_page(&self, state: &mut ListViewState, generation: u64, page: EmployeePage) {
        state.page = page.clone();
        state.applied_generation = generation;
        let had_selection = !state.selection.is_empty();
        state.selection.clear();
        let _ = self
            .events
            .send(ViewEvent::RecordsReplaced { generation, page });
        if had_selection {
            let _ = self.events.send(ViewEvent::SelectionChanged(Vec::new()));
        }
    }

    async fn take_confirmed_mutation(&self) -> Result<PendingMutation, ViewError> {
        let mut guard = self.inner.lock().await;
        let mutation = guard.dialog.confirm()?;
        let _ = self
            .events
            .send(ViewEvent::DialogChanged(guard.dialog.view()));
        Ok(mutation)
    }

    async fn run_mutation(&self, mutation: PendingMutation) -> MutationOutcome {
        let kind = mutation.kind();
        let result = match mutation {
            PendingMutation::Create(upload) => self.gateway.create(upload).await,
            PendingMutation::Update(record) => self.gateway.update(&record.id, &record).await,
            PendingMutation::DeleteMany(ids) => self.gateway.delete_many(&ids).await,
        };

        let outcome = MutationOutcome {
            kind,
            succeeded: result.is_ok(),
        };
        match &result {
            Ok(()) => info!(mutation = kind.as_str(), "employee mutation succeeded"),
            Err(err) => log_gateway_failure(kind.as_str(), err),
        }

        {
            let mut guard = self.inner.lock().await;
            if outcome.succeeded && kind == MutationKind::DeleteMany {
                guard.selection.clear();
                let _ = self.events.send(ViewEvent::SelectionChanged(Vec::new()));
            }
            guard.dialog.notify(outcome);
            let _ = self
                .events
                .send(ViewEvent::DialogChanged(guard.dialog.view()));
        }
        let _ = self.events.send(ViewEvent::MutationFinished(outcome));

        if outcome.succeeded {
            // List failures are already surfaced as `ListFailed`.
            let _ = self.refresh().await;
        }
        outcome
    }

    async fn update_dialog<F>(&self, transition: F) -> Result<(), ViewError>
    where
        F: FnOnce(&mut DialogController, &EmployeePage, &SelectionState) -> Result<(), ViewError>,
    {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;
        transition(&mut state.dialog, &state.page, &state.selection)?;
        let _ = self
            .events
            .send(ViewEvent::DialogChanged(state.dialog.view()));
        Ok(())
    }
}

fn find_record<'a>(records: &'a [EmployeeRecord], id: &EmployeeId) -> Option<&'a EmployeeRecord> {
    records.iter().find(|record| &record.id == id)
}

fn log_gateway_failure(operation: &str, err: &GatewayError) {
    match err {
        GatewayError::Status { status, body } => {
            error!(operation, %status, %body, "employee request failed");
        }
        GatewayError::Transport { message } => {
            error!(operation, %message, "employee request failed");
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
