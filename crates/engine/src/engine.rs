//! The sync engine and its handle.
//!
//! A single owner task holds the collection store, the pagination state and
//! the view spec, and processes commands one at a time. Page fetches run as
//! separate tasks under a timeout and report back to the owner tagged with
//! their ticket; the owner consults the pagination state to decide whether the
//! result still applies. Every change to the collection or the view schedules
//! a reconciliation on the dispatcher.

use crate::config::EngineConfig;
use crate::pagination::{Completion, FetchTicket, PaginationState};
use crate::source::PageSource;
use roster_core::{Error, FetchError, Record, RecordId, Result, SortOrder};
use roster_query::ViewSpec;
use roster_reactive::{Notice, Presenter, ReconcileDispatcher, ReconcileRequest};
use roster_storage::{CollectionStore, Persistence, UpdateOutcome};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// How a `load_more` or `refresh` call ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was applied to the collection.
    Loaded { inserted: usize, updated: usize },
    /// The source had no more pages.
    Exhausted,
    /// The fetch failed; the collection is unchanged.
    Failed(FetchError),
    /// A fetch was already in flight, or the source was exhausted.
    Ignored,
    /// A refresh started before this fetch finished.
    Superseded,
}

type Mutator = Box<dyn FnOnce(&mut Record) + Send>;

enum Command {
    LoadMore(oneshot::Sender<LoadOutcome>),
    Refresh(oneshot::Sender<LoadOutcome>),
    SetFilter(String),
    SetSort(SortOrder),
    Edit {
        id: RecordId,
        mutator: Mutator,
        reply: oneshot::Sender<UpdateOutcome>,
    },
    Status(oneshot::Sender<PaginationState>),
    Snapshot(oneshot::Sender<Vec<Arc<Record>>>),
    View(oneshot::Sender<ViewSpec>),
    Settle(oneshot::Sender<Result<()>>),
    Suspend(oneshot::Sender<Result<usize>>),
    Shutdown(oneshot::Sender<()>),
}

struct FetchDone {
    ticket: FetchTicket,
    outcome: std::result::Result<Vec<Record>, FetchError>,
}

struct InFlight {
    ticket: FetchTicket,
    waiter: Option<oneshot::Sender<LoadOutcome>>,
    task: JoinHandle<()>,
}

/// Builder and entry point for a running engine.
pub struct SyncEngine {
    config: EngineConfig,
    source: Arc<dyn PageSource>,
    presenter: Arc<dyn Presenter>,
    persistence: Option<Arc<dyn Persistence>>,
}

impl SyncEngine {
    /// Creates an engine with the default configuration and no persistence.
    pub fn new(source: Arc<dyn PageSource>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            config: EngineConfig::default(),
            source,
            presenter,
            persistence: None,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Performs the cold start and spawns the owner task.
    ///
    /// A persisted snapshot is rehydrated and reconciled. Without one, the
    /// first page is requested when `autoload` is set. Persistence failures
    /// are logged and treated as "nothing persisted".
    pub async fn start(self) -> Result<EngineHandle> {
        self.config.validate()?;
        let SyncEngine {
            config,
            source,
            presenter,
            persistence,
        } = self;

        let restored = match &persistence {
            Some(persistence) => load_snapshot(persistence.clone()).await,
            None => Vec::new(),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let dispatcher = ReconcileDispatcher::spawn(presenter.clone());
        let view = ViewSpec::new("", config.initial_sort);

        let mut owner = Owner {
            store: CollectionStore::new(),
            state: PaginationState::new(),
            view,
            in_flight: None,
            dispatcher,
            presenter,
            source,
            persistence,
            done_tx,
            config,
        };

        if !restored.is_empty() {
            owner.store = CollectionStore::from_snapshot(restored);
            info!(records = owner.store.len(), "rehydrated persisted snapshot");
            owner.reconcile();
        } else if owner.config.autoload {
            debug!("no persisted snapshot, loading first page");
            owner.load_more(None);
        }

        tokio::spawn(owner.run(rx, done_rx));
        Ok(EngineHandle { tx })
    }
}

async fn load_snapshot(persistence: Arc<dyn Persistence>) -> Vec<Record> {
    match tokio::task::spawn_blocking(move || persistence.load()).await {
        Ok(Ok(Some(records))) => records,
        Ok(Ok(None)) => Vec::new(),
        Ok(Err(e)) => {
            warn!(error = %e, "failed to load persisted snapshot");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "snapshot load task failed");
            Vec::new()
        }
    }
}

struct Owner {
    store: CollectionStore,
    state: PaginationState,
    view: ViewSpec,
    in_flight: Option<InFlight>,
    dispatcher: ReconcileDispatcher,
    presenter: Arc<dyn Presenter>,
    source: Arc<dyn PageSource>,
    persistence: Option<Arc<dyn Persistence>>,
    done_tx: mpsc::UnboundedSender<FetchDone>,
    config: EngineConfig,
}

impl Owner {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<FetchDone>,
    ) {
        let mut shutdown_reply = None;
        loop {
            // Commands first: a refresh queued behind a finished fetch still supersedes it.
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Shutdown(reply)) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    Some(command) => self.handle(command).await,
                    None => break,
                },
                Some(done) = completions.recv() => self.on_fetch_done(done),
            }
        }

        drop(commands);
        drop(completions);
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
        self.dispatcher.shutdown().await;
        debug!("engine stopped");
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::LoadMore(reply) => self.load_more(Some(reply)),
            Command::Refresh(reply) => self.refresh(reply),
            Command::SetFilter(filter) => {
                if filter != self.view.filter {
                    debug!(filter = %filter, "filter changed");
                    self.view.filter = filter;
                    self.reconcile();
                }
            }
            Command::SetSort(sort) => {
                if sort != self.view.sort {
                    debug!(?sort, "sort order changed");
                    self.view.sort = sort;
                    self.reconcile();
                }
            }
            Command::Edit { id, mutator, reply } => {
                let outcome = self.store.update(id, mutator);
                if let UpdateOutcome::Updated(fields) = outcome {
                    debug!(id, ?fields, "record edited");
                    self.reconcile();
                }
                let _ = reply.send(outcome);
            }
            Command::Status(reply) => {
                let _ = reply.send(self.state.clone());
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.store.snapshot());
            }
            Command::View(reply) => {
                let _ = reply.send(self.view.clone());
            }
            Command::Settle(reply) => {
                let _ = reply.send(self.dispatcher.flush().await);
            }
            Command::Suspend(reply) => {
                let _ = reply.send(self.suspend().await);
            }
            Command::Shutdown(reply) => {
                let _ = reply.send(());
            }
        }
    }

    fn load_more(&mut self, waiter: Option<oneshot::Sender<LoadOutcome>>) {
        match self.state.begin_load_more() {
            Some(ticket) => self.issue(ticket, waiter),
            None => {
                trace!(phase = ?self.state.phase, "load_more ignored");
                if let Some(waiter) = waiter {
                    let _ = waiter.send(LoadOutcome::Ignored);
                }
            }
        }
    }

    fn refresh(&mut self, waiter: oneshot::Sender<LoadOutcome>) {
        if let Some(previous) = self.in_flight.take() {
            debug!(page = previous.ticket.page, "refresh supersedes in-flight fetch");
            previous.task.abort();
            if let Some(waiter) = previous.waiter {
                let _ = waiter.send(LoadOutcome::Superseded);
            }
        }
        let ticket = self.state.begin_refresh();
        self.issue(ticket, Some(waiter));
    }

    fn issue(&mut self, ticket: FetchTicket, waiter: Option<oneshot::Sender<LoadOutcome>>) {
        debug!(
            page = ticket.page,
            generation = ticket.generation,
            kind = ?ticket.kind,
            "fetch issued"
        );
        let source = self.source.clone();
        let done_tx = self.done_tx.clone();
        let timeout = self.config.fetch_timeout;
        let task = tokio::spawn(async move {
            let outcome = match tokio::time::timeout(timeout, source.fetch(ticket.page)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };
            let _ = done_tx.send(FetchDone { ticket, outcome });
        });
        self.in_flight = Some(InFlight {
            ticket,
            waiter,
            task,
        });
    }

    fn on_fetch_done(&mut self, done: FetchDone) {
        let FetchDone { ticket, outcome } = done;
        let waiter = match self.in_flight.take() {
            Some(in_flight) if in_flight.ticket == ticket => in_flight.waiter,
            other => {
                self.in_flight = other;
                None
            }
        };

        let reply = match self.state.complete(ticket, outcome) {
            Completion::Stale => {
                trace!(page = ticket.page, generation = ticket.generation, "stale fetch dropped");
                LoadOutcome::Superseded
            }
            Completion::Merge(records) => {
                let result = self.store.merge(records);
                info!(
                    page = ticket.page,
                    inserted = result.inserted,
                    updated = result.updated,
                    total = self.store.len(),
                    "page merged"
                );
                self.reconcile();
                LoadOutcome::Loaded {
                    inserted: result.inserted,
                    updated: result.updated,
                }
            }
            Completion::Replace(records) => {
                let result = self.store.replace_all(records);
                info!(total = self.store.len(), "collection refreshed");
                self.reconcile();
                self.presenter.notify(&Notice::Refreshed {
                    count: self.store.len(),
                });
                if self.state.is_exhausted() {
                    self.presenter.notify(&Notice::Exhausted);
                    LoadOutcome::Exhausted
                } else {
                    LoadOutcome::Loaded {
                        inserted: result.inserted,
                        updated: result.updated,
                    }
                }
            }
            Completion::Exhausted => {
                info!(page = ticket.page, total = self.store.len(), "source exhausted");
                self.reconcile();
                self.presenter.notify(&Notice::Exhausted);
                LoadOutcome::Exhausted
            }
            Completion::Failed(error) => {
                warn!(
                    page = ticket.page,
                    kind = ?ticket.kind,
                    error = %error,
                    "fetch failed"
                );
                self.presenter.notify(&Notice::FetchFailed(error.clone()));
                LoadOutcome::Failed(error)
            }
        };

        if let Some(waiter) = waiter {
            let _ = waiter.send(reply);
        }
    }

    fn reconcile(&self) {
        self.dispatcher.schedule(ReconcileRequest {
            snapshot: self.store.snapshot(),
            view: self.view.clone(),
            phase: self.state.phase.clone(),
        });
    }

    async fn suspend(&self) -> Result<usize> {
        let Some(persistence) = self.persistence.clone() else {
            return Ok(0);
        };
        let records = self.store.to_records(self.config.persist_limit);
        let count = records.len();
        tokio::task::spawn_blocking(move || persistence.save(&records))
            .await
            .map_err(|e| Error::persistence(e.to_string()))??;
        info!(records = count, "snapshot persisted");
        Ok(count)
    }
}

/// Cloneable handle for driving a running engine.
///
/// Every method fails with `Error::EngineStopped` once the engine has shut down.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::LoadMore(_) => "LoadMore",
            Command::Refresh(_) => "Refresh",
            Command::SetFilter(_) => "SetFilter",
            Command::SetSort(_) => "SetSort",
            Command::Edit { .. } => "Edit",
            Command::Status(_) => "Status",
            Command::Snapshot(_) => "Snapshot",
            Command::View(_) => "View",
            Command::Settle(_) => "Settle",
            Command::Suspend(_) => "Suspend",
            Command::Shutdown(_) => "Shutdown",
        };
        f.write_str(name)
    }
}

impl EngineHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| Error::EngineStopped)
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(make(reply))?;
        response.await.map_err(|_| Error::EngineStopped)
    }

    /// Fetches the next page. Resolves once the page is applied or the
    /// request is ignored or superseded.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        self.request(Command::LoadMore).await
    }

    /// Reloads page 1 and replaces the collection with it.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        self.request(Command::Refresh).await
    }

    /// Sets the filter text. An empty text shows every record.
    pub fn set_filter(&self, filter: impl Into<String>) -> Result<()> {
        self.send(Command::SetFilter(filter.into()))
    }

    pub fn set_sort_descending(&self, descending: bool) -> Result<()> {
        self.send(Command::SetSort(SortOrder::from_descending(descending)))
    }

    /// Applies `mutator` to the record with `id`.
    pub async fn edit_record<F>(&self, id: RecordId, mutator: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Record) + Send + 'static,
    {
        self.request(|reply| Command::Edit {
            id,
            mutator: Box::new(mutator),
            reply,
        })
        .await
    }

    pub async fn status(&self) -> Result<PaginationState> {
        self.request(Command::Status).await
    }

    /// Returns the whole collection in insertion order.
    pub async fn snapshot(&self) -> Result<Vec<Arc<Record>>> {
        self.request(Command::Snapshot).await
    }

    pub async fn view(&self) -> Result<ViewSpec> {
        self.request(Command::View).await
    }

    /// Waits until every reconciliation scheduled so far has been delivered
    /// or dropped.
    pub async fn settled(&self) -> Result<()> {
        self.request(Command::Settle).await?
    }

    /// Saves the first `persist_limit` records. Returns how many were saved.
    pub async fn suspend(&self) -> Result<usize> {
        self.request(Command::Suspend).await?
    }

    /// Stops the engine and its dispatcher. In-flight fetches are abandoned.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await
    }
}
