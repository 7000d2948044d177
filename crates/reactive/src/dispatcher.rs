//! Reconciliation dispatcher.
//!
//! Every mutation of the collection or of the view spec schedules a
//! reconciliation. A single worker task owns the last delivered visible
//! sequence (the baseline) and turns each request into a filtered, sorted
//! sequence plus an edit script against that baseline. The heavy part runs on
//! the blocking pool so the runtime never stalls on it.
//!
//! Scheduling advances a shared generation. A request whose generation is no
//! longer current when its work completes is dropped without reaching the
//! presenter, so only the most recent request's result is ever delivered.

use crate::generation::{Generation, GenerationToken};
use crate::presenter::{Presenter, ViewUpdate};
use roster_core::{Error, Phase, Record, Result};
use roster_incremental::{diff, EditScript};
use roster_query::{apply, ViewSpec};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Inputs for one reconciliation.
#[derive(Clone, Debug)]
pub struct ReconcileRequest {
    /// Immutable snapshot of the whole collection.
    pub snapshot: Vec<Arc<Record>>,
    /// Filter and sort to apply.
    pub view: ViewSpec,
    /// Pagination phase to report alongside the result.
    pub phase: Phase,
}

enum Message {
    Schedule { generation: u64, request: ReconcileRequest },
    Flush(oneshot::Sender<()>),
}

struct Reconciled {
    visible: Vec<Arc<Record>>,
    script: EditScript<Arc<Record>>,
}

/// Runs filter, sort and diff, bailing out between steps once superseded.
fn reconcile(
    baseline: &[Arc<Record>],
    snapshot: &[Arc<Record>],
    view: &ViewSpec,
    token: &GenerationToken,
) -> Option<Reconciled> {
    let visible = apply(snapshot, view);
    if token.is_stale() {
        return None;
    }
    let script = diff(baseline, &visible);
    if token.is_stale() {
        return None;
    }
    Some(Reconciled { visible, script })
}

/// Handle to the reconciliation worker.
pub struct ReconcileDispatcher {
    tx: mpsc::UnboundedSender<Message>,
    generation: Generation,
    worker: JoinHandle<()>,
}

impl ReconcileDispatcher {
    /// Spawns a worker with an empty baseline.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(presenter: Arc<dyn Presenter>) -> Self {
        Self::with_baseline(presenter, Vec::new())
    }

    /// Spawns a worker whose first script is computed against `baseline`.
    pub fn with_baseline(presenter: Arc<dyn Presenter>, baseline: Vec<Arc<Record>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Generation::new();
        let worker = tokio::spawn(run_worker(rx, presenter, generation.clone(), baseline));
        Self {
            tx,
            generation,
            worker,
        }
    }

    /// Schedules a reconciliation, superseding any in flight.
    ///
    /// Returns the generation assigned to the request.
    pub fn schedule(&self, request: ReconcileRequest) -> u64 {
        let generation = self.generation.advance();
        if self.tx.send(Message::Schedule { generation, request }).is_err() {
            debug!(generation, "reconcile worker gone, request dropped");
        }
        generation
    }

    /// Waits until every request scheduled so far has been delivered or dropped.
    pub async fn flush(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Message::Flush(done_tx))
            .map_err(|_| Error::EngineStopped)?;
        done_rx.await.map_err(|_| Error::EngineStopped)
    }

    /// The generation of the most recently scheduled request.
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    /// Stops the worker after it finishes the work already queued.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            debug!(error = %e, "reconcile worker ended abnormally");
        }
    }
}

#[derive(Default)]
struct Inbox {
    pending: Option<(u64, ReconcileRequest)>,
    flushes: Vec<oneshot::Sender<()>>,
}

impl Inbox {
    fn accept(&mut self, message: Message) {
        match message {
            Message::Schedule { generation, request } => {
                if let Some((dropped, _)) = self.pending.replace((generation, request)) {
                    trace!(generation = dropped, "reconcile request coalesced");
                }
            }
            Message::Flush(done) => self.flushes.push(done),
        }
    }

    fn resolve_flushes(&mut self) {
        for done in self.flushes.drain(..) {
            let _ = done.send(());
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<Message>,
    presenter: Arc<dyn Presenter>,
    generation: Generation,
    mut baseline: Vec<Arc<Record>>,
) {
    let mut inbox = Inbox::default();
    let mut closed = false;

    loop {
        if inbox.pending.is_none() {
            inbox.resolve_flushes();
            if closed {
                break;
            }
            match rx.recv().await {
                Some(message) => inbox.accept(message),
                None => break,
            }
        }
        while let Ok(message) = rx.try_recv() {
            inbox.accept(message);
        }

        let Some((issued, request)) = inbox.pending.take() else {
            continue;
        };
        let token = generation.token(issued);
        if token.is_stale() {
            // A newer request is already on its way.
            trace!(generation = issued, "reconcile request superseded before start");
            continue;
        }

        let ReconcileRequest {
            snapshot,
            view,
            phase,
        } = request;
        let total = snapshot.len();
        let job_view = view.clone();
        let job_baseline = baseline.clone();
        let job_token = token.clone();
        let job = tokio::task::spawn_blocking(move || {
            reconcile(&job_baseline, &snapshot, &job_view, &job_token)
        });
        tokio::pin!(job);

        let result = loop {
            tokio::select! {
                result = &mut job => break Some(result),
                message = rx.recv(), if !closed => match message {
                    Some(message) => {
                        inbox.accept(message);
                        if inbox.pending.is_some() {
                            break None;
                        }
                    }
                    None => closed = true,
                },
            }
        };

        let reconciled = match result {
            None => {
                trace!(generation = issued, "reconcile superseded while running");
                continue;
            }
            Some(Err(e)) => {
                debug!(generation = issued, error = %e, "reconcile job failed");
                continue;
            }
            Some(Ok(None)) => {
                trace!(generation = issued, "reconcile abandoned");
                continue;
            }
            Some(Ok(Some(reconciled))) => reconciled,
        };
        if token.is_stale() {
            trace!(generation = issued, "reconcile result discarded");
            continue;
        }

        let update = ViewUpdate {
            visible: reconciled.visible,
            script: reconciled.script,
            view,
            phase,
            total,
        };
        trace!(
            generation = issued,
            visible = update.visible.len(),
            ops = update.script.len(),
            "delivering view update"
        );
        presenter.render(&update);
        baseline = update.visible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{ChannelPresenter, PresenterEvent};
    use roster_core::{Attributes, FieldMask, SortOrder};
    use roster_incremental::EditOp;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn make_record(id: u64, username: &str) -> Arc<Record> {
        Arc::new(Record::new(id, id as i64, Attributes::new(username, "DY")))
    }

    fn request(snapshot: Vec<Arc<Record>>, view: ViewSpec) -> ReconcileRequest {
        ReconcileRequest {
            snapshot,
            view,
            phase: Phase::Idle,
        }
    }

    fn drain_renders(rx: &mut UnboundedReceiver<PresenterEvent>) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let PresenterEvent::Render(update) = event {
                updates.push(update);
            }
        }
        updates
    }

    #[tokio::test]
    async fn test_single_delivery() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));

        let snapshot = vec![make_record(1, "alice"), make_record(2, "bob")];
        let generation = dispatcher.schedule(request(snapshot, ViewSpec::default()));
        assert_eq!(generation, 1);
        dispatcher.flush().await.unwrap();

        let updates = drain_renders(&mut rx);
        assert_eq!(updates.len(), 1);
        let ids: Vec<u64> = updates[0].visible.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(updates[0].script.insert_count(), 2);
        assert_eq!(updates[0].total, 2);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_burst_delivers_latest_only() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));
        let snapshot = vec![make_record(1, "abc"), make_record(2, "xyz"), make_record(3, "abd")];

        for filter in ["a", "ab", "abc"] {
            dispatcher.schedule(request(snapshot.clone(), ViewSpec::default().with_filter(filter)));
        }
        dispatcher.flush().await.unwrap();

        let updates = drain_renders(&mut rx);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].view.filter, "abc");
        assert_eq!(updates[0].visible.len(), 1);
        assert_eq!(updates[0].visible[0].id(), 1);
        assert_eq!(dispatcher.generation(), 3);

        dispatcher.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_superseded_job_keeps_baseline() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));

        let initial: Vec<_> = (0..3000).map(|id| make_record(id, &format!("user {}", id))).collect();
        dispatcher.schedule(request(initial, ViewSpec::default()));
        dispatcher.flush().await.unwrap();
        let mut delivered = drain_renders(&mut rx);
        assert_eq!(delivered.len(), 1);
        let mut previous = delivered.remove(0).visible;

        for round in 1..=20u64 {
            // Shifted ids keep the large job busy diffing against the baseline.
            let snapshot: Vec<_> = (round * 7..round * 7 + 3000)
                .map(|id| make_record(id, &format!("user {}", id)))
                .collect();
            dispatcher.schedule(request(
                snapshot.clone(),
                ViewSpec::default().with_sort(SortOrder::Ascending),
            ));
            tokio::task::yield_now().await;
            let filter = format!("user {}", round);
            dispatcher.schedule(request(snapshot, ViewSpec::default().with_filter(filter.as_str())));
            dispatcher.flush().await.unwrap();

            let updates = drain_renders(&mut rx);
            assert_eq!(updates.len(), 1, "round {}", round);
            let update = &updates[0];
            assert_eq!(update.view.filter, filter);
            assert!(update
                .visible
                .iter()
                .all(|r| r.attributes().username.contains(filter.as_str())));

            let replayed = update.script.apply(&previous).unwrap();
            assert_eq!(replayed, update.visible);
            previous = update.visible.clone();
        }

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_script_is_against_last_delivered() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));
        let snapshot: Vec<_> = (1..=5).map(|id| make_record(id, "user")).collect();

        dispatcher.schedule(request(snapshot.clone(), ViewSpec::default()));
        dispatcher.flush().await.unwrap();
        dispatcher.schedule(request(
            snapshot,
            ViewSpec::default().with_sort(SortOrder::Ascending),
        ));
        dispatcher.flush().await.unwrap();

        let updates = drain_renders(&mut rx);
        assert_eq!(updates.len(), 2);
        let replayed = updates[1].script.apply(&updates[0].visible).unwrap();
        assert_eq!(replayed, updates[1].visible);
        assert_eq!(updates[1].script.insert_count(), 0);
        assert_eq!(updates[1].script.remove_count(), 0);

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_remark_edit_is_single_update() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let baseline: Vec<_> = [8, 5, 3].iter().map(|&id| make_record(id, "user")).collect();
        let dispatcher = ReconcileDispatcher::with_baseline(Arc::new(presenter), baseline.clone());

        let mut snapshot = baseline.clone();
        let mut edited = Record::clone(&snapshot[1]);
        edited.attributes_mut().remark = "neighbour".into();
        edited.increment_version();
        snapshot[1] = Arc::new(edited);

        dispatcher.schedule(request(snapshot, ViewSpec::default()));
        dispatcher.flush().await.unwrap();

        let updates = drain_renders(&mut rx);
        assert_eq!(updates.len(), 1);
        let ops = updates[0].script.ops();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            EditOp::Update { index: 1, fields, .. } if *fields == FieldMask::REMARK
        ));

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_unchanged_view_is_empty_script() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));
        let snapshot = vec![make_record(1, "alice")];

        dispatcher.schedule(request(snapshot.clone(), ViewSpec::default()));
        dispatcher.flush().await.unwrap();
        dispatcher.schedule(request(snapshot, ViewSpec::default()));
        dispatcher.flush().await.unwrap();

        let updates = drain_renders(&mut rx);
        assert_eq!(updates.len(), 2);
        assert!(updates[1].script.is_empty());

        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_flush_when_idle() {
        let (presenter, mut rx) = ChannelPresenter::new();
        let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));
        dispatcher.flush().await.unwrap();
        assert!(drain_renders(&mut rx).is_empty());
        dispatcher.shutdown().await;
    }
}
