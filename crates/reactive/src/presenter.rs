//! Presentation collaborator interface.
//!
//! The presentation layer receives every delivered reconciliation as a
//! `ViewUpdate` and one-shot `Notice`s for fetch outcomes. Both callbacks run
//! on the runtime, so implementations must return quickly.

use roster_core::{FetchError, Phase, Record};
use roster_incremental::EditScript;
use roster_query::ViewSpec;
use std::sync::Arc;
use tokio::sync::mpsc;

/// One delivered reconciliation.
#[derive(Clone, Debug)]
pub struct ViewUpdate {
    /// The new visible sequence.
    pub visible: Vec<Arc<Record>>,
    /// Edits turning the previously delivered sequence into `visible`.
    pub script: EditScript<Arc<Record>>,
    /// The view spec `visible` was computed for.
    pub view: ViewSpec,
    /// Pagination phase when the reconciliation was requested.
    pub phase: Phase,
    /// Size of the whole collection, before filtering.
    pub total: usize,
}

/// One-shot notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// A page fetch failed; pagination is now `Errored`.
    FetchFailed(FetchError),
    /// The source has no more pages.
    Exhausted,
    /// A refresh replaced the collection.
    Refreshed { count: usize },
}

/// Receives view updates and notices.
pub trait Presenter: Send + Sync + 'static {
    /// Renders a delivered reconciliation.
    fn render(&self, update: &ViewUpdate);

    /// Shows a one-shot notice.
    fn notify(&self, _notice: &Notice) {}
}

/// Adapts a closure into a presenter that ignores notices.
pub struct FnPresenter<F>(pub F);

impl<F> Presenter for FnPresenter<F>
where
    F: Fn(&ViewUpdate) + Send + Sync + 'static,
{
    fn render(&self, update: &ViewUpdate) {
        (self.0)(update)
    }
}

/// Events forwarded by a `ChannelPresenter`.
#[derive(Clone, Debug)]
pub enum PresenterEvent {
    Render(ViewUpdate),
    Notice(Notice),
}

/// Forwards updates and notices into an unbounded channel.
///
/// Lets an async presentation layer (or a test) consume deliveries at its own pace.
#[derive(Clone, Debug)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresenterEvent>,
}

impl ChannelPresenter {
    /// Creates a presenter and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresenterEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Presenter for ChannelPresenter {
    fn render(&self, update: &ViewUpdate) {
        // A closed receiver means nobody is watching anymore.
        let _ = self.tx.send(PresenterEvent::Render(update.clone()));
    }

    fn notify(&self, notice: &Notice) {
        let _ = self.tx.send(PresenterEvent::Notice(notice.clone()));
    }
}
