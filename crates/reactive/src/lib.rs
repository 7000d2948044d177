//! Roster Reactive - Cancellable reconciliation for Roster visible sequences.
//!
//! This crate turns collection snapshots into presenter deliveries. Each
//! scheduled reconciliation filters and sorts a snapshot, diffs the result
//! against the last delivered visible sequence and hands both to a
//! [`Presenter`]. Superseded work is cancelled cooperatively through a shared
//! generation counter and never reaches the presenter.
//!
//! # Core Concepts
//!
//! - `ReconcileDispatcher`: Owns the worker task and the delivered baseline
//! - `Generation`: Shared counter that marks older work as stale
//! - `Presenter`: Receives `ViewUpdate`s and one-shot `Notice`s
//!
//! # Example
//!
//! ```
//! use roster_core::{Attributes, Phase, Record};
//! use roster_query::ViewSpec;
//! use roster_reactive::{ChannelPresenter, PresenterEvent, ReconcileDispatcher, ReconcileRequest};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (presenter, mut events) = ChannelPresenter::new();
//! let dispatcher = ReconcileDispatcher::spawn(Arc::new(presenter));
//!
//! let snapshot = vec![Arc::new(Record::new(1, 10, Attributes::new("alice", "DY_1")))];
//! dispatcher.schedule(ReconcileRequest {
//!     snapshot,
//!     view: ViewSpec::default(),
//!     phase: Phase::Idle,
//! });
//! dispatcher.flush().await.unwrap();
//!
//! match events.try_recv() {
//!     Ok(PresenterEvent::Render(update)) => assert_eq!(update.script.insert_count(), 1),
//!     other => panic!("unexpected event: {:?}", other),
//! }
//! dispatcher.shutdown().await;
//! # }
//! ```

pub mod dispatcher;
pub mod generation;
pub mod presenter;

pub use dispatcher::{ReconcileDispatcher, ReconcileRequest};
pub use generation::{Generation, GenerationToken};
pub use presenter::{ChannelPresenter, FnPresenter, Notice, Presenter, PresenterEvent, ViewUpdate};

// Re-export commonly used types from dependencies
pub use roster_incremental::{EditOp, EditScript};
pub use roster_query::ViewSpec;
