//! Roster Engine - Paginated collection synchronization.
//!
//! This crate ties the Roster components together. A `SyncEngine` fetches
//! ordered pages from a [`PageSource`], merges them into a duplicate-free
//! collection, and keeps a presenter's visible sequence in step with the
//! collection and the current filter and sort through minimal edit scripts.
//!
//! # Example
//!
//! ```
//! use roster_engine::{ChannelPresenter, EngineConfig, LoadOutcome, MockFollowSource, SyncEngine};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> roster_engine::Result<()> {
//! let (presenter, _events) = ChannelPresenter::new();
//! let config = EngineConfig::builder().autoload(false).build()?;
//! let engine = SyncEngine::new(Arc::new(MockFollowSource::new(0)), Arc::new(presenter))
//!     .with_config(config)
//!     .start()
//!     .await?;
//!
//! assert_eq!(engine.load_more().await?, LoadOutcome::Loaded { inserted: 10, updated: 0 });
//! engine.set_filter("#1")?;
//! engine.settled().await?;
//! engine.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod pagination;
pub mod source;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::{EngineHandle, LoadOutcome, SyncEngine};
pub use pagination::{Completion, FetchKind, FetchTicket, PaginationState};
pub use source::{MockFollowSource, PageSource, StaticPageSource};

// Re-export commonly used types from dependencies
pub use roster_core::{Error, FetchError, Phase, Record, Result, SortOrder};
pub use roster_reactive::{ChannelPresenter, Notice, Presenter, PresenterEvent, ViewUpdate};
pub use roster_storage::{JsonFilePersistence, MemoryPersistence, Persistence, UpdateOutcome};
