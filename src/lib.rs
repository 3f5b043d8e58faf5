//! # iconpack-dl
//!
//! Bounded, pausable, cancellable batch fetching of achievement icons, with
//! zip packaging of the results.
//!
//! ## Design Philosophy
//!
//! - **Partial success is success** - a failed fetch is left out of the
//!   result mapping; it never fails the batch
//! - **Cooperative control** - pause and cancel take effect between
//!   sub-batches, never in the middle of one
//! - **Bounded load** - at most `batch_size` requests are in flight
//! - **Library-first** - no CLI or UI; consumers observe progress through
//!   callbacks or the event channel
//!
//! ## Quick Start
//!
//! ```no_run
//! use iconpack_dl::{
//!     AchievementIcons, ArchiveBuilder, CallbackObserver, Config, TransferEngine,
//!     TransferOutcome, icon_tasks,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let engine = TransferEngine::new(config.clone())?;
//!
//!     let achievements = vec![AchievementIcons {
//!         api_name: "ACH_WIN_ONE_GAME".to_string(),
//!         icon: Some("c1a2b3.jpg".to_string()),
//!         icon_gray: Some("d4e5f6.jpg".to_string()),
//!     }];
//!     let tasks = icon_tasks(&config.source.cdn_base, "440", &achievements);
//!
//!     let job = engine.start(
//!         tasks,
//!         config.transfer.batch_size,
//!         CallbackObserver::new(
//!             |done, total| println!("{done}/{total}"),
//!             |done, total| println!("paused at {done}/{total}"),
//!         ),
//!     )?;
//!     let controller = job.controller();
//!     // controller.pause()? / controller.resume()? / controller.cancel()?
//!     # let _ = controller;
//!
//!     if let TransferOutcome::Completed(icons) = job.wait().await? {
//!         let mut archive = ArchiveBuilder::new(&config.archive);
//!         archive.add_mapping("", &icons)?;
//!         archive.write_to(std::path::Path::new("icons.zip")).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Zip packaging of fetched payloads
pub mod archive;
/// Configuration types
pub mod config;
/// Batch transfer engine (decomposed into focused submodules)
pub mod engine;
/// Error types
pub mod error;
/// Single-resource fetch transport
pub mod fetcher;
/// Achievement icon records and task derivation
pub mod icons;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use archive::ArchiveBuilder;
pub use config::{ArchiveConfig, Compression, Config, SourceConfig, TransferConfig};
pub use engine::{
    CallbackObserver, JobController, NullObserver, ProgressObserver, RunningJob, TransferEngine,
    TransferJob,
};
pub use error::{Error, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use icons::{AchievementIcons, IconKind, icon_tasks, icon_url};
pub use types::{
    Event, Phase, Progress, ResultMapping, TransferOutcome, TransferReport, TransferTask,
    missing_tasks,
};
