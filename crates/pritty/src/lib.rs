//! Viewed-state synchronization between a pull request's file tree and the
//! host page's per-file "Viewed" toggles.
//!
//! - `core/` - pure logic over host capability traits. No browser types.
//! - `engine/` - the live engine. Owns subscriptions and wires callbacks.
//! - `harness` - in-memory host for running the engine without a browser,
//!   behind the `harness` feature.

pub mod config;
pub mod core;
pub mod engine;
#[cfg(feature = "harness")]
pub mod harness;

pub use config::SyncConfig;
pub use core::error::SyncError;
pub use core::host::{
    ClickTarget, ContentRegion, DiffView, FileTree, Host, PayloadSource, PressedChange,
    Scheduler, SyncCheckbox, TreeNode, ViewedToggle,
};
pub use core::item::Item;
pub use core::path::PathHints;
pub use core::subscription::{ExpiringWatch, Subscription, WatchOutcome};
pub use core::tristate::TriState;
pub use core::viewed::{PayloadError, ViewedMap};
pub use engine::{RevealOutcome, TreeSync};
