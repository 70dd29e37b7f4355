//! Failure taxonomy for sync operations.
//!
//! None of these ever reach the page. Entry points log them at debug level
//! and leave the item unenhanced or revert the optimistic checkbox state.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("tree item has no resolvable logical path")]
    PathUnresolved,
    #[error("tree item has no label region to hold a checkbox")]
    NoLabelRegion,
    #[error("no content region rendered for `{0}`")]
    RegionNotRendered(String),
    #[error("content region for `{0}` has no viewed toggle")]
    ControlNotRendered(String),
}
