//! Content region and viewed toggle lookup by logical path.

use super::error::SyncError;
use super::host::{ContentRegion, DiffView};

/// Finds the region for `path`, trying in order: the expand-all affordance's
/// path attribute, a header whose text contains the path, then an anchor
/// whose identifier is the path.
pub fn locate_region<D: DiffView + ?Sized>(diff: &D, path: &str) -> Option<D::Region> {
    if path.is_empty() {
        return None;
    }
    diff.region_with_expand_path(path)
        .or_else(|| diff.region_with_header(path))
        .or_else(|| diff.region_by_anchor(path))
}

/// The viewed toggle for `path`, if its region is rendered and has one.
pub fn locate_control<D: DiffView + ?Sized>(
    diff: &D,
    path: &str,
) -> Result<<D::Region as ContentRegion>::Toggle, SyncError> {
    let region =
        locate_region(diff, path).ok_or_else(|| SyncError::RegionNotRendered(path.to_owned()))?;
    region
        .viewed_toggle()
        .ok_or_else(|| SyncError::ControlNotRendered(path.to_owned()))
}

/// Logical path of a region, read from its own expand-all affordance only.
pub fn region_path<R: ContentRegion>(region: &R) -> Option<String> {
    region.expand_path().filter(|path| !path.is_empty())
}
