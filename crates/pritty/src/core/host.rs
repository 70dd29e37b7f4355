//! Capability traits implemented by a page adapter.
//!
//! The engine only ever talks to the page through these. Three integration
//! points (bulk payload, file tree, diff view) plus a scheduler. Handles are
//! cheap `Clone` references to host-owned elements; the engine never creates
//! or destroys tree items or regions, only the checkboxes it attaches.

use std::time::Duration;

use super::path::PathHints;
use super::subscription::Subscription;

/// Source of the page's embedded JSON payload.
pub trait PayloadSource {
    /// Raw text of the embedded payload, if the page has one.
    fn embedded_payload(&self) -> Option<String>;
}

/// A checkbox attached by the engine to a tree item's label region.
pub trait SyncCheckbox: Clone + 'static {
    fn is_checked(&self) -> bool;
    fn set_checked(&self, checked: bool);
    fn is_indeterminate(&self) -> bool;
    fn set_indeterminate(&self, indeterminate: bool);
}

/// A rendered item of the file tree.
pub trait TreeNode: Clone + PartialEq + 'static {
    type Checkbox: SyncCheckbox;

    /// Folders are groups; files are leaves.
    fn is_group(&self) -> bool;

    /// Nearest enclosing tree item.
    fn parent_item(&self) -> Option<Self>;

    /// Items directly nested below this one that are currently rendered.
    fn child_items(&self) -> Vec<Self>;

    fn path_hints(&self) -> PathHints;

    /// This item's own checkbox (never a descendant's).
    fn checkbox(&self) -> Option<Self::Checkbox>;

    /// Inserts a checkbox at the start of the item's label region.
    ///
    /// `on_activate` runs after the checkbox's native toggle has flipped
    /// `checked`, and must not propagate the click further. Returns `None`
    /// when the item has no label region.
    fn attach_checkbox(&self, on_activate: Box<dyn Fn()>) -> Option<Self::Checkbox>;
}

/// Where a click inside the tree container landed.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickTarget<N> {
    /// One of the engine's own checkboxes.
    SyncCheckbox,
    /// Inside a tree item, resolved to the nearest enclosing one.
    Item(N),
    /// Inside the container but outside every item.
    Outside,
}

/// The hierarchical file tree container.
pub trait FileTree: 'static {
    type Node: TreeNode;

    /// Whether the enhancement marker is present on the tree's sidebar.
    fn is_enhanced(&self) -> bool;

    /// Sets the enhancement marker. Returns `false` when the sidebar is absent.
    fn mark_enhanced(&self) -> bool;

    fn clear_enhanced(&self);

    /// Every rendered item in document order.
    fn items(&self) -> Vec<Self::Node>;

    /// Removes every checkbox the engine attached and its listener.
    fn remove_checkboxes(&self);

    /// Reports items found in subtrees added to the tree: the added node
    /// itself when it is an item, plus all items nested in it. `None` when
    /// the tree root is not rendered.
    fn observe_additions(&self, on_added: Box<dyn Fn(Vec<Self::Node>)>) -> Option<Subscription>;

    /// Delegated click listener on the tree container.
    fn observe_clicks(
        &self,
        on_click: Box<dyn Fn(ClickTarget<Self::Node>)>,
    ) -> Option<Subscription>;
}

/// The host's viewed toggle for one file.
pub trait ViewedToggle: Clone + 'static {
    fn is_pressed(&self) -> bool;

    /// Native activation, as if the user clicked it.
    fn activate(&self);
}

/// One file's diff entry.
pub trait ContentRegion: Clone + 'static {
    type Toggle: ViewedToggle;

    /// Path attribute carried by the region's expand-all affordance.
    fn expand_path(&self) -> Option<String>;

    fn header_text(&self) -> Option<String>;

    fn viewed_toggle(&self) -> Option<Self::Toggle>;

    fn is_collapsed(&self) -> bool;

    /// Triggers the region's own expand/collapse affordance. Returns `false`
    /// when it has none.
    fn expand(&self) -> bool;

    /// Triggers "expand all lines" if rendered. Returns whether it was.
    fn expand_all(&self) -> bool;

    /// Child list changes anywhere inside this region only.
    fn observe_subtree(&self, on_change: Box<dyn Fn()>) -> Subscription;
}

/// An observed `pressed` attribute change on some viewed toggle.
#[derive(Clone, Debug, PartialEq)]
pub struct PressedChange<R> {
    /// Region enclosing the toggle, if it sits inside one.
    pub region: Option<R>,
    pub pressed: bool,
}

/// The diff area holding every content region.
pub trait DiffView: 'static {
    type Region: ContentRegion;

    /// Region whose expand-all affordance carries exactly `path`.
    fn region_with_expand_path(&self, path: &str) -> Option<Self::Region>;

    /// Every rendered region in document order.
    fn regions(&self) -> Vec<Self::Region>;

    /// First region whose header text contains `path`.
    fn region_with_header(&self, path: &str) -> Option<Self::Region> {
        self.regions().into_iter().find(|region| {
            region
                .header_text()
                .is_some_and(|header| header.contains(path))
        })
    }

    /// Region enclosing the element whose identifier is exactly `id`.
    fn region_by_anchor(&self, id: &str) -> Option<Self::Region>;

    /// Watches the pressed attribute of every viewed toggle in the diff area.
    fn observe_pressed(
        &self,
        on_change: Box<dyn Fn(PressedChange<Self::Region>)>,
    ) -> Subscription;
}

/// Cooperative scheduling points.
pub trait Scheduler: 'static {
    /// Runs `task` at the next idle point (after pending mutations are delivered).
    fn defer(&self, task: Box<dyn FnOnce()>);

    /// Runs `task` once `after` has elapsed unless the subscription is cancelled.
    fn delay(&self, after: Duration, task: Box<dyn FnOnce()>) -> Subscription;
}

/// Everything the engine needs from a page.
pub trait Host: PayloadSource + FileTree + DiffView + Scheduler {}

impl<T> Host for T where T: PayloadSource + FileTree + DiffView + Scheduler {}

pub type NodeOf<H> = <H as FileTree>::Node;
pub type CheckboxOf<H> = <NodeOf<H> as TreeNode>::Checkbox;
pub type RegionOf<H> = <H as DiffView>::Region;
pub type ToggleOf<H> = <RegionOf<H> as ContentRegion>::Toggle;
