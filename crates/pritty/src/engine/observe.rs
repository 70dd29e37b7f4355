//! Host subscriptions: pressed-state observer, tree observer, click router.

use std::rc::Rc;

use log::{debug, trace};

use super::Shared;
use crate::core::host::{ClickTarget, Host, NodeOf, PressedChange, RegionOf};
use crate::core::item::Item;
use crate::core::locate::region_path;
use crate::core::subscription::Subscription;
use crate::core::viewed::ViewedMap;

impl<H: Host> Shared<H> {
    /// Host → tree direction. The region's path comes from its own
    /// expand-all affordance, since the mutation target is a toggle and not a
    /// tree item.
    pub(super) fn observe_pressed(self: &Rc<Self>) -> Subscription {
        let shared = Rc::downgrade(self);
        self.host
            .observe_pressed(Box::new(move |change: PressedChange<RegionOf<H>>| {
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                let Some(path) = change.region.as_ref().and_then(region_path) else {
                    debug!("dropping pressed change outside a region with a path");
                    return;
                };
                if !shared.apply_external_change(&path, change.pressed) {
                    trace!("no tree checkbox for `{path}` yet");
                }
            }))
    }

    /// Injects items as the host renders them, seeded from the snapshot taken
    /// at `init`.
    pub(super) fn observe_tree(self: &Rc<Self>, viewed: Rc<ViewedMap>) -> Option<Subscription> {
        let shared = Rc::downgrade(self);
        let subscription = self
            .host
            .observe_additions(Box::new(move |nodes: Vec<NodeOf<H>>| {
                if let Some(shared) = shared.upgrade() {
                    shared.inject_batch(nodes, &viewed);
                }
            }));
        if subscription.is_none() {
            debug!("file tree root not rendered, later items stay unenhanced");
        }
        subscription
    }

    pub(super) fn route_clicks(self: &Rc<Self>) -> Option<Subscription> {
        let shared = Rc::downgrade(self);
        self.host
            .observe_clicks(Box::new(move |target: ClickTarget<NodeOf<H>>| {
                if let Some(shared) = shared.upgrade() {
                    shared.route_click(target);
                }
            }))
    }

    /// Checkbox clicks are handled by the checkbox itself and folder clicks
    /// keep their native expand/collapse; a file click reveals its diff.
    pub(super) fn route_click(&self, target: ClickTarget<NodeOf<H>>) {
        let node = match target {
            ClickTarget::Item(node) => node,
            ClickTarget::SyncCheckbox | ClickTarget::Outside => return,
        };
        let item = Item::from_node(node);
        if item.is_group() {
            return;
        }
        match item.logical_path() {
            Some(path) => {
                self.reveal(&path);
            }
            None => trace!("clicked file has no resolvable path"),
        }
    }
}
