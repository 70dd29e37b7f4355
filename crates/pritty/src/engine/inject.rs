//! Checkbox injection for tree items.

use std::rc::Rc;

use log::trace;

use super::Shared;
use crate::core::error::SyncError;
use crate::core::host::{Host, NodeOf, SyncCheckbox, TreeNode};
use crate::core::item::Item;
use crate::core::tristate;
use crate::core::viewed::ViewedMap;

impl<H: Host> Shared<H> {
    pub(super) fn inject_batch(self: &Rc<Self>, nodes: Vec<NodeOf<H>>, viewed: &ViewedMap) {
        for node in nodes {
            self.inject_reported(&node, viewed);
        }
    }

    pub(super) fn inject_reported(self: &Rc<Self>, node: &NodeOf<H>, viewed: &ViewedMap) -> bool {
        self.inject(node, viewed).unwrap_or_else(|err| {
            trace!("tree item left unenhanced: {err}");
            false
        })
    }

    /// `Ok(false)` when the item already carries a checkbox. A seeded leaf
    /// re-aggregates the groups above it before returning.
    fn inject(self: &Rc<Self>, node: &NodeOf<H>, viewed: &ViewedMap) -> Result<bool, SyncError> {
        if node.checkbox().is_some() {
            return Ok(false);
        }
        match Item::from_node(node.clone()) {
            leaf @ Item::Leaf(_) => {
                let path = leaf.logical_path().ok_or(SyncError::PathUnresolved)?;
                let node = leaf.into_node();
                let checkbox = node
                    .attach_checkbox(self.on_activate(node.clone(), Self::toggle_leaf))
                    .ok_or(SyncError::NoLabelRegion)?;
                checkbox.set_checked(viewed.is_viewed(&path));
                trace!("seeded `{path}` as viewed={}", checkbox.is_checked());
                tristate::propagate_upward(&Item::Leaf(node));
            }
            Item::Group(group) => {
                group
                    .attach_checkbox(self.on_activate(group.clone(), Self::toggle_group))
                    .ok_or(SyncError::NoLabelRegion)?;
                // Children of a freshly rendered folder may not exist yet.
                self.host.defer(Box::new(move || {
                    tristate::recompute(&Item::Group(group));
                }));
            }
        }
        Ok(true)
    }

    fn on_activate(
        self: &Rc<Self>,
        node: NodeOf<H>,
        action: fn(&Self, &NodeOf<H>),
    ) -> Box<dyn Fn()> {
        let shared = Rc::downgrade(self);
        Box::new(move || {
            if let Some(shared) = shared.upgrade() {
                action(&shared, &node);
            }
        })
    }
}
