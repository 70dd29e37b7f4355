//! Leaf state changes in both directions, and group toggles.
//!
//! Every path that changes a leaf checkbox ends by re-aggregating the groups
//! above it before returning.

use log::debug;

use super::Shared;
use crate::core::error::SyncError;
use crate::core::host::{Host, NodeOf, SyncCheckbox, ToggleOf, TreeNode, ViewedToggle};
use crate::core::item::Item;
use crate::core::locate::locate_control;
use crate::core::tristate;

impl<H: Host> Shared<H> {
    /// The native checkbox toggle has already flipped `checked`. With a
    /// rendered viewed toggle, activate it and show the state it should land
    /// in; the pressed observer corrects a wrong guess. Without one, put the
    /// checkbox back.
    pub(super) fn toggle_leaf(&self, leaf: &NodeOf<H>) {
        let Some(checkbox) = leaf.checkbox() else {
            return;
        };
        let prior = !checkbox.is_checked();
        match self.control_for(leaf) {
            Ok(toggle) => {
                let was_pressed = toggle.is_pressed();
                toggle.activate();
                checkbox.set_checked(!was_pressed);
            }
            Err(err) => {
                debug!("viewed toggle rejected: {err}");
                checkbox.set_checked(prior);
            }
        }
        tristate::propagate_upward(&Item::Leaf(leaf.clone()));
    }

    /// Checks every leaf below `group` unless all already are, in which case
    /// unchecks them. Leaves whose toggle is not rendered stay as they are.
    pub(super) fn toggle_group(&self, group: &NodeOf<H>) {
        let item = Item::Group(group.clone());
        let leaves: Vec<_> = item
            .leaf_descendants()
            .into_iter()
            .filter_map(|leaf| leaf.checkbox().map(|checkbox| (leaf, checkbox)))
            .collect();
        let all_checked =
            !leaves.is_empty() && leaves.iter().all(|(_, checkbox)| checkbox.is_checked());
        let target = !all_checked;

        for (leaf, checkbox) in &leaves {
            if checkbox.is_checked() == target {
                continue;
            }
            match self.control_for(leaf) {
                Ok(toggle) => {
                    if toggle.is_pressed() != target {
                        toggle.activate();
                    }
                    checkbox.set_checked(target);
                }
                Err(err) => debug!("leaving leaf unchanged: {err}"),
            }
        }

        tristate::recompute(&item);
        tristate::propagate_upward(&item);
    }

    /// Host-side change, already the truth: no toggling, no optimism.
    pub(super) fn apply_external_change(&self, path: &str, pressed: bool) -> bool {
        let leaf = self
            .host
            .items()
            .into_iter()
            .map(Item::from_node)
            .find(|item| !item.is_group() && item.logical_path().as_deref() == Some(path));
        let Some(leaf) = leaf else {
            return false;
        };
        let Some(checkbox) = leaf.node().checkbox() else {
            return false;
        };
        checkbox.set_checked(pressed);
        tristate::propagate_upward(&leaf);
        true
    }

    fn control_for(&self, leaf: &NodeOf<H>) -> Result<ToggleOf<H>, SyncError> {
        let path = Item::Leaf(leaf.clone())
            .logical_path()
            .ok_or(SyncError::PathUnresolved)?;
        locate_control(&self.host, &path)
    }
}
