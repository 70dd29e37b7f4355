//! Tri-state aggregation over group items.
//!
//! A group's checkbox is never stored state: it is recomputed from the leaf
//! checkboxes rendered below it every time any of them changes. Items the host
//! removed without telling anyone simply stop being counted.

use super::host::{SyncCheckbox, TreeNode};
use super::item::Item;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriState {
    Unchecked,
    Checked,
    Mixed,
}

impl TriState {
    /// `Checked` iff every one of at least one leaf is checked, `Unchecked`
    /// iff none is (including when there are none), `Mixed` otherwise.
    pub fn from_counts(checked: usize, total: usize) -> Self {
        debug_assert!(checked <= total);
        if checked == 0 {
            TriState::Unchecked
        } else if checked == total {
            TriState::Checked
        } else {
            TriState::Mixed
        }
    }

    pub fn of(states: impl IntoIterator<Item = bool>) -> Self {
        let (checked, total) = states
            .into_iter()
            .fold((0, 0), |(checked, total), state| (checked + usize::from(state), total + 1));
        Self::from_counts(checked, total)
    }

    pub fn read(checkbox: &impl SyncCheckbox) -> Self {
        if checkbox.is_indeterminate() {
            TriState::Mixed
        } else if checkbox.is_checked() {
            TriState::Checked
        } else {
            TriState::Unchecked
        }
    }

    pub fn apply(self, checkbox: &impl SyncCheckbox) {
        checkbox.set_checked(self == TriState::Checked);
        checkbox.set_indeterminate(self == TriState::Mixed);
    }
}

/// Checked state of every leaf checkbox below `group`.
///
/// Leaves without a checkbox (unresolvable path, no label) are not counted.
pub fn leaf_states<N: TreeNode>(group: &Item<N>) -> Vec<bool> {
    group
        .leaf_descendants()
        .iter()
        .filter_map(|leaf| leaf.checkbox())
        .map(|checkbox| checkbox.is_checked())
        .collect()
}

/// Rewrites a group's checkbox from its current leaf descendants.
///
/// Returns `None` for leaves and for groups that have no checkbox yet; those
/// compute their state when they get one.
pub fn recompute<N: TreeNode>(group: &Item<N>) -> Option<TriState> {
    if !group.is_group() {
        return None;
    }
    let checkbox = group.node().checkbox()?;
    let state = TriState::of(leaf_states(group));
    state.apply(&checkbox);
    Some(state)
}

/// Recomputes every ancestor group of `item`, nearest first.
pub fn propagate_upward<N: TreeNode>(item: &Item<N>) {
    for group in item.ancestor_groups() {
        recompute(&Item::Group(group));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_map_to_states() {
        assert_eq!(TriState::from_counts(0, 0), TriState::Unchecked);
        assert_eq!(TriState::from_counts(0, 3), TriState::Unchecked);
        assert_eq!(TriState::from_counts(1, 3), TriState::Mixed);
        assert_eq!(TriState::from_counts(2, 3), TriState::Mixed);
        assert_eq!(TriState::from_counts(3, 3), TriState::Checked);
        assert_eq!(TriState::from_counts(1, 1), TriState::Checked);
    }

    #[test]
    fn of_matches_counting_for_every_small_mix() {
        for total in 0..6usize {
            for checked in 0..=total {
                let states = (0..total).map(|i| i < checked);
                let expected = TriState::from_counts(checked, total);
                assert_eq!(TriState::of(states), expected, "{checked}/{total}");
                assert_eq!(expected == TriState::Mixed, 0 < checked && checked < total);
                assert_eq!(expected == TriState::Checked, total > 0 && checked == total);
            }
        }
    }
}
