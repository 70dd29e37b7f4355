//! Typed view over rendered tree nodes.

use super::host::TreeNode;

/// A tree item, tagged by kind.
///
/// Wraps a host node; the host decides what is a group via
/// [`TreeNode::is_group`]. Everything here re-queries the host, so an item
/// always reflects what is rendered right now.
#[derive(Clone, Debug, PartialEq)]
pub enum Item<N> {
    Leaf(N),
    Group(N),
}

impl<N: TreeNode> Item<N> {
    pub fn from_node(node: N) -> Self {
        if node.is_group() {
            Item::Group(node)
        } else {
            Item::Leaf(node)
        }
    }

    pub fn node(&self) -> &N {
        match self {
            Item::Leaf(node) | Item::Group(node) => node,
        }
    }

    pub fn into_node(self) -> N {
        match self {
            Item::Leaf(node) | Item::Group(node) => node,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Item::Group(_))
    }

    pub fn parent(&self) -> Option<Item<N>> {
        self.node().parent_item().map(Item::from_node)
    }

    /// Directly nested items. Always empty for a leaf.
    pub fn children(&self) -> Vec<Item<N>> {
        match self {
            Item::Leaf(_) => Vec::new(),
            Item::Group(node) => node.child_items().into_iter().map(Item::from_node).collect(),
        }
    }

    pub fn logical_path(&self) -> Option<String> {
        self.node().path_hints().resolve()
    }

    /// Every leaf currently rendered anywhere below this item.
    pub fn leaf_descendants(&self) -> Vec<N> {
        let mut leaves = Vec::new();
        let mut pending = self.children();
        while let Some(item) = pending.pop() {
            match item {
                Item::Leaf(node) => leaves.push(node),
                Item::Group(_) => pending.extend(item.children()),
            }
        }
        leaves
    }

    /// Enclosing groups from the nearest one up to the root.
    pub fn ancestor_groups(&self) -> impl Iterator<Item = N> {
        std::iter::successors(self.node().parent_item(), |node| node.parent_item())
            .filter(|node| node.is_group())
    }
}
