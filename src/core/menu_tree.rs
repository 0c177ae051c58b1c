//! Nested menu tree from the flat, parent pointing menu table.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::model::menu::Menu;

/// A record that points at its parent by id.
pub trait TreeItem {
    fn item_id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
}

impl TreeItem for Menu {
    fn item_id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.menu_id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    /// Rebuild the tree with every item transformed by `f`.
    pub fn map<U>(self, f: &impl Fn(T) -> U) -> TreeNode<U> {
        TreeNode {
            item: f(self.item),
            children: self.children.into_iter().map(|x| x.map(f)).collect(),
        }
    }
}

/// Build the forest hanging below `parent_id` (`None` = root group).
///
/// `items` must already be sorted (order_number, id); siblings keep their
/// relative input order. Items whose parent is not reachable from
/// `parent_id` are left out.
pub fn build_tree<T: TreeItem + Clone>(items: &[T], parent_id: Option<Uuid>) -> Vec<TreeNode<T>> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<&T>> = HashMap::new();
    for item in items {
        by_parent.entry(item.parent_id()).or_default().push(item);
    }
    let mut visited: HashSet<Uuid> = HashSet::new();
    if let Some(id) = parent_id {
        visited.insert(id);
    }
    attach_children(&by_parent, parent_id, &mut visited)
}

fn attach_children<T: TreeItem + Clone>(
    by_parent: &HashMap<Option<Uuid>, Vec<&T>>,
    parent_id: Option<Uuid>,
    visited: &mut HashSet<Uuid>,
) -> Vec<TreeNode<T>> {
    let Some(children) = by_parent.get(&parent_id) else {
        return vec![];
    };
    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        // a parent cycle in stored data must not recurse forever
        if !visited.insert(child.item_id()) {
            continue;
        }
        nodes.push(TreeNode {
            item: (*child).clone(),
            children: attach_children(by_parent, Some(child.item_id()), visited),
        });
    }
    nodes
}
