use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{NodeKind, Scope, ROOT_KEY};
use crate::domain::error::{DomainError, DomainResult};

/// Root-to-node path segments; with the kind's `Scope`, the identity of a node.
pub type NodePath = Vec<String>;

/// Data payload for tree nodes representing packages and symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Segments from the root to this node
    pub path: NodePath,
    /// Display label, rewritten by label formatting
    pub name: String,
    pub kind: NodeKind,
    /// Bytes attributed directly to this node, `None` when unset
    pub own_size: Option<f64>,
    /// Resolved size, valid after imputation
    pub size: f64,
    /// Optional heat in [0, 1], e.g. coverage ratio
    pub heat: Option<f64>,
}

impl NodeData {
    pub fn new(path: NodePath, kind: NodeKind) -> Self {
        let name = path.last().cloned().unwrap_or_default();
        Self {
            path,
            name,
            kind,
            own_size: None,
            size: 0.0,
            heat: None,
        }
    }

    /// The synthetic root with an empty path.
    pub fn root() -> Self {
        Self::new(Vec::new(), NodeKind::Root)
    }

    /// Path joined by `/`, unique per node.
    pub fn key(&self) -> String {
        if self.path.is_empty() {
            ROOT_KEY.to_string()
        } else {
            self.path.join("/")
        }
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn has_heat(&self) -> bool {
        self.heat.is_some()
    }

    /// Attribute `bytes` directly to this node, accumulating with earlier bytes.
    pub fn add_own_size(&mut self, bytes: f64) {
        self.own_size = Some(self.own_size.unwrap_or(0.0) + bytes);
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Package or symbol data for this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Arena-based tree of aggregated symbol sizes.
///
/// Nodes are addressed by generational indices; parent/child relations are
/// index lists, and a `path -> Index` map gives O(1) lookup by identity.
#[derive(Debug)]
pub struct TreeArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
    by_path: HashMap<(Scope, NodePath), Index>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            by_path: HashMap::new(),
        }
    }

    /// Tree holding only the synthetic root.
    pub fn with_root() -> Self {
        let mut tree = Self::new();
        tree.insert_node(NodeData::root(), None);
        tree
    }

    #[instrument(level = "trace", skip(self, data), fields(path = %data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let id = (data.kind.scope(), data.path.clone());
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        self.by_path.insert(id, node_idx);
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn root_node(&self) -> Option<&TreeNode> {
        self.root.and_then(|idx| self.get_node(idx))
    }

    /// Look up a package, symbol or root node by its path.
    pub fn find(&self, path: &[String]) -> Option<Index> {
        self.find_in(Scope::Tree, path)
    }

    /// Look up a node by path within one identity scope.
    pub fn find_in(&self, scope: Scope, path: &[String]) -> Option<Index> {
        self.by_path.get(&(scope, path.to_vec())).copied()
    }

    /// Look up a node by a `/`-joined key, e.g. `pkg/a/Foo`.
    ///
    /// Packages and symbols shadow a pure symbol or bucket with the same key.
    pub fn find_key(&self, key: &str) -> Option<&TreeNode> {
        let path: NodePath = if key == ROOT_KEY {
            Vec::new()
        } else {
            key.split('/').map(str::to_string).collect()
        };
        [Scope::Tree, Scope::Pure, Scope::Unknown]
            .into_iter()
            .find_map(|scope| self.find_in(scope, &path))
            .and_then(|idx| self.get_node(idx))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn children(&self, idx: Index) -> &[Index] {
        self.get_node(idx)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Size of the whole tree (size of the root after imputation).
    pub fn total_size(&self) -> f64 {
        self.root_node().map(|node| node.data.size).unwrap_or(0.0)
    }

    /// Children ordered by descending size, ties broken by path.
    pub fn sorted_children(&self, idx: Index) -> Vec<Index> {
        let mut children: Vec<Index> = self
            .children(idx)
            .iter()
            .copied()
            .filter(|&child| self.get_node(child).is_some())
            .collect();
        children.sort_by(|&a, &b| self.compare_by_size(a, b));
        children
    }

    fn compare_by_size(&self, a: Index, b: Index) -> Ordering {
        match (self.get_node(a), self.get_node(b)) {
            (Some(a), Some(b)) => b
                .data
                .size
                .total_cmp(&a.data.size)
                .then_with(|| a.data.path.cmp(&b.data.path))
                .then_with(|| a.data.kind.scope().cmp(&b.data.kind.scope())),
            _ => Ordering::Equal,
        }
    }

    /// Pre-order traversal in insertion order.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }

    /// Post-order traversal: children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator {
        PostOrderIterator::new(self)
    }

    /// Pre-order traversal with children by descending size, ties by path.
    ///
    /// This is the canonical output order shared by layout, CSV and tree output.
    pub fn iter_by_size(&self) -> SizeOrderIterator {
        SizeOrderIterator::new(self)
    }

    /// Number of levels below and including the root.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects the keys of all leaf nodes in size order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter_by_size()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.key())
            .collect()
    }

    /// Sum of `own_size` over a node and all its descendants.
    pub fn subtree_own_size(&self, idx: Index) -> f64 {
        let mut total = 0.0;
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get_node(current) {
                total += node.data.own_size.unwrap_or(0.0);
                stack.extend(node.children.iter().copied());
            }
        }
        total
    }

    /// Removes a node and all its descendants, detaching it from its parent.
    ///
    /// Returns the number of removed nodes.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_subtree(&mut self, idx: Index) -> usize {
        let parent = match self.get_node(idx) {
            Some(node) => node.parent,
            None => return 0,
        };
        if let Some(parent) = parent.and_then(|p| self.arena.get_mut(p)) {
            parent.children.retain(|&child| child != idx);
        }
        if self.root == Some(idx) {
            self.root = None;
        }

        let mut removed = 0;
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current) {
                self.by_path.remove(&(node.data.kind.scope(), node.data.path));
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// Makes a direct child of the root the new root and drops the old root node.
    ///
    /// The old root's other children, if any, are removed with it.
    #[instrument(level = "debug", skip(self))]
    pub fn promote_to_root(&mut self, idx: Index) -> DomainResult<()> {
        let old_root = self
            .root
            .ok_or_else(|| DomainError::NodeNotFound(ROOT_KEY.to_string()))?;
        let child = self
            .get_node(idx)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{:?}", idx)))?;
        if child.parent != Some(old_root) {
            return Err(DomainError::NotRootChild(child.data.key()));
        }

        if let Some(node) = self.arena.get_mut(idx) {
            node.parent = None;
        }
        if let Some(root) = self.arena.get_mut(old_root) {
            root.children.retain(|&c| c != idx);
        }
        self.remove_subtree(old_root);
        self.root = Some(idx);
        Ok(())
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push((root, false));
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

pub struct SizeOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> SizeOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for SizeOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                let sorted = self.arena.sorted_children(current_idx);
                self.stack.extend(sorted.into_iter().rev());
                return Some((current_idx, node));
            }
        }
        None
    }
}
