//! Tree normalization: symbol filtering, size imputation, depth limiting and
//! root collapsing.
//!
//! The transforms run in that order. Filtering must see the raw attributed
//! bytes so that folded symbol bytes take part in imputation, and imputation
//! must have resolved every size before depth limiting drops subtrees.

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::arena::TreeArena;
use crate::domain::entities::NodeKind;
use crate::domain::error::DomainResult;

/// Options controlling [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Keep individual symbols as leaves below their packages
    pub include_symbols: bool,
    /// Keep symbols without a package prefix
    pub include_pure_symbols: bool,
    /// Keep the bucket of empty or unparseable names
    pub include_unknown: bool,
    /// Maximum number of levels below the root, 0 for unlimited
    pub max_depth: usize,
    /// Size given to childless nodes that never received bytes
    pub empty_leaf_size: f64,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            include_symbols: false,
            include_pure_symbols: false,
            include_unknown: false,
            max_depth: 0,
            empty_leaf_size: 0.0,
        }
    }
}

/// Counts of what a normalization run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub filtered: usize,
    pub depth_limited: usize,
    pub collapsed: bool,
}

/// Applies all normalization transforms in order.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Fails only if the arena's root links are inconsistent.
    #[instrument(level = "debug", skip_all)]
    pub fn normalize(&self, tree: &mut TreeArena) -> DomainResult<NormalizeReport> {
        let filtered = filter_symbols(tree, &self.options);
        impute_sizes(tree, self.options.empty_leaf_size);
        let depth_limited = limit_depth(tree, self.options.max_depth);
        let collapsed = collapse_root(tree)?;

        let report = NormalizeReport {
            filtered,
            depth_limited,
            collapsed,
        };
        debug!("normalize: {:?}, {} nodes remain", report, tree.len());
        Ok(report)
    }
}

/// What filtering does with a node of a given kind.
enum Disposition {
    Keep,
    /// Remove the subtree and move its bytes to the parent
    Fold,
    /// Remove the subtree and discard its bytes
    Drop,
}

fn disposition(kind: NodeKind, options: &NormalizeOptions) -> Disposition {
    match kind {
        NodeKind::Symbol if !options.include_symbols => Disposition::Fold,
        NodeKind::PureSymbol if !options.include_pure_symbols => Disposition::Drop,
        NodeKind::Unknown if !options.include_unknown => Disposition::Drop,
        _ => Disposition::Keep,
    }
}

/// Remove symbol nodes the options exclude.
///
/// Excluded `Symbol` subtrees fold their bytes into their package so the
/// package keeps its full size; excluded pure symbols and the unknown bucket
/// are discarded. Ancestors are never removed.
///
/// Returns the number of removed nodes.
#[instrument(level = "debug", skip_all)]
pub fn filter_symbols(tree: &mut TreeArena, options: &NormalizeOptions) -> usize {
    let root = match tree.root() {
        Some(root) => root,
        None => return 0,
    };

    let mut folds: Vec<Index> = Vec::new();
    let mut drops: Vec<Index> = Vec::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        let node = match tree.get_node(current) {
            Some(node) => node,
            None => continue,
        };
        match disposition(node.data.kind, options) {
            Disposition::Keep => stack.extend(node.children.iter().copied()),
            Disposition::Fold => folds.push(current),
            Disposition::Drop => drops.push(current),
        }
    }

    let mut removed = 0;
    for idx in folds {
        let bytes = tree.subtree_own_size(idx);
        let parent = tree.get_node(idx).and_then(|node| node.parent);
        if let Some(parent) = parent.and_then(|p| tree.get_node_mut(p)) {
            if bytes > 0.0 {
                parent.data.add_own_size(bytes);
            }
        }
        removed += tree.remove_subtree(idx);
    }
    for idx in drops {
        removed += tree.remove_subtree(idx);
    }

    debug!("filter_symbols: removed {} nodes", removed);
    removed
}

/// Resolve every node's size bottom-up.
///
/// `size = own + Σ children`; a childless node without own bytes gets
/// `empty_leaf_size`.
#[instrument(level = "debug", skip(tree))]
pub fn impute_sizes(tree: &mut TreeArena, empty_leaf_size: f64) {
    let order: Vec<Index> = tree.iter_postorder().map(|(idx, _)| idx).collect();

    for idx in order {
        let (own, children) = match tree.get_node(idx) {
            Some(node) => (node.data.own_size, node.children.clone()),
            None => continue,
        };
        let sum: f64 = children
            .iter()
            .filter_map(|&child| tree.get_node(child))
            .map(|child| child.data.size)
            .sum();
        let size = match own {
            Some(own) => own + sum,
            None if children.is_empty() => empty_leaf_size,
            None => sum,
        };
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.size = size;
        }
    }
}

/// Remove all nodes more than `max_depth` levels below the root.
///
/// Nodes at exactly `max_depth` become leaves and keep their aggregate size,
/// which is also recorded as their own bytes. A `max_depth` of 0 means no limit.
///
/// Returns the number of removed nodes.
#[instrument(level = "debug", skip(tree))]
pub fn limit_depth(tree: &mut TreeArena, max_depth: usize) -> usize {
    if max_depth == 0 {
        return 0;
    }

    let boundary: Vec<Index> = tree
        .iter()
        .filter(|(_, node)| node.data.depth() == max_depth && !node.children.is_empty())
        .map(|(idx, _)| idx)
        .collect();

    let mut removed = 0;
    for idx in boundary {
        let children = tree.children(idx).to_vec();
        for child in children {
            removed += tree.remove_subtree(child);
        }
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.own_size = Some(node.data.size);
        }
    }

    debug!("limit_depth: removed {} nodes below depth {}", removed, max_depth);
    removed
}

/// Replace a synthetic root that has exactly one child by that child.
///
/// This is a single step, not a walk down the single-child chain: a named
/// package with one child (`only` -> `Sym`) stays, and a second call is a
/// no-op. Returns true when the root changed.
#[instrument(level = "debug", skip(tree))]
pub fn collapse_root(tree: &mut TreeArena) -> DomainResult<bool> {
    let (child, own) = match tree.root_node() {
        Some(root) if root.data.kind == NodeKind::Root && root.children.len() == 1 => {
            (root.children[0], root.data.own_size.unwrap_or(0.0))
        }
        _ => return Ok(false),
    };
    if own > 0.0 {
        return Ok(false);
    }

    tree.promote_to_root(child)?;
    debug!("collapse_root: promoted {:?}", child);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;
    use crate::domain::entities::SymbolRecord;
    use crate::domain::error::DomainError;

    fn build(records: &[(&str, u64)]) -> TreeArena {
        let records: Vec<SymbolRecord> = records
            .iter()
            .map(|(name, size)| SymbolRecord::new(*name, *size))
            .collect();
        TreeBuilder::default().build(&records)
    }

    fn size_of(tree: &TreeArena, key: &str) -> f64 {
        tree.find_key(key).map(|n| n.data.size).unwrap_or(-1.0)
    }

    fn with_symbols() -> NormalizeOptions {
        NormalizeOptions {
            include_symbols: true,
            ..NormalizeOptions::default()
        }
    }

    #[test]
    fn given_symbols_excluded_when_filtering_then_bytes_fold_into_package() {
        let mut tree = build(&[("pkg/a.Foo", 100), ("pkg/a.Baz", 20), ("pkg/b.Bar", 50)]);
        let removed = filter_symbols(&mut tree, &NormalizeOptions::default());
        assert_eq!(removed, 3);

        let a = tree.find_key("pkg/a").unwrap();
        assert!(a.children.is_empty());
        assert_eq!(a.data.own_size, Some(120.0));
        assert!(tree.find_key("pkg/a/Foo").is_none());
    }

    #[test]
    fn given_nested_symbols_excluded_when_filtering_then_whole_chain_folds() {
        let mut tree = build(&[("main.main", 10), ("main.main.func1", 4)]);
        filter_symbols(&mut tree, &NormalizeOptions::default());
        let main = tree.find_key("main").unwrap();
        assert_eq!(main.data.own_size, Some(14.0));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_pure_and_unknown_excluded_when_filtering_then_bytes_are_discarded() {
        let mut tree = build(&[("runtime.main", 8), ("_rt0_amd64", 16), ("", 4)]);
        filter_symbols(&mut tree, &with_symbols());
        impute_sizes(&mut tree, 0.0);
        assert_eq!(tree.total_size(), 8.0);
    }

    #[test]
    fn given_pure_and_unknown_included_when_filtering_then_they_are_kept() {
        let mut tree = build(&[("runtime.main", 8), ("_rt0_amd64", 16), ("", 4)]);
        let options = NormalizeOptions {
            include_symbols: true,
            include_pure_symbols: true,
            include_unknown: true,
            ..NormalizeOptions::default()
        };
        assert_eq!(filter_symbols(&mut tree, &options), 0);
        impute_sizes(&mut tree, 0.0);
        assert_eq!(tree.total_size(), 28.0);
    }

    #[test]
    fn given_built_tree_when_imputing_then_internal_nodes_sum_children() {
        let mut tree = build(&[("pkg/a.Foo", 100), ("pkg/b.Bar", 50)]);
        impute_sizes(&mut tree, 0.0);
        assert_eq!(size_of(&tree, "pkg"), 150.0);
        assert_eq!(size_of(&tree, "pkg/a"), 100.0);
        assert_eq!(size_of(&tree, "pkg/b/Bar"), 50.0);
        assert_eq!(tree.total_size(), 150.0);
    }

    #[test]
    fn given_node_with_own_bytes_and_children_when_imputing_then_both_count() {
        let mut tree = build(&[("main.f", 10), ("main.f.func1", 5)]);
        impute_sizes(&mut tree, 0.0);
        assert_eq!(size_of(&tree, "main/f"), 15.0);
        assert_eq!(size_of(&tree, "main"), 15.0);
    }

    #[test]
    fn given_empty_leaf_when_imputing_then_uses_default() {
        let mut tree = TreeArena::with_root();
        impute_sizes(&mut tree, 3.0);
        assert_eq!(tree.total_size(), 3.0);
    }

    #[test]
    fn given_max_depth_when_limiting_then_deeper_sizes_fold_into_boundary() {
        let mut tree = build(&[("a/b.C", 10), ("a/b.D", 30), ("a/e.F", 5)]);
        impute_sizes(&mut tree, 0.0);
        let removed = limit_depth(&mut tree, 1);
        assert_eq!(removed, 5);

        let a = tree.find_key("a").unwrap();
        assert!(a.children.is_empty());
        assert_eq!(a.data.size, 45.0);
        assert_eq!(a.data.own_size, Some(45.0));
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn given_zero_max_depth_when_limiting_then_nothing_changes() {
        let mut tree = build(&[("a/b.C", 10)]);
        impute_sizes(&mut tree, 0.0);
        assert_eq!(limit_depth(&mut tree, 0), 0);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn given_single_top_level_package_when_collapsing_then_it_becomes_root() {
        let mut tree = build(&[("only.Sym", 10)]);
        impute_sizes(&mut tree, 0.0);
        assert!(collapse_root(&mut tree).unwrap());
        let root = tree.root_node().unwrap();
        assert_eq!(root.data.key(), "only");
        assert_eq!(root.data.size, 10.0);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn given_collapsed_tree_when_collapsing_again_then_noop() {
        let mut tree = build(&[("only.Sym", 10)]);
        impute_sizes(&mut tree, 0.0);
        collapse_root(&mut tree).unwrap();
        let before = tree.root();
        assert!(!collapse_root(&mut tree).unwrap());
        assert_eq!(tree.root(), before);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn given_several_top_level_packages_when_collapsing_then_root_is_kept() {
        let mut tree = build(&[("a.X", 1), ("b.Y", 2)]);
        impute_sizes(&mut tree, 0.0);
        assert!(!collapse_root(&mut tree).unwrap());
        assert_eq!(tree.root_node().unwrap().data.kind, NodeKind::Root);
    }

    #[test]
    fn given_detached_only_child_when_collapsing_then_reports_domain_error() {
        let mut tree = build(&[("only.Sym", 10)]);
        let only = tree.find(&["only".to_string()]).unwrap();
        tree.get_node_mut(only).unwrap().parent = None;

        let result = Normalizer::default().normalize(&mut tree);

        assert!(matches!(result, Err(DomainError::NotRootChild(key)) if key == "only"));
    }

    #[test]
    fn given_empty_tree_when_normalizing_then_stays_root_only() {
        let mut tree = TreeArena::with_root();
        let report = Normalizer::default().normalize(&mut tree).unwrap();
        assert_eq!(report, NormalizeReport::default());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.total_size(), 0.0);
    }
}
