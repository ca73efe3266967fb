//! Tree builder turning flat symbol records into an aggregate hierarchy.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::entities::{NodeKind, SymbolRecord, SymbolSegments, UNKNOWN_SEGMENT};
use crate::domain::segment::{GoSymbolSegmenter, PathSegmenter};

/// Constructs aggregate trees from symbol records.
pub struct TreeBuilder {
    segmenter: Box<dyn PathSegmenter>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(Box::new(GoSymbolSegmenter))
    }
}

impl TreeBuilder {
    pub fn new(segmenter: Box<dyn PathSegmenter>) -> Self {
        Self { segmenter }
    }

    /// Build a tree rooted at a synthetic root from all records.
    ///
    /// Sizes are attributed to terminal nodes only; intermediate nodes stay
    /// unset until imputation.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn build(&self, records: &[SymbolRecord]) -> TreeArena {
        let mut tree = TreeArena::with_root();
        let mut unknown = 0usize;

        for record in records {
            match self.segmenter.segment(&record.name) {
                Some(segments) if !segments.is_empty() => {
                    self.insert_segments(&mut tree, &segments, record.size as f64);
                }
                _ => {
                    unknown += 1;
                    self.insert_unknown(&mut tree, record.size as f64);
                }
            }
        }

        debug!(
            "build: {} records -> {} nodes ({} unknown)",
            records.len(),
            tree.len(),
            unknown
        );
        tree
    }

    /// Insert every prefix of the segmented path and add `size` to the terminal node.
    ///
    /// Returns the terminal node's index.
    pub fn insert_segments(&self, tree: &mut TreeArena, segments: &SymbolSegments, size: f64) -> Index {
        if segments.is_pure() {
            let name = segments.symbol.join(".");
            return self.insert_terminal(tree, vec![name], NodeKind::PureSymbol, size);
        }

        let path = segments.path();
        let mut parent = self.ensure_root(tree);
        for depth in 1..path.len() {
            let kind = kind_at(segments, depth);
            parent = ensure_child(tree, parent, &path[..depth], kind);
        }
        let kind = kind_at(segments, path.len());
        self.insert_terminal(tree, path, kind, size)
    }

    fn insert_unknown(&self, tree: &mut TreeArena, size: f64) -> Index {
        self.insert_terminal(tree, vec![UNKNOWN_SEGMENT.to_string()], NodeKind::Unknown, size)
    }

    fn insert_terminal(&self, tree: &mut TreeArena, path: Vec<String>, kind: NodeKind, size: f64) -> Index {
        let parent_path = &path[..path.len() - 1];
        let parent = match tree.find(parent_path) {
            Some(idx) => idx,
            None => self.ensure_root(tree),
        };
        let idx = ensure_child(tree, parent, &path, kind);
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.add_own_size(size);
        }
        idx
    }

    fn ensure_root(&self, tree: &mut TreeArena) -> Index {
        match tree.root() {
            Some(root) => root,
            None => tree.insert_node(NodeData::root(), None),
        }
    }
}

/// Kind of the node at `depth` (1-based) along the segmented path.
fn kind_at(segments: &SymbolSegments, depth: usize) -> NodeKind {
    if depth <= segments.package.len() {
        NodeKind::Package
    } else {
        NodeKind::Symbol
    }
}

/// Find or create the node for `path` in the identity scope of `kind`.
///
/// A path that is both a symbol and a package prefix (`a.B` next to
/// `a/B.c`) becomes a package whichever record comes first.
fn ensure_child(tree: &mut TreeArena, parent: Index, path: &[String], kind: NodeKind) -> Index {
    match tree.find_in(kind.scope(), path) {
        Some(idx) => {
            if kind == NodeKind::Package {
                if let Some(node) = tree.get_node_mut(idx) {
                    node.data.kind = NodeKind::Package;
                }
            }
            idx
        }
        None => tree.insert_node(NodeData::new(path.to_vec(), kind), Some(parent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Scope;
    use crate::domain::segment::DelimitedSegmenter;
    use rstest::rstest;

    fn key(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    #[test]
    fn given_records_with_shared_prefix_when_building_then_merges_prefixes() {
        let records = vec![
            SymbolRecord::new("pkg/a.Foo", 100),
            SymbolRecord::new("pkg/b.Bar", 50),
        ];
        let tree = TreeBuilder::default().build(&records);

        // root, pkg, pkg/a, pkg/a/Foo, pkg/b, pkg/b/Bar
        assert_eq!(tree.len(), 6);
        let pkg = tree.get_node(tree.find(&key("pkg")).unwrap()).unwrap();
        assert_eq!(pkg.data.kind, NodeKind::Package);
        assert_eq!(pkg.data.own_size, None);
        assert_eq!(pkg.children.len(), 2);

        let foo = tree.get_node(tree.find(&key("pkg/a/Foo")).unwrap()).unwrap();
        assert_eq!(foo.data.kind, NodeKind::Symbol);
        assert_eq!(foo.data.own_size, Some(100.0));
        assert_eq!(foo.data.name, "Foo");
    }

    #[test]
    fn given_duplicate_symbols_when_building_then_sizes_accumulate() {
        let records = vec![
            SymbolRecord::new("main.init", 10),
            SymbolRecord::new("main.init", 5),
        ];
        let tree = TreeBuilder::default().build(&records);
        let init = tree.get_node(tree.find(&key("main/init")).unwrap()).unwrap();
        assert_eq!(init.data.own_size, Some(15.0));
    }

    #[test]
    fn given_pure_symbol_when_building_then_attaches_under_root() {
        let tree = TreeBuilder::default().build(&[SymbolRecord::new("_rt0_amd64_linux", 32)]);
        let idx = tree.find_in(Scope::Pure, &["_rt0_amd64_linux".to_string()]).unwrap();
        let node = tree.get_node(idx).unwrap();
        assert_eq!(node.data.kind, NodeKind::PureSymbol);
        assert_eq!(node.parent, tree.root());
    }

    #[test]
    fn given_empty_name_when_building_then_goes_to_unknown_bucket() {
        let tree = TreeBuilder::default().build(&[
            SymbolRecord::new("", 7),
            SymbolRecord::new("  ", 3),
        ]);
        let idx = tree.find_in(Scope::Unknown, &[UNKNOWN_SEGMENT.to_string()]).unwrap();
        let node = tree.get_node(idx).unwrap();
        assert_eq!(node.data.kind, NodeKind::Unknown);
        assert_eq!(node.data.own_size, Some(10.0));
    }

    #[rstest]
    #[case(&[("main.main", 256), ("other.X", 10), ("main", 32)])]
    #[case(&[("main", 32), ("main.main", 256), ("other.X", 10)])]
    fn given_pure_symbol_named_like_package_when_building_then_both_nodes_exist(
        #[case] records: &[(&str, u64)],
    ) {
        let records: Vec<SymbolRecord> = records
            .iter()
            .map(|&(name, size)| SymbolRecord::new(name, size))
            .collect();
        let tree = TreeBuilder::default().build(&records);

        let package = tree.get_node(tree.find(&key("main")).unwrap()).unwrap();
        assert_eq!(package.data.kind, NodeKind::Package);
        assert_eq!(package.data.own_size, None);
        assert_eq!(package.children.len(), 1);

        let pure = tree.find_in(Scope::Pure, &key("main")).unwrap();
        let pure = tree.get_node(pure).unwrap();
        assert_eq!(pure.data.kind, NodeKind::PureSymbol);
        assert_eq!(pure.data.own_size, Some(32.0));
        assert_eq!(pure.parent, tree.root());
    }

    #[rstest]
    #[case(&["a.B", "a/B.c"])]
    #[case(&["a/B.c", "a.B"])]
    fn given_symbol_that_is_also_package_when_building_then_package_wins(#[case] names: &[&str]) {
        let records: Vec<SymbolRecord> = names.iter().map(|&name| SymbolRecord::new(name, 8)).collect();
        let tree = TreeBuilder::default().build(&records);

        let node = tree.get_node(tree.find(&key("a/B")).unwrap()).unwrap();
        assert_eq!(node.data.kind, NodeKind::Package);
        assert_eq!(node.data.own_size, Some(8.0));
        let c = tree.get_node(tree.find(&key("a/B/c")).unwrap()).unwrap();
        assert_eq!(c.data.kind, NodeKind::Symbol);
    }

    #[test]
    fn given_every_node_when_built_then_path_extends_parent_path_by_one() {
        let records = vec![
            SymbolRecord::new("github.com/x/y.(*T).M", 1),
            SymbolRecord::new("github.com/x/z.F", 2),
            SymbolRecord::new("runtime.main", 3),
            SymbolRecord::new("go:buildid", 4),
        ];
        let tree = TreeBuilder::default().build(&records);
        for (_, node) in tree.iter() {
            match node.parent {
                None => assert!(node.data.path.is_empty()),
                Some(parent) => {
                    let parent = tree.get_node(parent).unwrap();
                    assert_eq!(node.data.path.len(), parent.data.path.len() + 1);
                    assert_eq!(node.data.path[..parent.data.path.len()], parent.data.path[..]);
                }
            }
        }
    }

    #[test]
    fn given_delimited_segmenter_when_building_then_uses_namespaces() {
        let builder = TreeBuilder::new(Box::new(DelimitedSegmenter::default()));
        let tree = builder.build(&[SymbolRecord::new("app::net::Socket::send", 64)]);
        let ns = tree.get_node(tree.find(&key("app/net")).unwrap()).unwrap();
        assert_eq!(ns.data.kind, NodeKind::Package);
        let ty = tree.get_node(tree.find(&key("app/net/Socket")).unwrap()).unwrap();
        assert_eq!(ty.data.kind, NodeKind::Package);
        let method = tree.get_node(tree.find(&key("app/net/Socket/send")).unwrap()).unwrap();
        assert_eq!(method.data.kind, NodeKind::Symbol);
    }
}
