/*
Text tree output via termtree.

A local trait is needed to add the conversion to `TreeArena`, the same way a
conversion to a foreign type would require one.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::TreeArena;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for TreeArena {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string(&self) -> Tree<String> {
        if let Some(root_idx) = self.root() {
            let label = self
                .get_node(root_idx)
                .map(|node| node.data.name.clone())
                .unwrap_or_default();
            let mut tree = Tree::new(label);

            // Children in layout order: size descending, then path
            fn build_tree(arena: &TreeArena, node_idx: Index, parent_tree: &mut Tree<String>) {
                for child_idx in arena.sorted_children(node_idx) {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.data.name.clone());
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }

            build_tree(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}

pub fn render_text(tree: &TreeArena) -> String {
    tree.to_tree_string().to_string()
}
