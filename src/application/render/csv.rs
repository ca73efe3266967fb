//! CSV output: one `<key>,<bytes>` row per node in layout order.

use itertools::Itertools;

use crate::application::bytefmt::size_to_bytes;
use crate::domain::TreeArena;

fn field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Rows are keyed by the node path, not the display label, so the output
/// does not depend on label formatting.
pub fn render_csv(tree: &TreeArena) -> String {
    tree.iter_by_size()
        .map(|(_, node)| {
            format!(
                "{},{}\n",
                field(&node.data.key()),
                size_to_bytes(node.data.size)
            )
        })
        .join("")
}
