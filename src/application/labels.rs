//! Display labels written into `NodeData::name` before rendering.
//!
//! Labels are derived from the node's path, never from a previous label,
//! so applying them twice gives the same result.

use tracing::instrument;

use crate::application::bytefmt::format_size;
use crate::domain::{NodeData, NodeKind, TreeArena};

/// `"<segment> <size>"` with IEC units, e.g. `Foo 100.00B`.
///
/// The synthetic root shows only the total, e.g. `150.00B`.
#[instrument(level = "debug", skip_all)]
pub fn apply_size_labels(tree: &mut TreeArena) {
    relabel(tree, |data| {
        let size = format_size(data.size);
        match data.kind {
            NodeKind::Root => size,
            _ => format!("{} {}", segment(data), size),
        }
    });
}

/// `"<segment> <percent>% (<statements>)"`, e.g. `server.go 85.0% (120)`.
#[instrument(level = "debug", skip_all)]
pub fn apply_coverage_labels(tree: &mut TreeArena) {
    relabel(tree, |data| {
        let statements = data.size.max(0.0).floor();
        let percent = data.heat.unwrap_or(0.0) * 100.0;
        match data.kind {
            NodeKind::Root => format!("{:.1}% ({})", percent, statements),
            _ => format!("{} {:.1}% ({})", segment(data), percent, statements),
        }
    });
}

fn segment(data: &NodeData) -> &str {
    data.path.last().map(String::as_str).unwrap_or_default()
}

fn relabel<F>(tree: &mut TreeArena, label: F)
where
    F: Fn(&NodeData) -> String,
{
    let indices: Vec<_> = tree.iter().map(|(idx, _)| idx).collect();
    for idx in indices {
        if let Some(node) = tree.get_node_mut(idx) {
            node.data.name = label(&node.data);
        }
    }
}
