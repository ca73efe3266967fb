//! Squarified treemap layout.
//!
//! Children are sorted by descending size and packed into rows along the
//! shorter side of the remaining rectangle, extending a row while its worst
//! aspect ratio does not get worse (Bruls, Huizing, van Wijk).

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::TreeArena;
use crate::domain::entities::LayoutBox;

/// Canvas geometry and spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    /// Gap between sibling boxes
    pub margin_box: f64,
    /// Space between a box border and its content
    pub padding_box: f64,
    /// Space around the outermost box
    pub padding_root: f64,
    /// Band at the top of a box reserved for its label
    pub title_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1028.0,
            height: 640.0,
            margin_box: 4.0,
            padding_box: 4.0,
            padding_root: 16.0,
            title_height: 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w: clamp_extent(w),
            h: clamp_extent(h),
        }
    }

    fn area(self) -> f64 {
        self.w * self.h
    }

    fn is_visible(self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    /// Shrink by `d` on every side; extents never go below zero.
    fn inset(self, d: f64) -> Self {
        let d = clamp_extent(d);
        let dx = d.min(self.w / 2.0);
        let dy = d.min(self.h / 2.0);
        Self::new(self.x + dx, self.y + dy, self.w - 2.0 * d, self.h - 2.0 * d)
    }

    fn cut_top(self, band: f64) -> Self {
        Self::new(self.x, self.y + band, self.w, self.h - band)
    }
}

fn clamp_extent(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Compute one box per visible node, in size-ordered pre-order.
///
/// Zero-size nodes and nodes whose box would be empty are skipped together
/// with their subtrees.
#[instrument(level = "debug", skip_all, fields(width = config.width, height = config.height))]
pub fn compute_layout(tree: &TreeArena, config: &LayoutConfig) -> Vec<LayoutBox> {
    let mut boxes = Vec::with_capacity(tree.len());
    if let Some(root) = tree.root() {
        let canvas = Rect::new(0.0, 0.0, config.width, config.height);
        place(tree, root, canvas.inset(config.padding_root), 0, config, &mut boxes);
    }
    debug!("compute_layout: {} boxes for {} nodes", boxes.len(), tree.len());
    boxes
}

/// Lay out `idx` in `rect` and recurse into its children.
///
/// Cells are proportional to size; the sibling margin is taken out of each
/// cell afterwards, so a long thin cell loses more of its area than a square
/// one. With `margin_box > 0` a larger sibling can therefore end up with a
/// slightly smaller box than a squarer, smaller one.
fn place(
    tree: &TreeArena,
    idx: Index,
    rect: Rect,
    depth: usize,
    config: &LayoutConfig,
    out: &mut Vec<LayoutBox>,
) {
    let node = match tree.get_node(idx) {
        Some(node) => node,
        None => return,
    };
    let size = node.data.size;
    if !(size.is_finite() && size > 0.0) || !rect.is_visible() {
        trace!("skip {}: size={} rect={:?}", node.data, size, rect);
        return;
    }

    out.push(LayoutBox {
        node: idx,
        x: rect.x,
        y: rect.y,
        width: rect.w,
        height: rect.h,
        depth,
    });

    let content = content_rect(rect, config);
    if !content.is_visible() {
        return;
    }

    let total_area = content.area();
    let items: Vec<(Index, f64)> = tree
        .sorted_children(idx)
        .into_iter()
        .filter_map(|child| {
            let child_size = tree.get_node(child)?.data.size;
            let area = child_size / size * total_area;
            (area.is_finite() && area > 0.0).then_some((child, area))
        })
        .collect();
    if items.is_empty() {
        return;
    }

    let areas: Vec<f64> = items.iter().map(|&(_, area)| area).collect();
    let cells = squarify(&areas, content);
    for (&(child, _), cell) in items.iter().zip(cells) {
        place(tree, child, cell.inset(config.margin_box / 2.0), depth + 1, config, out);
    }
}

fn content_rect(rect: Rect, config: &LayoutConfig) -> Rect {
    let content = rect.inset(config.padding_box);
    let band = clamp_extent(config.title_height);
    if band > 0.0 && content.h >= 2.0 * band {
        content.cut_top(band)
    } else {
        content
    }
}

/// Place `areas` (sorted descending) into `bounds`.
///
/// Returns one rectangle per area in input order; when the areas sum to less
/// than the bounds the remainder stays empty at the far end.
fn squarify(areas: &[f64], bounds: Rect) -> Vec<Rect> {
    let mut result = Vec::with_capacity(areas.len());
    let mut free = bounds;

    let mut idx = 0usize;
    let mut row_start = 0usize;
    let mut row_sum = 0.0;
    let mut row_min = f64::INFINITY;
    let mut row_max = 0.0_f64;

    while idx < areas.len() {
        if free.w <= 1e-9 || free.h <= 1e-9 {
            break;
        }

        let area = areas[idx];
        let side = free.w.min(free.h);
        let current = if row_sum > 0.0 {
            worst_aspect_ratio(row_min, row_max, row_sum, side)
        } else {
            f64::INFINITY
        };
        let next_sum = row_sum + area;
        let next_min = row_min.min(area);
        let next_max = row_max.max(area);
        let next = worst_aspect_ratio(next_min, next_max, next_sum, side);

        // Extend the row while the worst aspect ratio does not get worse
        if row_sum <= 0.0 || next <= current {
            row_sum = next_sum;
            row_min = next_min;
            row_max = next_max;
            idx += 1;
            continue;
        }

        layout_row(&areas[row_start..idx], row_sum, &mut free, &mut result);
        row_start = idx;
        row_sum = 0.0;
        row_min = f64::INFINITY;
        row_max = 0.0;
    }

    if row_sum > 0.0 && row_start < idx {
        layout_row(&areas[row_start..idx], row_sum, &mut free, &mut result);
    }

    result
}

/// Lay one row along the shorter side of `free` and shrink `free` past it.
fn layout_row(row: &[f64], row_sum: f64, free: &mut Rect, out: &mut Vec<Rect>) {
    if row.is_empty() || row_sum <= 0.0 || !free.is_visible() {
        return;
    }

    // Width is the shorter side: horizontal strip across the top.
    let horizontal = free.w <= free.h;
    let short = if horizontal { free.w } else { free.h };
    let long = if horizontal { free.h } else { free.w };
    let thickness = (row_sum / short).min(long);
    if !thickness.is_finite() || thickness <= 0.0 {
        return;
    }

    let mut offset = 0.0;
    for &area in row {
        let length = (area / thickness).min((short - offset).max(0.0));
        let cell = if horizontal {
            Rect::new(free.x + offset, free.y, length, thickness)
        } else {
            Rect::new(free.x, free.y + offset, thickness, length)
        };
        out.push(cell);
        offset += length;
    }

    *free = if horizontal {
        Rect::new(free.x, free.y + thickness, free.w, free.h - thickness)
    } else {
        Rect::new(free.x + thickness, free.y, free.w - thickness, free.h)
    };
}

fn worst_aspect_ratio(min_r: f64, max_r: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_r <= 0.0 || max_r <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let a = (side_sq * max_r) / sum_sq;
    let b = sum_sq / (side_sq * min_r);
    a.max(b)
}
