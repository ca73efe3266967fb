//! SVG treemap output.
//!
//! One `<rect>` per layout box in layout order, so nested boxes are drawn on
//! top of their parents, followed by the label in the box's title band.

use tracing::{debug, instrument};

use crate::application::render::color::{Colorer, Rgba};
use crate::application::render::RenderConfig;
use crate::application::ApplicationResult;
use crate::domain::{LayoutBox, TreeArena};

const STROKE_WIDTH: f64 = 1.0;
/// Horizontal gap between a box border and its label
const LABEL_INSET: f64 = 3.0;
/// Average glyph width as a fraction of the font size (monospace)
const GLYPH_RATIO: f64 = 0.6;
const ELLIPSIS: char = '…';

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Coordinates with at most two decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Shorten `label` to at most `max_chars` characters, marking the cut.
fn truncate(label: &str, max_chars: usize) -> Option<String> {
    if max_chars == 0 {
        return None;
    }
    let count = label.chars().count();
    if count <= max_chars {
        return Some(label.to_string());
    }
    if max_chars < 2 {
        return None;
    }
    let mut cut: String = label.chars().take(max_chars - 1).collect();
    cut.push(ELLIPSIS);
    Some(cut)
}

pub struct SvgRenderer {
    border: Rgba,
    text: Rgba,
    font_size: f64,
    font_family: String,
    colorer: Box<dyn Colorer>,
}

impl SvgRenderer {
    /// Fails with `InvalidColor` when a configured colour does not parse.
    pub fn new(config: &RenderConfig, colorer: Box<dyn Colorer>) -> ApplicationResult<Self> {
        Ok(Self {
            border: config.border_color.parse()?,
            text: config.text_color.parse()?,
            font_size: config.font_size.max(0.0),
            font_family: config.font_family.clone(),
            colorer,
        })
    }

    #[instrument(level = "debug", skip_all, fields(boxes = boxes.len()))]
    pub fn render(&self, tree: &TreeArena, boxes: &[LayoutBox], width: f64, height: f64) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = num(width.max(0.0)),
            h = num(height.max(0.0)),
        ));

        let mut labels = 0;
        for layout_box in boxes {
            let node = match tree.get_node(layout_box.node) {
                Some(node) => node,
                None => continue,
            };
            let fill = self.colorer.fill(&node.data);
            out.push_str(&format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"{} stroke=\"{}\"{} stroke-width=\"{}\"/>\n",
                num(layout_box.x),
                num(layout_box.y),
                num(layout_box.width),
                num(layout_box.height),
                fill.hex(),
                opacity_attr("fill-opacity", fill),
                self.border.hex(),
                opacity_attr("stroke-opacity", self.border),
                num(STROKE_WIDTH),
            ));
            if let Some(label) = self.fit_label(&node.data.name, layout_box) {
                labels += 1;
                out.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{}>{}</text>\n",
                    num(layout_box.x + LABEL_INSET),
                    num(layout_box.y + self.font_size),
                    escape(&self.font_family),
                    num(self.font_size),
                    self.text.hex(),
                    opacity_attr("fill-opacity", self.text),
                    escape(&label),
                ));
            }
        }

        out.push_str("</svg>\n");
        debug!("render: {} boxes, {} labels", boxes.len(), labels);
        out
    }

    fn fit_label(&self, label: &str, layout_box: &LayoutBox) -> Option<String> {
        if label.is_empty() || self.font_size <= 0.0 || layout_box.height < self.font_size + 2.0 {
            return None;
        }
        let available = layout_box.width - 2.0 * LABEL_INSET;
        if available <= 0.0 {
            return None;
        }
        let max_chars = (available / (self.font_size * GLYPH_RATIO)).floor() as usize;
        truncate(label, max_chars)
    }
}

fn opacity_attr(name: &str, color: Rgba) -> String {
    if color.is_opaque() {
        String::new()
    } else {
        format!(r#" {}="{}""#, name, num(color.opacity()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::color::{HeatColorer, NoneColorer};
    use crate::domain::{compute_layout, LayoutConfig, NodeData, NodeKind};

    fn tree_with_child(name: &str) -> TreeArena {
        let mut tree = TreeArena::with_root();
        let root = tree.root().unwrap();
        tree.get_node_mut(root).unwrap().data.size = 10.0;
        let mut data = NodeData::new(vec!["pkg".into()], NodeKind::Package);
        data.size = 10.0;
        data.name = name.to_string();
        data.heat = Some(1.0);
        tree.insert_node(data, Some(root));
        tree
    }

    #[test]
    fn given_number_when_formatting_then_trims_zeros() {
        assert_eq!(num(16.0), "16");
        assert_eq!(num(16.5), "16.5");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn given_long_label_when_truncating_then_ends_with_ellipsis() {
        assert_eq!(truncate("abcdef", 10).as_deref(), Some("abcdef"));
        assert_eq!(truncate("abcdef", 4).as_deref(), Some("abc…"));
        assert_eq!(truncate("abcdef", 1), None);
        assert_eq!(truncate("abcdef", 0), None);
    }

    #[test]
    fn given_tree_when_rendering_then_emits_rect_and_escaped_label_per_box() {
        let tree = tree_with_child("a<b>&c 10.00B");
        let config = LayoutConfig::default();
        let boxes = compute_layout(&tree, &config);
        let renderer = SvgRenderer::new(&RenderConfig::default(), Box::new(NoneColorer)).unwrap();

        let svg = renderer.render(&tree, &boxes, config.width, config.height);

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1028" height="640""#));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect ").count(), boxes.len());
        assert!(svg.contains(r##"stroke="#808080""##));
        assert!(svg.contains(r##"fill="#ffffff""##));
        assert!(svg.contains("a&lt;b&gt;&amp;c 10.00B"));
    }

    #[test]
    fn given_tree_when_rendering_then_one_element_per_line() {
        let tree = tree_with_child("pkg 10.00B");
        let config = LayoutConfig::default();
        let boxes = compute_layout(&tree, &config);
        let renderer = SvgRenderer::new(&RenderConfig::default(), Box::new(NoneColorer)).unwrap();

        let svg = renderer.render(&tree, &boxes, config.width, config.height);

        let lines: Vec<&str> = svg.lines().collect();
        let texts = svg.matches("<text ").count();
        assert_eq!(lines.len(), 2 + boxes.len() + texts);
        assert!(lines[0].starts_with("<svg ") && lines[0].ends_with('>'));
        assert!(lines[1..lines.len() - 1]
            .iter()
            .all(|line| line.starts_with("<rect ") || line.starts_with("<text ")));
        assert_eq!(lines[lines.len() - 1], "</svg>");
        assert!(svg.ends_with('\n'));
    }

    #[test]
    fn given_heat_colorer_when_rendering_then_fills_by_heat() {
        let tree = tree_with_child("pkg");
        let config = LayoutConfig::default();
        let boxes = compute_layout(&tree, &config);
        let renderer = SvgRenderer::new(&RenderConfig::default(), Box::new(HeatColorer::default())).unwrap();

        let svg = renderer.render(&tree, &boxes, config.width, config.height);

        let hot = HeatColorer::default().color(1.0).hex();
        assert!(svg.contains(&format!(r#"fill="{}""#, hot)));
    }

    #[test]
    fn given_invalid_border_color_when_creating_then_fails() {
        let config = RenderConfig {
            border_color: "grey".to_string(),
            ..RenderConfig::default()
        };
        assert!(SvgRenderer::new(&config, Box::new(NoneColorer)).is_err());
    }

    #[test]
    fn given_tiny_box_when_fitting_label_then_omits_it() {
        let tree = tree_with_child("pkg");
        let renderer = SvgRenderer::new(&RenderConfig::default(), Box::new(NoneColorer)).unwrap();
        let tiny = LayoutBox {
            node: tree.root().unwrap(),
            x: 0.0,
            y: 0.0,
            width: 5.0,
            height: 5.0,
            depth: 0,
        };
        assert!(renderer.fit_label("pkg", &tiny).is_none());
    }
}
