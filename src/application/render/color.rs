//! Colours and fill strategies.

use std::fmt;
use std::str::FromStr;

use crate::application::ApplicationError;
use crate::domain::NodeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const GREY: Rgba = Rgba::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#rrggbb`, alpha is rendered separately as an opacity.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Linear interpolation towards `other`, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "{}", self.hex())
        } else {
            write!(f, "{}{:02x}", self.hex(), self.a)
        }
    }
}

impl FromStr for Rgba {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ApplicationError::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgba {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }
}

/// Chooses the fill colour of a node's box.
pub trait Colorer: Send + Sync {
    fn fill(&self, node: &NodeData) -> Rgba;
}

/// Plain white boxes; symbol tables carry no heat.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneColorer;

impl Colorer for NoneColorer {
    fn fill(&self, _node: &NodeData) -> Rgba {
        Rgba::WHITE
    }
}

/// Red for heat 0, yellow for 0.5, green for 1; nodes without heat use `neutral`.
#[derive(Debug, Clone, Copy)]
pub struct HeatColorer {
    pub neutral: Rgba,
}

impl Default for HeatColorer {
    fn default() -> Self {
        Self {
            neutral: Rgba::WHITE,
        }
    }
}

impl HeatColorer {
    const COLD: Rgba = Rgba::rgb(230, 80, 70);
    const WARM: Rgba = Rgba::rgb(240, 220, 90);
    const HOT: Rgba = Rgba::rgb(90, 190, 100);

    pub fn color(&self, heat: f64) -> Rgba {
        if heat < 0.5 {
            Self::COLD.lerp(Self::WARM, heat * 2.0)
        } else {
            Self::WARM.lerp(Self::HOT, (heat - 0.5) * 2.0)
        }
    }
}

impl Colorer for HeatColorer {
    fn fill(&self, node: &NodeData) -> Rgba {
        match node.heat {
            Some(heat) => self.color(heat),
            None => self.neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeKind;

    #[test]
    fn given_hex_strings_when_parsing_then_reads_channels() {
        let grey: Rgba = "#808080".parse().unwrap();
        assert_eq!(grey, Rgba::GREY);
        let translucent: Rgba = "#ff000080".parse().unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_string(), "#ff000080");
        assert_eq!(grey.to_string(), "#808080");
    }

    #[test]
    fn given_invalid_strings_when_parsing_then_fails() {
        for value in ["808080", "#80808", "#zzzzzz", ""] {
            assert!(
                matches!(value.parse::<Rgba>(), Err(ApplicationError::InvalidColor { .. })),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn given_heat_extremes_when_coloring_then_uses_gradient_ends() {
        let colorer = HeatColorer::default();
        assert_eq!(colorer.color(0.0), HeatColorer::COLD);
        assert_eq!(colorer.color(0.5), HeatColorer::WARM);
        assert_eq!(colorer.color(1.0), HeatColorer::HOT);
    }

    #[test]
    fn given_node_without_heat_when_coloring_then_uses_neutral() {
        let node = NodeData::new(vec!["a".into()], NodeKind::Package);
        assert_eq!(HeatColorer::default().fill(&node), Rgba::WHITE);
        assert_eq!(NoneColorer.fill(&node), Rgba::WHITE);
    }
}
