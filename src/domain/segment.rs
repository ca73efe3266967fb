//! Path segmentation strategies
//!
//! Turn a fully-qualified symbol name into package and symbol segments.
//! The tree builder only sees the [`PathSegmenter`] trait, so naming
//! conventions stay out of the tree, normalizer and layout code.

use serde::{Deserialize, Serialize};

use crate::domain::entities::SymbolSegments;

/// Splits a qualified symbol name into path segments.
pub trait PathSegmenter: Send + Sync {
    /// Segment `name`, or `None` when it cannot be interpreted at all.
    fn segment(&self, name: &str) -> Option<SymbolSegments>;
}

/// Symbol naming convention selecting the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolNaming {
    /// Go symbols: `import/path.Type.Method`
    #[default]
    Go,
    /// Demangled C++ (or Rust) symbols: `ns::Type::method`
    Cpp,
}

impl SymbolNaming {
    pub fn segmenter(self) -> Box<dyn PathSegmenter> {
        match self {
            SymbolNaming::Go => Box::new(GoSymbolSegmenter),
            SymbolNaming::Cpp => Box::new(DelimitedSegmenter::default()),
        }
    }
}

/// Go linker symbol names.
///
/// The package path ends at the first `.` after the last `/`, both looked up
/// before any bracket so that generic instantiations and receivers such as
/// `[go.shape.*uint8]` or `(*T)` do not confuse the split.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoSymbolSegmenter;

impl PathSegmenter for GoSymbolSegmenter {
    fn segment(&self, name: &str) -> Option<SymbolSegments> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let head_end = name.find(['[', '(']).unwrap_or(name.len());
        let head = &name[..head_end];
        let pkg_start = head.rfind('/').map(|i| i + 1).unwrap_or(0);
        let dot = match head[pkg_start..].find('.') {
            Some(offset) => pkg_start + offset,
            None => return Some(SymbolSegments::pure(name)),
        };

        let package = &name[..dot];
        if package.is_empty() || !is_go_package(package) {
            return Some(SymbolSegments::pure(name));
        }

        let package: Vec<String> = package
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if package.is_empty() {
            return Some(SymbolSegments::pure(name));
        }
        let symbol = split_at_depth_zero(&name[dot + 1..], ".");
        Some(SymbolSegments::new(package, symbol))
    }
}

fn is_go_package(package: &str) -> bool {
    package
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-' | '/'))
}

/// Names separated by a fixed delimiter, e.g. demangled C++ `a::b::c`.
///
/// All segments but the last form the package (namespace) path.
#[derive(Debug, Clone)]
pub struct DelimitedSegmenter {
    delimiter: String,
}

impl Default for DelimitedSegmenter {
    fn default() -> Self {
        Self::new("::")
    }
}

impl DelimitedSegmenter {
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl PathSegmenter for DelimitedSegmenter {
    fn segment(&self, name: &str) -> Option<SymbolSegments> {
        let name = name.trim();
        if name.is_empty() || self.delimiter.is_empty() {
            return None;
        }
        let mut parts = split_at_depth_zero(name, &self.delimiter);
        match parts.len() {
            0 => None,
            1 => Some(SymbolSegments::pure(name)),
            _ => {
                let symbol = parts.split_off(parts.len() - 1);
                Some(SymbolSegments::new(parts, symbol))
            }
        }
    }
}

/// Split on `delimiter` outside of `()`, `[]`, `{}` and `<>`, dropping empty parts.
fn split_at_depth_zero(s: &str, delimiter: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    let mut i = 0;

    while i < s.len() {
        let rest = &s[i..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && rest.starts_with(delimiter) {
            parts.push(&s[start..i]);
            i += delimiter.len();
            start = i;
            continue;
        }
        i += c.len_utf8();
    }
    parts.push(&s[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case("pkg/sub.Type.Method", &["pkg", "sub"], &["Type", "Method"])]
    #[case("runtime.main", &["runtime"], &["main"])]
    #[case("net/http.(*Client).Do", &["net", "http"], &["(*Client)", "Do"])]
    #[case(
        "github.com/a/b.Map[go.shape.string,go.shape.int].Get",
        &["github.com", "a", "b"],
        &["Map[go.shape.string,go.shape.int]", "Get"]
    )]
    #[case("main.main.func1.1", &["main"], &["main", "func1", "1"])]
    #[case("gopkg.in/yaml.v3.(*parser).parse", &["gopkg.in", "yaml"], &["v3", "(*parser)", "parse"])]
    fn given_go_symbol_when_segmenting_then_splits_package_and_symbol(
        #[case] name: &str,
        #[case] package: &[&str],
        #[case] symbol: &[&str],
    ) {
        let segments = GoSymbolSegmenter.segment(name).unwrap();
        assert_eq!(segments.package, strings(package));
        assert_eq!(segments.symbol, strings(symbol));
    }

    #[rstest]
    #[case("_rt0_amd64_linux")]
    #[case("go:buildid")]
    #[case("type:.eq.[2]interface {}")]
    #[case("go:itab.*os.File,io.Reader")]
    fn given_symbol_without_package_when_segmenting_then_is_pure(#[case] name: &str) {
        let segments = GoSymbolSegmenter.segment(name).unwrap();
        assert!(segments.is_pure(), "{name} should be pure: {segments:?}");
        assert_eq!(segments.symbol, vec![name.to_string()]);
    }

    #[test]
    fn given_empty_name_when_segmenting_then_returns_none() {
        assert!(GoSymbolSegmenter.segment("   ").is_none());
        assert!(DelimitedSegmenter::default().segment("").is_none());
    }

    #[test]
    fn given_cpp_symbol_when_segmenting_then_namespaces_form_package() {
        let segments = DelimitedSegmenter::default()
            .segment("std::vector<std::pair<int, int>>::push_back(int const&)")
            .unwrap();
        assert_eq!(
            segments.package,
            strings(&["std", "vector<std::pair<int, int>>"])
        );
        assert_eq!(segments.symbol, strings(&["push_back(int const&)"]));
    }

    #[test]
    fn given_plain_c_symbol_when_segmenting_with_delimiter_then_is_pure() {
        let segments = DelimitedSegmenter::default().segment("memcpy").unwrap();
        assert!(segments.is_pure());
    }
}
