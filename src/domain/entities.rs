//! Domain entities: core data structures

use std::fmt;

use generational_arena::Index;

/// Path segment used for the bucket collecting empty or unparseable symbol names.
pub const UNKNOWN_SEGMENT: &str = "<unknown>";

/// Key printed for the synthetic root, which has an empty path.
pub const ROOT_KEY: &str = "<root>";

/// One accepted line of a symbol table dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Fully-qualified symbol name, e.g. `net/http.(*Client).Do`
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Symbol type character as printed by nm (`T`, `D`, `R`, ...)
    pub kind: Option<char>,
    /// Symbol address, when the dump carries one
    pub address: Option<u64>,
}

impl SymbolRecord {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            kind: None,
            address: None,
        }
    }
}

/// A symbol name split into its package path and its symbol path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSegments {
    /// Package (import path or namespace) segments
    pub package: Vec<String>,
    /// Symbol segments below the package
    pub symbol: Vec<String>,
}

impl SymbolSegments {
    pub fn new(package: Vec<String>, symbol: Vec<String>) -> Self {
        Self { package, symbol }
    }

    /// A symbol without any resolvable package prefix.
    pub fn pure(name: impl Into<String>) -> Self {
        Self {
            package: Vec::new(),
            symbol: vec![name.into()],
        }
    }

    pub fn is_pure(&self) -> bool {
        self.package.is_empty()
    }

    pub fn len(&self) -> usize {
        self.package.len() + self.symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full path: package segments followed by symbol segments.
    pub fn path(&self) -> Vec<String> {
        self.package
            .iter()
            .chain(self.symbol.iter())
            .cloned()
            .collect()
    }
}

/// What a tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The synthetic common ancestor (empty path)
    Root,
    /// A package path segment
    Package,
    /// A symbol segment below a package
    Symbol,
    /// A symbol with no package prefix (likely not Go)
    PureSymbol,
    /// Bucket for empty or unparseable names
    Unknown,
}

/// Namespace a node's path is unique in.
///
/// Pure symbols and the unknown bucket hang directly off the root next to
/// top-level packages, so `main` the C symbol and `main` the Go package are
/// distinct nodes with the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Tree,
    Pure,
    Unknown,
}

impl NodeKind {
    pub fn scope(self) -> Scope {
        match self {
            NodeKind::Root | NodeKind::Package | NodeKind::Symbol => Scope::Tree,
            NodeKind::PureSymbol => Scope::Pure,
            NodeKind::Unknown => Scope::Unknown,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Root => "root",
            NodeKind::Package => "package",
            NodeKind::Symbol => "symbol",
            NodeKind::PureSymbol => "pure-symbol",
            NodeKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Positioned rectangle for one node of the treemap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBox {
    /// Arena index of the node this box belongs to
    pub node: Index,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Nesting depth, 0 for the outermost box
    pub depth: usize,
}

impl LayoutBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the two boxes share interior area (touching edges do not count).
    pub fn overlaps(&self, other: &LayoutBox) -> bool {
        const EPS: f64 = 1e-6;
        self.x + EPS < other.right()
            && other.x + EPS < self.right()
            && self.y + EPS < other.bottom()
            && other.y + EPS < self.bottom()
    }

    /// True when `other` lies within this box.
    pub fn contains(&self, other: &LayoutBox) -> bool {
        const EPS: f64 = 1e-6;
        other.x + EPS >= self.x
            && other.y + EPS >= self.y
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}
