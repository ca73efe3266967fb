//! Domain layer: entities and tree/layout logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod segment;

pub use arena::{NodeData, NodePath, TreeArena, TreeNode};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use layout::{compute_layout, LayoutConfig};
pub use normalize::{
    collapse_root, filter_symbols, impute_sizes, limit_depth, NormalizeOptions, NormalizeReport,
    Normalizer,
};
pub use segment::{DelimitedSegmenter, GoSymbolSegmenter, PathSegmenter, SymbolNaming};
