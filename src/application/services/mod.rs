//! Application services
//!
//! Concrete services orchestrating the domain pipeline. They depend on I/O
//! boundary traits (FileSystem) but are themselves concrete structs.

mod treemap;

pub use treemap::{InputKind, OutputFormat, Treemap, TreemapService};
