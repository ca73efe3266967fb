//! Application layer: parsers, renderers and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod bytefmt;
pub mod coverage;
pub mod error;
pub mod error_ext;
pub mod labels;
pub mod render;
pub mod services;
pub mod symtab;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
