//! binsize-treemap: nested box diagrams of binary symbol sizes
//!
//! Layers:
//! - `domain`: symbol tree, normalization and squarified layout (no I/O)
//! - `application`: input parsers, labels, renderers and the treemap service
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
