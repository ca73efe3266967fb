//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated tree invariants.
/// Normal building, normalization and layout never produce them.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("node not found in tree: {0}")]
    NodeNotFound(String),

    #[error("cannot promote {0} to root: node is not a child of the current root")]
    NotRootChild(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
