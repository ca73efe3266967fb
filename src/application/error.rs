//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add input/rendering context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no symbols found in input ({skipped} lines skipped)")]
    EmptySymbolTable { skipped: usize },

    #[error("no coverage blocks found in profile ({skipped} lines skipped)")]
    EmptyCoverageProfile { skipped: usize },

    #[error("invalid color '{value}': expected #rrggbb or #rrggbbaa")]
    InvalidColor { value: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
