//! Error conversion helpers
//!
//! Attach context to foreign errors while lifting them into `ApplicationError`.

use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait adding context to any fallible result.
pub trait IoResultExt<T> {
    /// Wrap the error as `OperationFailed` with `<action>: <path>` context.
    ///
    /// ```ignore
    /// fs.read_to_string(&path).with_path_context("read input", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Wrap the error as `OperationFailed` with a free-form context.
    fn with_context(self, context: impl Into<String>) -> ApplicationResult<T>;
}

impl<T, E> IoResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.with_context(format!("{}: {}", action, path.display()))
    }

    fn with_context(self, context: impl Into<String>) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: context.into(),
            source: Box::new(e),
        })
    }
}
