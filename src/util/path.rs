use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::infrastructure::{InfraError, InfraResult};

/// Expand `~`, `$VAR` and `${VAR}` in a path.
///
/// Unknown variables are left as written.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).into_owned()),
    }
}

/// Expanded path of an input file that must exist.
pub fn resolve_input(path: &Path) -> InfraResult<PathBuf> {
    let expanded = expand_path(path);
    if expanded.is_file() {
        Ok(expanded)
    } else {
        Err(InfraError::NotFound(expanded))
    }
}

/// Display form with `/` separators on every platform.
pub fn normalize_path_separator(s: &str) -> Cow<'_, str> {
    if s.contains('\\') {
        Cow::Owned(s.replace('\\', "/"))
    } else {
        Cow::Borrowed(s)
    }
}
