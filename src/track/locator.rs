use std::path::{Path, PathBuf};

/// Turn a locator into a local path. `file://` URLs lose their scheme,
/// everything else is taken as a path.
pub fn locator_to_path(locator: &str) -> PathBuf {
    let trimmed = locator.trim();
    match trimmed.strip_prefix("file://") {
        Some(rest) => PathBuf::from(rest),
        None => PathBuf::from(trimmed),
    }
}

/// Resolve a relative locator against `base`. Absolute paths and `file://`
/// URLs pass through unchanged.
pub fn resolve_locator(base: Option<&Path>, locator: &str) -> String {
    let trimmed = locator.trim();
    if trimmed.is_empty() || trimmed.starts_with("file://") {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    match base {
        Some(base) if path.is_relative() && !base.as_os_str().is_empty() => {
            base.join(path).display().to_string()
        }
        _ => trimmed.to_string(),
    }
}
