//! Small helpers shared across the CLI layer.

/// Normalizes a path for display output.
///
/// Converts backslashes to forward slashes (for Windows paths) and strips a
/// leading `./` so status lines stay stable across platforms and invocation
/// styles.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use driftfix::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\email\\mbox.rs")), "email/mbox.rs");
/// assert_eq!(normalize_display_path(Path::new("./src/msg.rs")), "src/msg.rs");
/// ```
#[must_use]
pub fn normalize_display_path(path: &std::path::Path) -> String {
    let s = path.to_string_lossy();
    let normalized = s.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}
