//! Path and resource-URI helpers.
//!
//! Model resources are addressed by URI on the wire (hosts speak
//! `file://...`), while filesystem watchers report plain paths. These helpers
//! translate between the two and compare resource identities the way the
//! editor does: by resolved path, not by string equality.

use std::path::{Path, PathBuf};
use url::Url;

/// Get the reviz configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/reviz` if set
/// - `~/.config/reviz` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("reviz"))
}

/// Get the reviz data directory.
///
/// This follows XDG conventions:
/// - `$XDG_DATA_HOME/reviz` if set
/// - `~/.local/share/reviz` otherwise
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("reviz"))
}

/// Build a `file://` URI for a filesystem path.
pub fn resource_uri(path: &Path) -> String {
    match Url::from_file_path(path) {
        Ok(url) => url.to_string(),
        // Relative paths cannot be expressed as file URLs; fall back to a
        // plain rendering so the value is still comparable.
        Err(()) => format!("file://{}", path.display()),
    }
}

/// Resolve a resource URI back to a filesystem path.
///
/// Accepts `file://` URIs as well as plain paths (hosts are not consistent
/// about which form they deliver).
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    if let Ok(url) = Url::parse(uri) {
        if url.scheme() == "file" {
            return url.to_file_path().ok();
        }
        return None;
    }
    Some(PathBuf::from(uri))
}

/// Check whether two resource URIs address the same resource.
///
/// Comparison is by resolved path so `file:///a/b.uml` matches `/a/b.uml`.
pub fn same_resource(a: &str, b: &str) -> bool {
    match (uri_to_path(a), uri_to_path(b)) {
        (Some(pa), Some(pb)) => pa == pb,
        _ => a == b,
    }
}

/// Check whether a path carries the given file extension.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}
