//! Request path admission checks, run before a path is ever joined to the root.

/// Returns `true` when `path` is safe to resolve under the server root.
///
/// A path passes only if it starts with `/`, never contains `..`, and every
/// byte is an ASCII letter, digit, `/`, `_`, `.` or `-`. The `..` test is a
/// plain substring check; no normalization or percent-decoding happens, and
/// `%` itself is rejected.
///
/// # Example
///
/// ```
/// # use static_serve::static_files::validate_path;
/// assert!(validate_path("/ok_file-1.2.html"));
/// assert!(!validate_path("/../etc/passwd"));
/// assert!(!validate_path("index.html"));
/// ```
pub fn validate_path(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }

    if path.contains("..") {
        return false;
    }

    path.bytes().all(is_allowed)
}

fn is_allowed(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'.' | b'-')
}
