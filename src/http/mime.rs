//! MIME type detection module
//!
//! Returns the Content-Type for a request path based on its file extension.

/// Content type used when no extension matches.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const TABLE: [(&str, &str); 7] = [
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".ico", "image/x-icon"),
];

/// Get MIME Content-Type for a path.
///
/// Only a true suffix counts, so `/foo.html.bak` is `text/plain`.
///
/// # Examples
/// ```
/// use static_serve::http::mime::content_type_for;
/// assert_eq!(content_type_for("/index.html"), "text/html");
/// assert_eq!(content_type_for("/img/logo.jpeg"), "image/jpeg");
/// assert_eq!(content_type_for("/notes"), "text/plain");
/// ```
pub fn content_type_for(path: &str) -> &'static str {
    TABLE
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map_or(DEFAULT_CONTENT_TYPE, |(_, mime)| *mime)
}
