//! Static file serving
//!
//! Maps a validated GET request onto a file under the configured root
//! directory and turns the file into a response.

pub mod handler;
pub mod path;

pub use handler::serve_get;
pub use path::validate_path;
