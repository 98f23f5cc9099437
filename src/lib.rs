//! static_serve - minimal static-file HTTP/1.1 server
//!
//! Core library: request parsing, response serialization, the static GET
//! handler and the accept loop.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;

pub use config::{ConnectionMode, ServerConfig};
pub use server::Server;
