//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the server speaks: one request
//! per connection, no request bodies, `Connection: close` on every response.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection state machine and method dispatch
//! - **`parser`**: Parses the request head from a byte buffer
//! - **`request`**: HTTP request representation and the method enumeration
//! - **`response`**: Status code registry and response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read the request head
//!        └──────┬──────┘
//!               │ Bytes received
//!               ▼
//!        ┌─────────────┐
//!        │   Parsing   │ ← Build a Request
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← GET → static files, anything else → 405
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │   Responding     │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! A read error, parse failure or serialization failure jumps straight to
//! `Closed` without a response.
//!
//! # Example
//!
//! ```ignore
//! use static_serve::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cfg = ServerConfig::new(8080, "/srv/www")?;
//!     Server::bind(cfg).await?.run().await
//! }
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
