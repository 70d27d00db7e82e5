//! Gremlin Client - Gremlin Server queries over WebSocket.
//!
//! This library sends Gremlin scripts to a TinkerPop Gremlin Server and
//! returns the matching result as a single awaited call.
//!
//! # Architecture
//!
//! The client follows a request/response model over one socket:
//!
//! - **Local End (Rust)**: Encodes `eval` requests, correlates responses
//! - **Remote End (Gremlin Server)**: Evaluates scripts, streams results
//!
//! Key design principles:
//!
//! - Each [`Connection`] owns exactly one transport (WebSocket)
//! - At most one request in flight per connection (`&mut self`)
//! - Responses correlated by `requestId` (UUID); stale frames are dropped
//! - Event-driven waiting (no polling for responses)
//! - Distinct error kinds for every failure; no automatic retries
//!
//! # Quick Start
//!
//! ```no_run
//! use gremlin_client::{Bindings, Connection, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut conn = Connection::builder()
//!         .host("localhost")
//!         .port(8182)
//!         .connect()?;
//!
//!     let mut bindings = Bindings::default();
//!     bindings.insert("name".to_string(), json!("marko"));
//!
//!     let friends = conn
//!         .send_query("g.V().has('name', name).out('knows').values('name')", &bindings)
//!         .await?;
//!     println!("Friends: {friends}");
//!
//!     conn.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | [`Connection`], builder and options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Gremlin request/response envelopes |
//! | [`transport`] | Transport contract and WebSocket implementation |

// ============================================================================
// Modules
// ============================================================================

/// Connection, builder and options.
///
/// Use [`Connection::builder()`] or [`Connection::connect`] to open one.
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Gremlin Server message codec.
pub mod protocol;

/// WebSocket transport layer.
///
/// Implement [`Transport`] to run the connection over another socket.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Connection types
pub use connection::{Connection, ConnectionBuilder, ConnectionOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Protocol types
pub use protocol::{Bindings, ResponseCode};

// Transport types
pub use transport::{MessageKind, Transport, WebSocketTransport};
