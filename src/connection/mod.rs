//! Gremlin connection module.
//!
//! This module provides the main entry point for running queries.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Connection`] | Request correlation and timeouts over a transport |
//! | [`ConnectionBuilder`] | Fluent configuration builder |
//! | [`ConnectionOptions`] | Connection parameters with defaults |
//!
//! # Example
//!
//! ```no_run
//! use gremlin_client::{Bindings, Connection, Result};
//!
//! # async fn example() -> Result<()> {
//! let mut conn = Connection::builder().host("localhost").connect()?;
//! let names = conn.send_query("g.V().values('name')", &Bindings::default()).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for connection configuration.
pub mod builder;

/// Core connection implementation.
pub mod core;

/// Connection options and defaults.
pub mod options;

/// Per-request tracking state.
mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ConnectionBuilder;
pub use self::core::Connection;
pub use options::ConnectionOptions;
