//! Error types for the Gremlin client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use gremlin_client::{Bindings, Connection, Result};
//!
//! async fn example(conn: &mut Connection) -> Result<()> {
//!     let count = conn.send_query("g.V().count()", &Bindings::default()).await?;
//!     println!("{count}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Execution | [`Error::ExecutionTimeout`], [`Error::Server`] |
//! | Protocol | [`Error::Protocol`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Every failure is surfaced to the immediate caller; nothing in this crate
/// retries on its own.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when connection options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to a query operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport failed to accept an outgoing frame.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// The socket did not report itself open in time.
    ///
    /// Returned before any request state is touched.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// Transport closed before the in-flight request was resolved.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// No matching response or error arrived in time.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    ExecutionTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The server reported an error for the in-flight request.
    ///
    /// `code` is the Gremlin status code when the error came from a response
    /// envelope, `None` when it came from the transport error channel.
    #[error("Server error{}: {message}", .code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Server {
        /// Gremlin status code, if any.
        code: Option<u16>,
        /// Human readable message.
        message: String,
        /// The raw error payload.
        payload: Value,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Response envelope could not be interpreted.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates an execution timeout error.
    #[inline]
    pub fn execution_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::ExecutionTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a server error from a Gremlin status.
    #[inline]
    pub fn server(code: u16, message: impl Into<String>, payload: Value) -> Self {
        Self::Server {
            code: Some(code),
            message: message.into(),
            payload,
        }
    }

    /// Creates a server error from a transport error payload.
    ///
    /// The message is the payload itself when it is a string, its `message`
    /// field when it has one, and its JSON text otherwise.
    pub fn server_payload(payload: Value) -> Self {
        let message = match &payload {
            Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        };

        Self::Server {
            code: None,
            message,
            payload,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::ExecutionTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::ConnectionTimeout { .. } | Self::ConnectionClosed
        )
    }

    /// Returns `true` if the server reported this error.
    #[inline]
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry. Gremlin's 598 (server-side
    /// evaluation timeout) counts as recoverable.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. }
                | Self::ExecutionTimeout { .. }
                | Self::Server {
                    code: Some(598),
                    ..
                }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = Error::connection("socket gone");
        assert_eq!(err.to_string(), "Connection failed: socket gone");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("host must not be empty");
        assert_eq!(err.to_string(), "Configuration error: host must not be empty");
    }

    #[test]
    fn test_server_error_display_with_code() {
        let err = Error::server(597, "No such property: x", json!({}));
        assert_eq!(err.to_string(), "Server error (597): No such property: x");
    }

    #[test]
    fn test_server_payload_string() {
        let err = Error::server_payload(json!("broken pipe"));
        assert_eq!(err.to_string(), "Server error: broken pipe");
        assert!(matches!(err, Error::Server { code: None, .. }));
    }

    #[test]
    fn test_server_payload_object_message() {
        let err = Error::server_payload(json!({"message": "bad", "other": 1}));
        if let Error::Server { message, payload, .. } = err {
            assert_eq!(message, "bad");
            assert_eq!(payload["other"], 1);
        } else {
            panic!("Expected Server error");
        }
    }

    #[test]
    fn test_server_payload_object_without_message() {
        let err = Error::server_payload(json!({"example": "data 2"}));
        assert_eq!(err.to_string(), r#"Server error: {"example":"data 2"}"#);
    }

    #[test]
    fn test_is_timeout() {
        let conn_timeout = Error::connection_timeout(1000);
        let exec_timeout = Error::execution_timeout(RequestId::generate(), 10_000);
        let other_err = Error::connection("test");

        assert!(conn_timeout.is_timeout());
        assert!(exec_timeout.is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::connection("test").is_connection_error());
        assert!(Error::connection_timeout(1000).is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::connection_timeout(1000).is_recoverable());
        assert!(Error::server(598, "timeout", Value::Null).is_recoverable());
        assert!(!Error::server(597, "script", Value::Null).is_recoverable());
        assert!(!Error::config("test").is_recoverable());
    }

    #[test]
    fn test_is_server_error() {
        assert!(Error::server_payload(Value::Null).is_server_error());
        assert!(!Error::ConnectionClosed.is_server_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
