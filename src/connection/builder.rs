//! Builder pattern for connection configuration.
//!
//! Provides a fluent API for configuring and creating [`Connection`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use gremlin_client::Connection;
//!
//! # async fn example() -> gremlin_client::Result<()> {
//! let conn = Connection::builder()
//!     .host("graph.internal")
//!     .port(8182)
//!     .response_timeout(Duration::from_secs(30))
//!     .connect()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::transport::Transport;

use super::core::Connection;
use super::options::ConnectionOptions;

// ============================================================================
// ConnectionBuilder
// ============================================================================

/// Builder for configuring a [`Connection`].
///
/// Use [`Connection::builder()`] to create a new builder. Unset options keep
/// their defaults.
#[derive(Debug, Default, Clone)]
pub struct ConnectionBuilder {
    options: ConnectionOptions,
}

// ============================================================================
// ConnectionBuilder Implementation
// ============================================================================

impl ConnectionBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing options.
    #[inline]
    #[must_use]
    pub fn from_options(options: ConnectionOptions) -> Self {
        Self { options }
    }

    /// Sets the server host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.options.host = host.into();
        self
    }

    /// Sets the server port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.options.port = port;
        self
    }

    /// Sets the base directory for relative script paths.
    #[inline]
    #[must_use]
    pub fn groovy_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.groovy_script_path = path.into();
        self
    }

    /// Sets how long to wait for the socket to open.
    #[inline]
    #[must_use]
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.options.connection_timeout = timeout;
        self
    }

    /// Sets how long to wait for a matching response.
    #[inline]
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.options.response_timeout = timeout;
        self
    }

    /// Returns the options built so far.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Validates the options and connects over WebSocket.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the options are invalid.
    pub fn connect(self) -> Result<Connection> {
        Connection::connect(self.options)
    }

    /// Validates the options and wraps an existing transport.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the options are invalid.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<Connection<T>> {
        Connection::with_transport(self.options, transport)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;
    use crate::transport::mock::MockTransport;

    #[test]
    fn test_new_uses_defaults() {
        let builder = ConnectionBuilder::new();
        assert_eq!(builder.options(), &ConnectionOptions::default());
    }

    #[test]
    fn test_setters() {
        let builder = ConnectionBuilder::new()
            .host("db")
            .port(9000)
            .groovy_script_path("/srv/scripts")
            .connection_timeout(Duration::from_secs(11))
            .response_timeout(Duration::from_secs(1));

        let options = builder.options();
        assert_eq!(options.host, "db");
        assert_eq!(options.port, 9000);
        assert_eq!(options.groovy_script_path, PathBuf::from("/srv/scripts"));
        assert_eq!(options.connection_timeout, Duration::from_secs(11));
        assert_eq!(options.response_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_from_options() {
        let options = ConnectionOptions::new().with_port(1234);
        let builder = ConnectionBuilder::from_options(options.clone());
        assert_eq!(builder.options(), &options);
    }

    #[test]
    fn test_build_with_transport() {
        let conn = ConnectionBuilder::new()
            .host("db")
            .build_with(MockTransport::open())
            .unwrap();
        assert_eq!(conn.url().as_str(), "ws://db:8182/");
    }

    #[test]
    fn test_build_fails_with_empty_host() {
        let result = ConnectionBuilder::new()
            .host("")
            .build_with(MockTransport::open());
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_connect_fails_with_zero_timeout() {
        let result = ConnectionBuilder::new()
            .connection_timeout(Duration::ZERO)
            .connect();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("connection timeout"));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ConnectionBuilder::new().host("db");
        let cloned = builder.clone();
        assert_eq!(builder.options(), cloned.options());
    }
}
