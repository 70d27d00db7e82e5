//! Connection options and defaults.
//!
//! Provides a value object holding every connection parameter, with the
//! defaults applied at construction time.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use gremlin_client::ConnectionOptions;
//!
//! let options = ConnectionOptions::new()
//!     .with_host("graph.internal")
//!     .with_port(8182)
//!     .with_response_timeout(Duration::from_secs(30));
//!
//! assert_eq!(options.url()?.as_str(), "ws://graph.internal:8182/");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default Gremlin Server port.
pub const DEFAULT_PORT: u16 = 8182;

/// Default time to wait for the socket to open.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(1);

/// Default time to wait for a matching response.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// ConnectionOptions
// ============================================================================

/// Connection parameters.
///
/// Every field is optional when deserialized; missing ones take their
/// default. Timeouts are (de)serialized as seconds, fractions allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionOptions {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Base directory for relative script paths.
    pub groovy_script_path: PathBuf,

    /// Time to wait for the socket to open.
    #[serde(with = "seconds")]
    pub connection_timeout: Duration,

    /// Time to wait for a matching response.
    #[serde(with = "seconds")]
    pub response_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionOptions {
    /// Creates options with every default applied.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            groovy_script_path: PathBuf::from("."),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionOptions {
    /// Sets the server host.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the base directory for relative script paths.
    #[inline]
    #[must_use]
    pub fn with_groovy_script_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.groovy_script_path = path.into();
        self
    }

    /// Sets the connection-open timeout.
    #[inline]
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the response timeout.
    #[inline]
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

// ============================================================================
// Resolution
// ============================================================================

impl ConnectionOptions {
    /// Returns the transport URL, `ws://{host}:{port}/`.
    ///
    /// IPv6 literals are bracketed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the host does not form a valid URL.
    pub fn url(&self) -> Result<Url> {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        Url::parse(&format!("ws://{host}:{}/", self.port))
            .map_err(|e| Error::config(format!("invalid host {:?}: {e}", self.host)))
    }

    /// Resolves a script path against `groovy_script_path`.
    ///
    /// Absolute paths are returned unchanged.
    #[must_use]
    pub fn resolve_script(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.groovy_script_path.join(path)
        }
    }

    /// Checks the options for values no connection can work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an empty host, a zero timeout or a
    /// host that does not form a valid URL.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }

        if self.connection_timeout.is_zero() {
            return Err(Error::config("connection timeout must be positive"));
        }

        if self.response_timeout.is_zero() {
            return Err(Error::config("response timeout must be positive"));
        }

        self.url().map(|_| ())
    }
}

// ============================================================================
// Serde Helpers
// ============================================================================

/// (De)serializes a [`Duration`] as floating-point seconds.
mod seconds {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================
