//! Gremlin connection and request correlation.
//!
//! The [`Connection`] turns the transport's asynchronous event stream into
//! one awaited call per query.
//!
//! # Request Flow
//!
//! ```text
//! send_query
//!   ├─ wait_connection_open   (poll is_open, bounded by connection_timeout)
//!   ├─ reset_request          (fresh requestId, clear latched state)
//!   ├─ Request::encode
//!   ├─ Transport::send        (text frame)
//!   ├─ wait_response          (notified by intake, bounded by response_timeout)
//!   └─ treat_response
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gremlin_client::{Bindings, Connection, ConnectionOptions};
//!
//! # async fn example() -> gremlin_client::Result<()> {
//! let mut conn = Connection::connect(ConnectionOptions::new())?;
//! let data = conn.send_query("g.V().count()", &Bindings::default()).await?;
//! println!("{data}");
//! conn.close();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{Bindings, Request, treat_response};
use crate::transport::{MessageKind, Transport, WebSocketTransport};

use super::builder::ConnectionBuilder;
use super::options::ConnectionOptions;
use super::state::{Resolution, Shared};

// ============================================================================
// Constants
// ============================================================================

/// Interval between `is_open` checks while waiting for the socket.
const OPEN_POLL_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Connection
// ============================================================================

/// A Gremlin Server connection.
///
/// Owns its transport exclusively. Requests are strictly sequential:
/// [`send_query`](Self::send_query) and [`send_file`](Self::send_file) take
/// `&mut self`, so a second request cannot start while one is in flight.
pub struct Connection<T: Transport = WebSocketTransport> {
    /// Resolved options.
    options: ConnectionOptions,
    /// Transport URL.
    url: Url,
    /// Socket handle.
    transport: T,
    /// Request state (shared with transport handlers).
    shared: Arc<Shared>,
    /// Set once [`close`](Self::close) has been called.
    closed: AtomicBool,
}

// ============================================================================
// Connection - Display
// ============================================================================

impl<T: Transport> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url.as_str())
            .field("open", &self.transport.is_open())
            .field("request_id", &self.current_request_id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connection - Constructors
// ============================================================================

impl Connection {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// Connects to the server described by `options` over WebSocket.
    ///
    /// Does not wait for the handshake; the first query does. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        options.validate()?;
        let transport = WebSocketTransport::connect(options.url()?);
        Self::with_transport(options, transport)
    }
}

impl<T: Transport> Connection<T> {
    /// Creates a connection over an already established transport and
    /// registers the inbound handlers on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the options are invalid.
    pub fn with_transport(options: ConnectionOptions, transport: T) -> Result<Self> {
        options.validate()?;
        let url = options.url()?;
        let shared = Arc::new(Shared::default());

        let on_message = Arc::clone(&shared);
        transport.on_message(Box::new(move |raw| on_message.receive_message(&raw)));

        let on_error = Arc::clone(&shared);
        transport.on_error(Box::new(move |payload| on_error.receive_error(payload)));

        let on_close = Arc::clone(&shared);
        transport.on_close(Box::new(move || on_close.receive_close()));

        debug!(%url, "Connection created");

        Ok(Self {
            options,
            url,
            transport,
            shared,
            closed: AtomicBool::new(false),
        })
    }
}

// ============================================================================
// Connection - Accessors
// ============================================================================

impl<T: Transport> Connection<T> {
    /// Returns the resolved options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Returns the server host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.options.host
    }

    /// Returns the server port.
    #[inline]
    #[must_use]
    pub fn port(&self) -> u16 {
        self.options.port
    }

    /// Returns the base directory for relative script paths.
    #[inline]
    #[must_use]
    pub fn groovy_script_path(&self) -> &Path {
        &self.options.groovy_script_path
    }

    /// Returns the connection-open timeout.
    #[inline]
    #[must_use]
    pub fn connection_timeout(&self) -> Duration {
        self.options.connection_timeout
    }

    /// Returns the response timeout.
    #[inline]
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        self.options.response_timeout
    }

    /// Returns the transport URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the ID of the current (or last) request.
    #[inline]
    #[must_use]
    pub fn current_request_id(&self) -> Option<RequestId> {
        self.shared.current().map(|(id, _)| id)
    }

    /// Returns the underlying transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

// ============================================================================
// Connection - Public API
// ============================================================================

impl<T: Transport> Connection<T> {
    /// Runs a Gremlin script and returns its `result.data`.
    ///
    /// # Arguments
    ///
    /// * `query` - Script source, must not be blank
    /// * `bindings` - Variables substituted into the script by the server
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `query` is blank
    /// - [`Error::ConnectionTimeout`] if the socket is not open in time
    /// - [`Error::ConnectionClosed`] if the connection was closed or the
    ///   transport closes first
    /// - [`Error::ExecutionTimeout`] if no response arrives in time
    /// - [`Error::Server`] if the server reports an error
    /// - [`Error::Protocol`] if the response envelope is malformed
    pub async fn send_query(&mut self, query: &str, bindings: &Bindings) -> Result<Value> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("query must not be empty"));
        }

        self.wait_connection_open().await?;

        let request_id = self.reset_request();
        let payload = Request::eval(request_id, query, bindings).encode()?;

        self.transport.send(payload, MessageKind::Text)?;
        debug!(%request_id, query_len = query.len(), "Query sent");

        match self.wait_response().await? {
            Resolution::Response { body, partial } => treat_response(body, partial),
            Resolution::Error(payload) => Err(Error::server_payload(payload)),
            Resolution::Closed => Err(Error::ConnectionClosed),
        }
    }

    /// Reads a script file and runs it with [`send_query`](Self::send_query).
    ///
    /// Relative paths are resolved against `groovy_script_path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the file cannot be read
    /// - Any error of [`send_query`](Self::send_query)
    pub async fn send_file(&mut self, path: impl AsRef<Path>, bindings: &Bindings) -> Result<Value> {
        let path = self.script_path(path);
        let query = tokio::fs::read_to_string(&path).await?;

        debug!(path = %path.display(), "Script loaded");
        self.send_query(&query, bindings).await
    }

    /// Returns `true` while the transport is open.
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Closes the transport. Later requests fail with
    /// [`Error::ConnectionClosed`].
    pub fn close(&self) {
        debug!(url = %self.url, "Closing connection");
        self.closed.store(true, Ordering::Release);
        self.transport.close();
    }

    /// Feeds a raw inbound frame to the correlation engine.
    ///
    /// The transport calls this for every message; it is public so other
    /// message sources can be plugged in.
    pub fn receive_message(&self, raw: &str) {
        self.shared.receive_message(raw);
    }

    /// Feeds a transport error to the correlation engine.
    pub fn receive_error(&self, payload: Value) {
        self.shared.receive_error(payload);
    }
}

// ============================================================================
// Connection - Internals
// ============================================================================

impl<T: Transport> Connection<T> {
    fn script_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.options.resolve_script(path)
    }

    /// Waits until the transport reports itself open.
    async fn wait_connection_open(&self) -> Result<()> {
        let limit = self.options.connection_timeout;
        let started_at = Instant::now();

        loop {
            if self.closed.load(Ordering::Acquire) {
                return Err(Error::ConnectionClosed);
            }

            if self.transport.is_open() {
                return Ok(());
            }

            let elapsed = started_at.elapsed();
            if elapsed >= limit {
                warn!(url = %self.url, timeout_ms = millis(limit), "Connection not open");
                return Err(Error::connection_timeout(millis(limit)));
            }

            sleep(OPEN_POLL_INTERVAL.min(limit - elapsed)).await;
        }
    }

    /// Starts a new request.
    fn reset_request(&self) -> RequestId {
        let (request_id, _) = self.shared.reset();
        request_id
    }

    /// Waits until the in-flight request resolves or times out.
    async fn wait_response(&self) -> Result<Resolution> {
        let (request_id, started_at) = self
            .shared
            .current()
            .ok_or_else(|| Error::protocol("no request in flight"))?;
        let limit = self.options.response_timeout;
        // None when the timeout is too large to fall before the clock ends
        let deadline = started_at.checked_add(limit);

        loop {
            if let Some(resolution) = self.shared.resolution() {
                debug!(%request_id, elapsed_ms = millis(started_at.elapsed()), "Request resolved");
                return Ok(resolution);
            }

            let Some(deadline) = deadline else {
                self.shared.changed().await;
                continue;
            };

            if timeout_at(deadline, self.shared.changed()).await.is_err() {
                warn!(%request_id, timeout_ms = millis(limit), "Request timed out");
                return Err(Error::execution_timeout(request_id, millis(limit)));
            }
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
