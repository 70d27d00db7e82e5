//! WebSocket transport layer.
//!
//! This module defines the contract between the correlation engine and the
//! socket that carries its frames, plus the tokio-tungstenite implementation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Connection     │                              │  Gremlin Server │
//! │                 │         WebSocket            │                 │
//! │  Transport ─────┼─────────────────────────────►│  /gremlin       │
//! │  handlers  ◄────┼──────────────────────────────│                 │
//! └─────────────────┘        host:port             └─────────────────┘
//! ```
//!
//! # Transport Lifecycle
//!
//! 1. `WebSocketTransport::connect` - spawn the socket task (non-blocking)
//! 2. `Transport::on_message` / `on_error` / `on_close` - register handlers
//! 3. `Transport::is_open` - becomes `true` once the handshake completes
//! 4. `Transport::send` - queue outgoing frames
//! 5. `Transport::close` - close the socket, fires the close handler
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `websocket` | tokio-tungstenite transport and event loop |

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use crate::error::Result;

// ============================================================================
// Submodules
// ============================================================================

/// tokio-tungstenite transport.
pub mod websocket;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use websocket::WebSocketTransport;

// ============================================================================
// Handler Types
// ============================================================================

/// Called with the text of every inbound message.
pub type MessageHandler = Box<dyn Fn(String) + Send + Sync>;

/// Called with the payload of every transport error.
pub type ErrorHandler = Box<dyn Fn(Value) + Send + Sync>;

/// Called once when the socket closes.
pub type CloseHandler = Box<dyn Fn() + Send + Sync>;

// ============================================================================
// MessageKind
// ============================================================================

/// Frame type of an outgoing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    /// UTF-8 text frame.
    #[default]
    Text,
    /// Binary frame.
    Binary,
}

// ============================================================================
// Transport
// ============================================================================

/// An event-driven socket handle.
///
/// Handlers are invoked from the transport's own execution context and must
/// not block. Registering a handler replaces the previous one.
pub trait Transport: Send + Sync + 'static {
    /// Registers the inbound message handler.
    fn on_message(&self, handler: MessageHandler);

    /// Registers the inbound error handler.
    fn on_error(&self, handler: ErrorHandler);

    /// Registers the close handler.
    fn on_close(&self, handler: CloseHandler);

    /// Queues a payload for sending.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Connection`] if the socket is not open yet
    /// - [`crate::Error::ConnectionClosed`] if the socket is gone
    fn send(&self, payload: String, kind: MessageKind) -> Result<()>;

    /// Returns `true` while the socket is open.
    fn is_open(&self) -> bool;

    /// Closes the socket.
    fn close(&self);
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler slots shared between a transport handle and its event loop.
#[derive(Default)]
pub(crate) struct Handlers {
    message: Mutex<Option<MessageHandler>>,
    error: Mutex<Option<ErrorHandler>>,
    close: Mutex<Option<CloseHandler>>,
}

impl Handlers {
    pub(crate) fn set_message(&self, handler: MessageHandler) {
        *self.message.lock() = Some(handler);
    }

    pub(crate) fn set_error(&self, handler: ErrorHandler) {
        *self.error.lock() = Some(handler);
    }

    pub(crate) fn set_close(&self, handler: CloseHandler) {
        *self.close.lock() = Some(handler);
    }

    pub(crate) fn emit_message(&self, text: String) {
        match *self.message.lock() {
            Some(ref handler) => handler(text),
            None => trace!("No message handler, frame dropped"),
        }
    }

    pub(crate) fn emit_error(&self, payload: Value) {
        match *self.error.lock() {
            Some(ref handler) => handler(payload),
            None => trace!(%payload, "No error handler, error dropped"),
        }
    }

    pub(crate) fn emit_close(&self) {
        match *self.close.lock() {
            Some(ref handler) => handler(),
            None => trace!("No close handler, closure dropped"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
