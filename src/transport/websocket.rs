//! WebSocket transport and event loop.
//!
//! # Event Loop
//!
//! [`WebSocketTransport::connect`] spawns a tokio task that:
//!
//! - Performs the WebSocket handshake with the server
//! - Forwards inbound text (and UTF-8 binary) frames to the message handler
//! - Forwards socket failures to the error handler
//! - Drains outgoing frames queued by [`Transport::send`]
//! - Fires the close handler exactly once when it terminates

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{CloseHandler, ErrorHandler, Handlers, MessageHandler, MessageKind, Transport};

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the event loop.
enum TransportCommand {
    /// Write a frame.
    Send(Message),
    /// Close the socket.
    Close,
}

// ============================================================================
// WebSocketTransport
// ============================================================================

/// WebSocket connection to a Gremlin Server.
///
/// The handle is cheap; all I/O happens on the spawned event loop task.
/// Dropping the handle closes the socket.
pub struct WebSocketTransport {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    /// Handler slots (shared with event loop).
    handlers: Arc<Handlers>,
    /// Handshake completed and socket not yet closed.
    open: Arc<AtomicBool>,
    /// Server URL.
    url: Url,
}

impl WebSocketTransport {
    /// Starts connecting to `url`.
    ///
    /// Returns immediately; [`Transport::is_open`] turns `true` once the
    /// handshake completes. A failed handshake is reported through the error
    /// handler followed by the close handler.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn connect(url: Url) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handlers = Arc::new(Handlers::default());
        let open = Arc::new(AtomicBool::new(false));

        tokio::spawn(Self::run_event_loop(
            url.clone(),
            command_rx,
            Arc::clone(&handlers),
            Arc::clone(&open),
        ));

        Self {
            command_tx,
            handlers,
            open,
            url,
        }
    }

    /// Returns the server URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        url: Url,
        mut command_rx: mpsc::UnboundedReceiver<TransportCommand>,
        handlers: Arc<Handlers>,
        open: Arc<AtomicBool>,
    ) {
        let ws_stream = match connect_async(url.as_str()).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                error!(%url, error = %e, "WebSocket connect failed");
                handlers.emit_error(Value::String(e.to_string()));
                handlers.emit_close();
                return;
            }
        };

        open.store(true, Ordering::Release);
        info!(%url, "WebSocket connection established");

        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                // Incoming frames from server
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            handlers.emit_message(text.as_str().to_owned());
                        }

                        Some(Ok(Message::Binary(bytes))) => {
                            match String::from_utf8(bytes.to_vec()) {
                                Ok(text) => handlers.emit_message(text),
                                Err(_) => warn!(len = bytes.len(), "Dropping non UTF-8 binary frame"),
                            }
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            handlers.emit_error(Value::String(e.to_string()));
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ping/Pong are answered by tungstenite
                        _ => {}
                    }
                }

                // Commands from the handle
                command = command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send(message)) => {
                            if let Err(e) = ws_write.send(message).await {
                                warn!(error = %e, "Failed to send frame");
                                handlers.emit_error(Value::String(e.to_string()));
                                break;
                            }
                            trace!("Frame sent");
                        }

                        Some(TransportCommand::Close) => {
                            debug!("Close command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Transport handle dropped");
                            let _ = ws_write.close().await;
                            break;
                        }
                    }
                }
            }
        }

        open.store(false, Ordering::Release);
        handlers.emit_close();

        debug!(%url, "Event loop terminated");
    }
}

impl Transport for WebSocketTransport {
    fn on_message(&self, handler: MessageHandler) {
        self.handlers.set_message(handler);
    }

    fn on_error(&self, handler: ErrorHandler) {
        self.handlers.set_error(handler);
    }

    fn on_close(&self, handler: CloseHandler) {
        self.handlers.set_close(handler);
    }

    fn send(&self, payload: String, kind: MessageKind) -> Result<()> {
        if self.command_tx.is_closed() {
            return Err(Error::ConnectionClosed);
        }

        if !self.is_open() {
            return Err(Error::connection(format!("{} handshake not complete", self.url)));
        }

        let message = match kind {
            MessageKind::Text => Message::Text(payload.into()),
            MessageKind::Binary => Message::Binary(payload.into_bytes().into()),
        };

        self.command_tx
            .send(TransportCommand::Send(message))
            .map_err(|_| Error::ConnectionClosed)
    }

    #[inline]
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn close(&self) {
        let _ = self.command_tx.send(TransportCommand::Close);
    }
}

// ============================================================================
// Tests
// ============================================================================
