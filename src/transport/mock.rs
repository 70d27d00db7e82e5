//! Test doubles for the transport layer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{Error, Result};

use super::{CloseHandler, ErrorHandler, Handlers, MessageHandler, MessageKind, Transport};

/// Produces reply frames for a sent payload.
type Responder = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;

// ============================================================================
// MockTransport
// ============================================================================

#[derive(Default)]
struct MockInner {
    handlers: Handlers,
    open: AtomicBool,
    closed: AtomicBool,
    open_checks: AtomicUsize,
    sent: Mutex<Vec<(String, MessageKind)>>,
    responder: Mutex<Option<Responder>>,
}

/// In-memory transport. Clones share state, so a test can keep a handle
/// after moving one into a connection.
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    inner: Arc<MockInner>,
}

impl MockTransport {
    pub(crate) fn open() -> Self {
        let mock = Self::default();
        mock.set_open(true);
        mock
    }

    pub(crate) fn set_open(&self, open: bool) {
        self.inner.open.store(open, Ordering::SeqCst);
    }

    /// Replies to every sent payload with the frames `responder` returns.
    pub(crate) fn respond_with<F>(&self, responder: F)
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        *self.inner.responder.lock() = Some(Box::new(responder));
    }

    pub(crate) fn deliver_message(&self, raw: impl Into<String>) {
        self.inner.handlers.emit_message(raw.into());
    }

    pub(crate) fn deliver_error(&self, payload: Value) {
        self.inner.handlers.emit_error(payload);
    }

    pub(crate) fn deliver_close(&self) {
        self.set_open(false);
        self.inner.handlers.emit_close();
    }

    pub(crate) fn sent(&self) -> Vec<(String, MessageKind)> {
        self.inner.sent.lock().clone()
    }

    pub(crate) fn open_checks(&self) -> usize {
        self.inner.open_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn was_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn on_message(&self, handler: MessageHandler) {
        self.inner.handlers.set_message(handler);
    }

    fn on_error(&self, handler: ErrorHandler) {
        self.inner.handlers.set_error(handler);
    }

    fn on_close(&self, handler: CloseHandler) {
        self.inner.handlers.set_close(handler);
    }

    fn send(&self, payload: String, kind: MessageKind) -> Result<()> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(Error::ConnectionClosed);
        }

        let replies = match *self.inner.responder.lock() {
            Some(ref responder) => responder(&payload),
            None => Vec::new(),
        };

        self.inner.sent.lock().push((payload, kind));

        for reply in replies {
            self.deliver_message(reply);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.open_checks.fetch_add(1, Ordering::SeqCst);
        self.inner.open.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.deliver_close();
    }
}

// ============================================================================
// Loopback Server
// ============================================================================

/// Spawns a WebSocket server on a random localhost port.
///
/// Every text frame received is passed to `respond`; each returned string
/// is written back as a text frame.
pub(crate) async fn spawn_server<F>(respond: F) -> SocketAddr
where
    F: Fn(String) -> Vec<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local addr");
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };

                while let Some(Ok(message)) = ws.next().await {
                    match message {
                        Message::Text(text) => {
                            for reply in respond(text.as_str().to_owned()) {
                                if ws.send(Message::Text(reply.into())).await.is_err() {
                                    return;
                                }
                            }
                        }
                        Message::Close(_) => return,
                        _ => {}
                    }
                }
            });
        }
    });

    addr
}
