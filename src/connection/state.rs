//! Per-request tracking state.
//!
//! The state is written from two contexts: the caller (request start) and
//! the transport event loop (message, error and close intake). Both go
//! through one mutex; every intake write also signals a [`Notify`] so the
//! waiting caller re-checks without polling.

// ============================================================================
// Imports
// ============================================================================

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::identifiers::RequestId;
use crate::protocol::InboundMessage;

// ============================================================================
// RequestState
// ============================================================================

/// Fields reset together at the start of every request.
#[derive(Debug, Default)]
pub(crate) struct RequestState {
    /// In-flight request, `None` before the first request.
    pub request_id: Option<RequestId>,
    /// When the in-flight request started.
    pub started_at: Option<Instant>,
    /// Decoded body of the matching final response.
    pub response: Option<Value>,
    /// Latest transport error payload.
    pub error: Option<Value>,
    /// `result.data` of each 206 frame, in arrival order.
    pub partial: Vec<Value>,
    /// Transport reported closure.
    pub closed: bool,
}

// ============================================================================
// Resolution
// ============================================================================

/// How an in-flight request ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Resolution {
    /// Transport error payload.
    Error(Value),
    /// Final response body plus earlier 206 batches.
    Response { body: Value, partial: Vec<Value> },
    /// Transport closed first.
    Closed,
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between a connection and its transport handlers.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: Mutex<RequestState>,
    notify: Notify,
}

impl Shared {
    /// Starts a new request: fresh ID, fresh clock, nothing latched.
    pub(crate) fn reset(&self) -> (RequestId, Instant) {
        let request_id = RequestId::generate();
        let started_at = Instant::now();

        let mut state = self.state.lock();
        *state = RequestState {
            request_id: Some(request_id),
            started_at: Some(started_at),
            ..RequestState::default()
        };

        (request_id, started_at)
    }

    /// Message intake. Never fails; undecodable or foreign frames are dropped.
    pub(crate) fn receive_message(&self, raw: &str) {
        let message = match InboundMessage::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, len = raw.len(), "Dropping undecodable frame");
                return;
            }
        };

        let mut state = self.state.lock();

        if !message.matches(state.request_id) {
            trace!(
                request_id = ?message.request_id,
                current = ?state.request_id,
                "Dropping uncorrelated frame"
            );
            return;
        }

        if message.is_partial() {
            state.partial.push(message.into_data());
            trace!(batches = state.partial.len(), "Partial batch received");
            return;
        }

        debug!(request_id = ?state.request_id, "Response received");
        state.response = Some(message.body);
        drop(state);

        self.notify.notify_one();
    }

    /// Error intake. Latches unconditionally.
    pub(crate) fn receive_error(&self, payload: Value) {
        debug!(%payload, "Transport error received");
        self.state.lock().error = Some(payload);
        self.notify.notify_one();
    }

    /// Close intake.
    pub(crate) fn receive_close(&self) {
        debug!("Transport closed");
        self.state.lock().closed = true;
        self.notify.notify_one();
    }

    /// Returns the resolution, if any. Error wins over response, response
    /// over closure. Latched values stay in place until the next reset.
    pub(crate) fn resolution(&self) -> Option<Resolution> {
        let state = self.state.lock();

        if let Some(ref error) = state.error {
            return Some(Resolution::Error(error.clone()));
        }

        if let Some(ref body) = state.response {
            return Some(Resolution::Response {
                body: body.clone(),
                partial: state.partial.clone(),
            });
        }

        state.closed.then_some(Resolution::Closed)
    }

    /// Waits for the next intake signal.
    pub(crate) async fn changed(&self) {
        self.notify.notified().await;
    }

    /// Returns the in-flight request and its start time.
    pub(crate) fn current(&self) -> Option<(RequestId, Instant)> {
        let state = self.state.lock();
        state.request_id.zip(state.started_at)
    }

    /// Runs `f` with the state locked.
    #[cfg(test)]
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut RequestState) -> R) -> R {
        f(&mut self.state.lock())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn frame(request_id: Option<RequestId>, code: u16, data: Value) -> String {
        let mut body = json!({
            "status": { "code": code, "message": "", "attributes": {} },
            "result": { "data": data, "meta": {} }
        });
        if let Some(id) = request_id {
            body["requestId"] = json!(id.to_string());
        }
        body.to_string()
    }

    #[test]
    fn test_reset_clears_everything() {
        let shared = Shared::default();
        shared.with_state(|state| {
            state.response = Some(json!("old response"));
            state.error = Some(json!("old error"));
            state.partial.push(json!([1]));
            state.closed = true;
        });

        let (id, started_at) = shared.reset();

        shared.with_state(|state| {
            assert_eq!(state.request_id, Some(id));
            assert_eq!(state.started_at, Some(started_at));
            assert!(state.response.is_none());
            assert!(state.error.is_none());
            assert!(state.partial.is_empty());
            assert!(!state.closed);
        });
    }

    #[test]
    fn test_reset_generates_new_id() {
        let shared = Shared::default();
        let (first, _) = shared.reset();
        let (second, _) = shared.reset();
        assert_ne!(first, second);
        assert_eq!(second.to_string().len(), RequestId::LEN);
    }

    #[test]
    fn test_message_without_request_id_is_ignored() {
        let shared = Shared::default();
        shared.reset();
        shared.receive_message(r#"{"example" : "data 1"}"#);
        assert!(shared.with_state(|s| s.response.is_none()));
        assert_eq!(shared.resolution(), None);
    }

    #[test]
    fn test_message_with_other_request_id_is_ignored() {
        let shared = Shared::default();
        shared.reset();
        shared.receive_message(&frame(Some(RequestId::generate()), 200, json!([1])));
        assert!(shared.with_state(|s| s.response.is_none()));
    }

    #[test]
    fn test_message_before_any_request_is_ignored() {
        let shared = Shared::default();
        shared.receive_message(&frame(Some(RequestId::generate()), 200, json!([1])));
        assert_eq!(shared.resolution(), None);
    }

    #[test]
    fn test_matching_message_is_latched_whole() {
        let shared = Shared::default();
        let (id, _) = shared.reset();
        let raw = format!(r#"{{"example" : "data 2", "requestId" : "{id}"}}"#);

        shared.receive_message(&raw);

        let response = shared.with_state(|s| s.response.clone());
        assert_eq!(
            response,
            Some(json!({"example": "data 2", "requestId": id.to_string()}))
        );
    }

    #[test]
    fn test_simple_form_request_id_is_ignored() {
        let shared = Shared::default();
        let (id, _) = shared.reset();
        let raw = json!({
            "requestId": id.as_uuid().simple().to_string(),
            "status": { "code": 200, "message": "", "attributes": {} },
            "result": { "data": [1], "meta": {} }
        })
        .to_string();

        shared.receive_message(&raw);
        assert_eq!(shared.resolution(), None);
    }

    #[test]
    fn test_undecodable_message_is_ignored() {
        let shared = Shared::default();
        shared.reset();
        shared.receive_message("{not json");
        assert_eq!(shared.resolution(), None);
    }

    #[test]
    fn test_partial_frames_accumulate() {
        let shared = Shared::default();
        let (id, _) = shared.reset();

        shared.receive_message(&frame(Some(id), 206, json!([1, 2])));
        shared.receive_message(&frame(Some(id), 206, json!([3])));
        assert_eq!(shared.resolution(), None);

        shared.receive_message(&frame(Some(id), 200, json!([4])));
        match shared.resolution() {
            Some(Resolution::Response { partial, .. }) => {
                assert_eq!(partial, vec![json!([1, 2]), json!([3])]);
            }
            other => panic!("Expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_error_is_latched_unconditionally() {
        let shared = Shared::default();
        shared.receive_error(json!("this_is_a_bad_error"));
        assert_eq!(
            shared.with_state(|s| s.error.clone()),
            Some(json!("this_is_a_bad_error"))
        );
    }

    #[test]
    fn test_error_wins_over_response() {
        let shared = Shared::default();
        let (id, _) = shared.reset();
        shared.receive_message(&frame(Some(id), 200, json!([1])));
        shared.receive_error(json!("boom"));
        assert_eq!(shared.resolution(), Some(Resolution::Error(json!("boom"))));
    }

    #[test]
    fn test_response_wins_over_close() {
        let shared = Shared::default();
        let (id, _) = shared.reset();
        shared.receive_message(&frame(Some(id), 200, json!([1])));
        shared.receive_close();
        assert!(matches!(
            shared.resolution(),
            Some(Resolution::Response { .. })
        ));
    }

    #[test]
    fn test_close_resolves() {
        let shared = Shared::default();
        shared.reset();
        shared.receive_close();
        assert_eq!(shared.resolution(), Some(Resolution::Closed));
    }

    #[test]
    fn test_current() {
        let shared = Shared::default();
        assert!(shared.current().is_none());
        let (id, started_at) = shared.reset();
        assert_eq!(shared.current(), Some((id, started_at)));
    }

    #[tokio::test]
    async fn test_signal_is_not_lost() {
        let shared = Shared::default();
        let (id, _) = shared.reset();

        // Signal before anyone waits; the stored permit must wake the waiter
        shared.receive_message(&frame(Some(id), 200, json!([1])));

        tokio::time::timeout(std::time::Duration::from_secs(1), shared.changed())
            .await
            .expect("permit should be stored");
    }
}
