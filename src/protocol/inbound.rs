//! Inbound frame decoding.
//!
//! Only the fields needed for correlation are interpreted here; the body is
//! kept whole so the connection can hand it to
//! [`treat_response`](super::treat_response) unchanged.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::ResponseCode;

// ============================================================================
// InboundMessage
// ============================================================================

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Correlation ID, `None` when absent or not in the hyphenated
    /// lowercase form this client sends.
    pub request_id: Option<RequestId>,

    /// The whole decoded body, `requestId` included.
    pub body: Value,
}

impl InboundMessage {
    /// Decodes a raw text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the frame is not JSON
    /// - [`Error::Protocol`] if the frame is not a JSON object
    pub fn decode(raw: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(raw)?;

        if !body.is_object() {
            return Err(Error::protocol("inbound frame is not a JSON object"));
        }

        let request_id = body
            .get("requestId")
            .and_then(Value::as_str)
            .and_then(|s| {
                s.parse::<RequestId>()
                    .ok()
                    .filter(|id| id.to_string() == s)
            });

        Ok(Self { request_id, body })
    }

    /// Returns `true` if this frame belongs to `request_id`.
    #[inline]
    #[must_use]
    pub fn matches(&self, request_id: Option<RequestId>) -> bool {
        self.request_id.is_some() && self.request_id == request_id
    }

    /// Returns the status code, if the frame carries one.
    #[must_use]
    pub fn status_code(&self) -> Option<ResponseCode> {
        self.body
            .pointer("/status/code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .map(ResponseCode::from)
    }

    /// Returns `true` for a 206 batch frame.
    #[inline]
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.status_code() == Some(ResponseCode::PartialContent)
    }

    /// Takes `result.data` out of the body.
    #[must_use]
    pub fn into_data(self) -> Value {
        match self.body {
            Value::Object(mut map) => map
                .remove("result")
                .and_then(|mut result| result.get_mut("data").map(Value::take))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
