//! Gremlin response envelope.
//!
//! # Format
//!
//! ```json
//! {
//!   "requestId": "uuid",
//!   "status": { "code": 200, "message": "", "attributes": {} },
//!   "result": { "data": [ ... ], "meta": {} }
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// ResponseCode
// ============================================================================

/// Gremlin Server status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "u16")]
pub enum ResponseCode {
    /// 200: request completed, result attached.
    Success,
    /// 204: request completed, nothing to return.
    NoContent,
    /// 206: one batch of a streamed result; more frames follow.
    PartialContent,
    /// 401: not authorized to run the request.
    Unauthorized,
    /// 407: server demands SASL authentication.
    Authenticate,
    /// 498: request envelope was malformed.
    MalformedRequest,
    /// 499: request arguments were invalid.
    InvalidRequestArguments,
    /// 500: generic server failure.
    ServerError,
    /// 597: script failed to evaluate.
    ScriptEvaluationError,
    /// 598: server-side evaluation timeout.
    ServerTimeout,
    /// 599: result could not be serialized.
    ServerSerializationError,
    /// Any code this client does not know.
    Other(u16),
}

impl ResponseCode {
    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::NoContent => 204,
            Self::PartialContent => 206,
            Self::Unauthorized => 401,
            Self::Authenticate => 407,
            Self::MalformedRequest => 498,
            Self::InvalidRequestArguments => 499,
            Self::ServerError => 500,
            Self::ScriptEvaluationError => 597,
            Self::ServerTimeout => 598,
            Self::ServerSerializationError => 599,
            Self::Other(code) => code,
        }
    }

    /// Returns `true` for 200, 204 and 206.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::NoContent | Self::PartialContent)
    }
}

impl From<u16> for ResponseCode {
    fn from(code: u16) -> Self {
        match code {
            200 => Self::Success,
            204 => Self::NoContent,
            206 => Self::PartialContent,
            401 => Self::Unauthorized,
            407 => Self::Authenticate,
            498 => Self::MalformedRequest,
            499 => Self::InvalidRequestArguments,
            500 => Self::ServerError,
            597 => Self::ScriptEvaluationError,
            598 => Self::ServerTimeout,
            599 => Self::ServerSerializationError,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ============================================================================
// Response
// ============================================================================

/// Decoded response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Request this frame answers.
    #[serde(default)]
    pub request_id: Option<RequestId>,

    /// Outcome of the request.
    pub status: ResponseStatus,

    /// Payload (absent on some error frames).
    #[serde(default)]
    pub result: ResponseResult,
}

/// The `status` object of a response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseStatus {
    /// Status code.
    pub code: ResponseCode,

    /// Message, usually empty on success.
    #[serde(default)]
    pub message: String,

    /// Extra server-provided attributes.
    #[serde(default)]
    pub attributes: Value,
}

/// The `result` object of a response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseResult {
    /// Traversal result.
    #[serde(default)]
    pub data: Value,

    /// Result metadata.
    #[serde(default)]
    pub meta: Value,
}

impl Response {
    /// Decodes an envelope from an already parsed body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the body is not a Gremlin envelope.
    pub fn from_body(body: &Value) -> Result<Self> {
        Self::deserialize(body)
            .map_err(|e| Error::protocol(format!("invalid response envelope: {e}")))
    }
}

// ============================================================================
// treat_response
// ============================================================================

/// Turns a resolved response body into the caller-facing value.
///
/// `partial` holds the `result.data` of every 206 frame received for the
/// same request, in arrival order; they are placed ahead of the final data.
///
/// # Errors
///
/// - [`Error::Protocol`] if the body is not a Gremlin envelope
/// - [`Error::Server`] if the status code is not a success code
pub fn treat_response(body: Value, partial: Vec<Value>) -> Result<Value> {
    let response = Response::from_body(&body)?;
    let status = response.status;

    if !status.code.is_success() {
        return Err(Error::server(status.code.as_u16(), status.message, body));
    }

    let data = response.result.data;
    if partial.is_empty() {
        return Ok(data);
    }

    Ok(merge_batches(partial, data))
}

/// Concatenates streamed batches into one array.
fn merge_batches(partial: Vec<Value>, last: Value) -> Value {
    let mut merged = Vec::new();

    for batch in partial.into_iter().chain(std::iter::once(last)) {
        match batch {
            Value::Array(items) => merged.extend(items),
            Value::Null => {}
            other => merged.push(other),
        }
    }

    Value::Array(merged)
}

// ============================================================================
// Tests
// ============================================================================
