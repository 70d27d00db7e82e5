//! Outgoing request envelope.
//!
//! Gremlin Server accepts script evaluation requests as JSON text frames.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::RequestId;

// ============================================================================
// Constants
// ============================================================================

/// Operation name for script evaluation.
pub const OP_EVAL: &str = "eval";

/// Script language understood by the server.
pub const LANGUAGE_GROOVY: &str = "gremlin-groovy";

// ============================================================================
// Types
// ============================================================================

/// Variables substituted into the script by the server.
pub type Bindings = FxHashMap<String, Value>;

// ============================================================================
// Request
// ============================================================================

/// A script evaluation request.
///
/// # Format
///
/// ```json
/// {
///   "requestId": "uuid",
///   "op": "eval",
///   "processor": "",
///   "args": {
///     "gremlin": "g.V().count()",
///     "bindings": { ... },
///     "language": "gremlin-groovy"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<'a> {
    /// Identifier echoed back by every response frame.
    pub request_id: RequestId,

    /// Server operation.
    pub op: &'static str,

    /// Op processor; empty selects the default (sessionless) one.
    pub processor: &'static str,

    /// Operation arguments.
    pub args: RequestArgs<'a>,
}

/// Arguments of an `eval` request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestArgs<'a> {
    /// Script source.
    pub gremlin: &'a str,

    /// Script variables.
    pub bindings: &'a Bindings,

    /// Script language.
    pub language: &'static str,
}

impl<'a> Request<'a> {
    /// Creates an `eval` request for the given script.
    #[inline]
    #[must_use]
    pub fn eval(request_id: RequestId, gremlin: &'a str, bindings: &'a Bindings) -> Self {
        Self {
            request_id,
            op: OP_EVAL,
            processor: "",
            args: RequestArgs {
                gremlin,
                bindings,
                language: LANGUAGE_GROOVY,
            },
        }
    }

    /// Encodes the request as a JSON text payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if a binding cannot be serialized.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
