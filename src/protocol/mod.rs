//! Gremlin Server message codec.
//!
//! This module defines the message format exchanged with Gremlin Server
//! over the WebSocket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Server | Script evaluation (`op: "eval"`) |
//! | `InboundMessage` | Server → Local | Raw frame with correlation ID |
//! | `Response` | Server → Local | Status + result envelope |
//!
//! Every frame carries the `requestId` of the request it answers. Large
//! results arrive as several 206 frames followed by a final 200.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `inbound` | Frame decoding for correlation |
//! | `request` | Outgoing request envelope |
//! | `response` | Response envelope and status codes |

// ============================================================================
// Submodules
// ============================================================================

/// Inbound frame decoding.
pub mod inbound;

/// Outgoing request envelope.
pub mod request;

/// Response envelope and status codes.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use inbound::InboundMessage;
pub use request::{Bindings, LANGUAGE_GROOVY, OP_EVAL, Request, RequestArgs};
pub use response::{
    Response, ResponseCode, ResponseResult, ResponseStatus, treat_response,
};
