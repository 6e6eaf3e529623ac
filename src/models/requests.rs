//! Request DTOs
//!
//! Defines the structure of incoming control messages.

use serde::Deserialize;

/// Message a client posts to the worker (POST /__worker/message).
///
/// The only message defined is `{"type": "SKIP_WAITING"}`, used by forced
/// update flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
}
