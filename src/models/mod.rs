//! Request and Response models for the worker control surface
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ControlMessage;
pub use responses::{ErrorResponse, HealthResponse, MessageResponse};
