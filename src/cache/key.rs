//! Cache Key Module
//!
//! Derives data cache keys from the logical request: method, endpoint and
//! serialized body.

use serde::Serialize;

use crate::error::Result;

// == Api Request ==
/// Logical description of a data fetch, used to derive its cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method, upper-case
    pub method: String,
    /// Endpoint path, e.g. `/projects`
    pub endpoint: String,
    /// JSON-serialized body, empty when there is none
    pub body: String,
}

impl ApiRequest {
    /// A body-less GET.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            endpoint: endpoint.into(),
            body: String::new(),
        }
    }

    /// A request carrying a JSON body.
    pub fn with_body<B: Serialize>(
        method: impl AsRef<str>,
        endpoint: impl Into<String>,
        body: &B,
    ) -> Result<Self> {
        Ok(Self {
            method: method.as_ref().to_ascii_uppercase(),
            endpoint: endpoint.into(),
            body: serde_json::to_string(body)?,
        })
    }

    // == Cache Key ==
    /// `{METHOD}_{endpoint}_{body}`
    pub fn cache_key(&self) -> String {
        format!("{}_{}_{}", self.method, self.endpoint, self.body)
    }
}

/// Derives the cache key for `(method, endpoint, body)` directly.
pub fn cache_key<B: Serialize>(method: &str, endpoint: &str, body: Option<&B>) -> Result<String> {
    let body = match body {
        Some(body) => serde_json::to_string(body)?,
        None => String::new(),
    };
    Ok(format!("{}_{}_{}", method.to_ascii_uppercase(), endpoint, body))
}
