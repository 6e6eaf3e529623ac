//! Stored Response Module
//!
//! Response as fetched from the network and as kept in a named store. Its
//! age comes from its own `Date` header.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, TimeZone, Utc};

// == Response Type ==
/// Visibility of the response to the page, as a browser would classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin, fully readable
    Basic,
    /// Cross-origin with CORS headers
    Cors,
    /// Cross-origin without CORS, unreadable
    Opaque,
    /// Network-level failure placeholder
    Error,
}

// == Stored Response ==
#[derive(Debug, Clone)]
pub struct StoredResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub response_type: ResponseType,
}

impl StoredResponse {
    /// A basic response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            response_type: ResponseType::Basic,
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Adds a header. Invalid names or values are skipped.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the `Date` header to `epoch_ms`.
    pub fn dated(self, epoch_ms: u64) -> Self {
        let date = format_http_date(epoch_ms);
        self.with_header(header::DATE.as_str(), &date)
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    // == Date ==
    /// Value of the `Date` header in Unix milliseconds; 0 when the header is
    /// missing or unparseable.
    pub fn date_ms(&self) -> u64 {
        self.header(header::DATE.as_str())
            .and_then(parse_http_date)
            .unwrap_or(0)
    }
}

impl IntoResponse for StoredResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

// == HTTP Dates ==
/// Formats Unix milliseconds as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(epoch_ms: u64) -> String {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .unwrap_or_default()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parses an HTTP date into Unix milliseconds.
pub fn parse_http_date(value: &str) -> Option<u64> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .and_then(|dt| u64::try_from(dt.timestamp_millis()).ok())
}
