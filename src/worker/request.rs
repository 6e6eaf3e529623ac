//! Intercepted Request Module

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Uri};

use crate::error::{CacheError, Result};

// == Request Mode ==
/// How the request was issued by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level page navigation
    Navigate,
    SameOrigin,
    Cors,
    NoCors,
}

impl RequestMode {
    /// Reads `Sec-Fetch-Mode`, falling back to treating HTML-accepting GETs
    /// as navigations when the header is absent.
    pub fn from_headers(method: &Method, headers: &HeaderMap) -> Self {
        let fetch_mode = headers
            .get("sec-fetch-mode")
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        match fetch_mode.as_deref() {
            Some("navigate") => RequestMode::Navigate,
            Some("cors") => RequestMode::Cors,
            Some("no-cors") => RequestMode::NoCors,
            Some(_) => RequestMode::SameOrigin,
            None => {
                let accepts_html = headers
                    .get(header::ACCEPT)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| v.contains("text/html"))
                    .unwrap_or(false);
                if *method == Method::GET && accepts_html {
                    RequestMode::Navigate
                } else {
                    RequestMode::SameOrigin
                }
            }
        }
    }
}

// == Fetch Request ==
/// An outgoing request as seen by the worker. The URI is always absolute.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub uri: Uri,
    pub mode: RequestMode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchRequest {
    /// Builds a request, rejecting URIs without scheme or host.
    pub fn new(method: Method, url: &str, mode: RequestMode) -> Result<Self> {
        let uri: Uri = url
            .parse()
            .map_err(|e| CacheError::InvalidRequest(format!("invalid url '{url}': {e}")))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(CacheError::InvalidRequest(format!(
                "url '{url}' is not absolute"
            )));
        }
        Ok(Self {
            method,
            uri,
            mode,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    /// A subresource GET.
    pub fn get(url: &str) -> Result<Self> {
        Self::new(Method::GET, url, RequestMode::SameOrigin)
    }

    /// A page navigation.
    pub fn navigate(url: &str) -> Result<Self> {
        Self::new(Method::GET, url, RequestMode::Navigate)
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    // == Origin ==
    /// `scheme://host[:port]`, lower-cased.
    pub fn origin(&self) -> String {
        let scheme = self.uri.scheme_str().unwrap_or("http");
        let authority = self.uri.authority().map(|a| a.as_str()).unwrap_or("");
        format!("{}://{}", scheme, authority).to_ascii_lowercase()
    }

    // == Cache Key ==
    /// Normalized URL used as the store key.
    pub fn cache_key(&self) -> String {
        let path = self
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .filter(|pq| !pq.is_empty())
            .unwrap_or("/");
        format!("{}{}", self.origin(), path)
    }

    pub fn url(&self) -> String {
        self.uri.to_string()
    }
}

/// Resolves a root-relative path against an origin.
pub fn resolve(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}
