//! Network Module
//!
//! The worker's only way to reach the network. `HttpNetwork` talks to real
//! servers with reqwest; tests substitute their own implementations.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use tracing::trace;

use crate::error::Result;
use crate::worker::{FetchRequest, ResponseType, StoredResponse};

/// Performs a single network fetch. Errors mean the network itself failed;
/// any HTTP status, including 4xx/5xx, is a successful fetch.
#[async_trait]
pub trait Network: Send + Sync + Debug {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse>;
}

/// Shared network handle.
pub type SharedNetwork = Arc<dyn Network>;

// == HTTP Network ==
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    /// Origin whose responses count as `basic`
    origin: String,
}

impl HttpNetwork {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            origin: origin.into().trim_end_matches('/').to_ascii_lowercase(),
        }
    }

    fn classify(&self, request: &FetchRequest, headers: &HeaderMap) -> ResponseType {
        if request.origin() == self.origin {
            ResponseType::Basic
        } else if headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN) {
            ResponseType::Cors
        } else {
            ResponseType::Opaque
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        let mut headers = request.headers.clone();
        strip_hop_headers(&mut headers);
        headers.remove(header::HOST);

        trace!(method = %request.method, url = %request.url(), "network fetch");
        let response = self
            .client
            .request(request.method.clone(), request.url())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_headers(&mut headers);
        let body = response.bytes().await?;

        Ok(StoredResponse {
            status,
            response_type: self.classify(request, &headers),
            headers,
            body,
        })
    }
}

/// Removes headers that describe one connection rather than the message.
fn strip_hop_headers(headers: &mut HeaderMap) {
    for name in [
        header::CONNECTION,
        header::TRANSFER_ENCODING,
        header::CONTENT_LENGTH,
        header::UPGRADE,
        header::TE,
        header::TRAILER,
        header::PROXY_AUTHORIZATION,
    ] {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}
