//! HTTP transport seam
//!
//! The StokerCloud client only needs query-string GET requests with a
//! per-request timeout. `ReqwestTransport` is the production implementation;
//! tests swap in `MockTransport`.

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::ClientError;

/// Query parameters as `(name, value)` pairs, sent in order.
pub type Query = [(&'static str, String)];

/// Raw HTTP reply: status code plus the undecoded body.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Parse the body as JSON regardless of the advertised content type.
    pub fn json(&self) -> Result<Value, ClientError> {
        serde_json::from_str(&self.body)
            .map_err(|e| ClientError::Malformed(format!("invalid JSON: {}", e)))
    }
}

/// HTTP transport trait
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request. Non-2xx statuses are returned as replies, not errors.
    async fn get(
        &self,
        url: &str,
        query: &Query,
        timeout: Duration,
    ) -> Result<HttpReply, ClientError>;
}

/// `reqwest`-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("stoker-link/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &Query,
        timeout: Duration,
    ) -> Result<HttpReply, ClientError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                ClientError::Timeout(timeout)
            } else {
                ClientError::Transport(e.to_string())
            }
        };

        let resp = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_err)?;

        Ok(HttpReply { status, body })
    }
}
