//! Scripted transport for tests

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{HttpReply, HttpTransport, Query};
use crate::error::ClientError;

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What a route answers, optionally after a delay
pub struct MockOutcome {
    delay: Duration,
    result: Result<HttpReply, ClientError>,
}

impl MockOutcome {
    pub fn json(status: u16, body: Value) -> Self {
        Self::text(status, body.to_string())
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(HttpReply::new(status, body)),
        }
    }

    pub fn error(err: ClientError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(err),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(&RecordedRequest) -> MockOutcome + Send + Sync>;

/// Routes requests by URL suffix; unmatched requests get a 404.
pub struct MockTransport {
    routes: Vec<(String, Responder)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on<F>(mut self, path_suffix: &str, responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockOutcome + Send + Sync + 'static,
    {
        self.routes
            .push((path_suffix.to_string(), Box::new(responder)));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path_suffix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.ends_with(path_suffix))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(
        &self,
        url: &str,
        query: &Query,
        timeout: Duration,
    ) -> Result<HttpReply, ClientError> {
        let request = RecordedRequest {
            url: url.to_string(),
            params: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        self.requests.lock().unwrap().push(request.clone());

        let outcome = match self.routes.iter().find(|(p, _)| url.ends_with(p.as_str())) {
            Some((_, responder)) => responder(&request),
            None => MockOutcome::text(404, "not found"),
        };

        if outcome.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(ClientError::Timeout(timeout));
        }
        if !outcome.delay.is_zero() {
            tokio::time::sleep(outcome.delay).await;
        }
        outcome.result
    }
}
