//! StokerCloud client façade
//!
//! Coordinates the session, the section aggregator and the parameter writer.
//! Public operations never fail: reads degrade to empty values, writes to
//! `false`. The `try_*` variants expose the underlying error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::sections::SectionAggregator;
use super::session::SessionManager;
use super::write::{resolve, round_value, ParameterWriter};
use crate::config::StokerConfig;
use crate::error::ClientError;
use crate::models::Snapshot;
use crate::transport::{HttpTransport, ReqwestTransport};

pub const CONSUMPTION_PATH: &str = "v16bckbeta/dataout2/getconsumption.php";

/// First attempt plus one retry after re-login
const MAX_ATTEMPTS: usize = 2;

pub struct StokerClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
    sections: SectionAggregator,
    writer: ParameterWriter,
    consumption_url: String,
    consumption_timeout: Duration,
}

impl StokerClient {
    /// Client over a fresh `reqwest` transport
    pub fn new(config: &StokerConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    pub fn with_transport(config: &StokerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            session: SessionManager::new(transport.clone(), config),
            sections: SectionAggregator::new(transport.clone(), config),
            writer: ParameterWriter::new(transport.clone(), config),
            consumption_url: config.url(CONSUMPTION_PATH),
            consumption_timeout: config.section_timeout(),
            transport,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    /// Poll the controller and every menu. Empty snapshot on failure.
    pub async fn fetch(&self) -> Snapshot {
        match self.try_fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("[Stoker] Fetch failed: {}", e);
                Snapshot::empty()
            }
        }
    }

    pub async fn try_fetch(&self) -> Result<Snapshot, ClientError> {
        let snapshot = self
            .with_session("fetch", move |token| async move {
                self.sections.collect(&token).await
            })
            .await?;

        tracing::debug!(
            "[Stoker] Fetched snapshot: state={}, boiler_temp={:?}, {} menus",
            snapshot.state,
            snapshot.boiler_temp,
            snapshot.menus.len()
        );
        Ok(snapshot)
    }

    /// Write a parameter by its logical key. No retry on token expiry.
    pub async fn write(&self, key: &str, value: f64) -> bool {
        match self.try_write(key, value).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[StokerWrite] Write of {} failed: {}", key, e);
                false
            }
        }
    }

    pub async fn try_write(&self, key: &str, value: f64) -> Result<(), ClientError> {
        let token = self.session.ensure_token().await?;
        let target = resolve(key);
        let rounded = round_value(value)
            .ok_or_else(|| ClientError::Rejected(format!("{} is not a finite number", value)))?;

        let result = self
            .writer
            .send(&target, rounded, &token, self.session.write_credentials())
            .await;

        match result {
            Ok(()) => {
                tracing::info!(
                    "[StokerWrite] {} = {} written to {}/{}",
                    key,
                    rounded,
                    target.menu,
                    target.name
                );
                Ok(())
            }
            Err(e) => {
                if e.is_auth_failure() {
                    self.session.invalidate(&token).await;
                }
                Err(e)
            }
        }
    }

    /// Consumption history for the last `months` months. Empty on failure.
    pub async fn consumption(&self, months: u32) -> Vec<Value> {
        let result = self
            .with_session("consumption", move |token| async move {
                self.fetch_consumption(months, &token).await
            })
            .await;

        result.unwrap_or_else(|e| {
            tracing::warn!("[Stoker] Consumption fetch failed: {}", e);
            Vec::new()
        })
    }

    async fn fetch_consumption(&self, months: u32, token: &str) -> Result<Vec<Value>, ClientError> {
        let query = [("months", months.to_string()), ("token", token.to_string())];
        let reply = self
            .transport
            .get(&self.consumption_url, &query, self.consumption_timeout)
            .await?;

        if reply.status == 401 {
            return Err(ClientError::Unauthorized("HTTP 401".to_string()));
        }
        if !reply.is_ok() {
            return Err(ClientError::Status(reply.status));
        }

        match reply.json()? {
            Value::Array(items) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    /// Run `op` with a valid token. An auth failure (including a failed
    /// login) allows exactly one more attempt; a rejected token is
    /// invalidated first.
    async fn with_session<T, F, Fut>(&self, name: &str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            // A failed login leaves nothing cached, so there is no token to drop
            let (used, result) = match self.session.ensure_token().await {
                Ok(token) => {
                    let result = op(token.clone()).await;
                    (Some(token), result)
                }
                Err(e) => (None, Err(e)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_auth_failure() => {
                    tracing::warn!(
                        "[Stoker] {} attempt {}/{} rejected: {}",
                        name,
                        attempt,
                        MAX_ATTEMPTS,
                        e
                    );
                    if let Some(stale) = used {
                        self.session.invalidate(&stale).await;
                    }
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| ClientError::Login("no attempt made".to_string())))
    }
}
