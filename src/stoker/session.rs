//! Session token lifecycle
//!
//! NoToken → TokenValid on login, back to NoToken on `invalidate()` of the
//! token currently held. The token is never logged.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::StokerConfig;
use crate::error::ClientError;
use crate::transport::HttpTransport;

pub const LOGIN_PATH: &str = "v2/dataout2/login.php";

/// How write requests authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAuth {
    TokenOnly,
    /// Some controllers reject token-only writes; send user/pass as well
    TokenAndCredentials,
}

pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    login_url: String,
    username: String,
    password: String,
    timeout: Duration,
    write_auth: WriteAuth,
    token: RwLock<Option<String>>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &StokerConfig) -> Self {
        let write_auth = if config.write_with_credentials {
            WriteAuth::TokenAndCredentials
        } else {
            WriteAuth::TokenOnly
        };

        Self {
            transport,
            login_url: config.url(LOGIN_PATH),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.login_timeout(),
            write_auth,
            token: RwLock::new(None),
        }
    }

    /// Return the current token, logging in first when there is none.
    pub async fn ensure_token(&self) -> Result<String, ClientError> {
        {
            let token = self.token.read().await;
            if let Some(ref t) = *token {
                return Ok(t.clone());
            }
        }

        // Held across the login so concurrent callers share one login
        let mut token = self.token.write().await;
        if let Some(ref t) = *token {
            return Ok(t.clone());
        }

        let fresh = self.login().await?;
        *token = Some(fresh.clone());
        tracing::info!("[StokerSession] Logged in as {}", self.username);
        Ok(fresh)
    }

    /// Drop `stale` if it is still the current token. A token issued by a
    /// concurrent re-login is left alone.
    pub async fn invalidate(&self, stale: &str) {
        let mut token = self.token.write().await;
        if token.as_deref() == Some(stale) {
            *token = None;
            tracing::debug!("[StokerSession] Session token invalidated");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    pub fn write_auth(&self) -> WriteAuth {
        self.write_auth
    }

    /// Extra query parameters required by the write capability
    pub fn write_credentials(&self) -> Vec<(&'static str, String)> {
        match self.write_auth {
            WriteAuth::TokenOnly => Vec::new(),
            WriteAuth::TokenAndCredentials => vec![
                ("user", self.username.clone()),
                ("pass", self.password.clone()),
            ],
        }
    }

    async fn login(&self) -> Result<String, ClientError> {
        let query = [
            ("user", self.username.clone()),
            ("pass", self.password.clone()),
        ];

        let reply = self
            .transport
            .get(&self.login_url, &query, self.timeout)
            .await
            .map_err(|e| {
                tracing::warn!("[StokerSession] Login request failed: {}", e);
                ClientError::Login(format!("request failed: {}", e))
            })?;

        if !reply.is_ok() {
            tracing::warn!("[StokerSession] Login returned HTTP {}", reply.status);
            return Err(ClientError::Login(format!("HTTP {}", reply.status)));
        }

        let data = reply
            .json()
            .map_err(|e| ClientError::Login(e.to_string()))?;

        let obj = data
            .as_object()
            .ok_or_else(|| ClientError::Login("reply is not a JSON object".to_string()))?;

        match obj.get("token").and_then(|v| v.as_str()) {
            Some(t) if !t.is_empty() => Ok(t.to_string()),
            _ => {
                tracing::error!(
                    "[StokerSession] Login rejected for {} (no token in reply)",
                    self.username
                );
                Err(ClientError::Login("no token in reply".to_string()))
            }
        }
    }
}
