//! Configuration module

use std::time::Duration;

use serde::Deserialize;

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub stoker: StokerConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StokerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Layout descriptor sent with every controller data request
    #[serde(default = "default_screen")]
    pub screen: String,
    #[serde(default = "default_menus")]
    pub menus: Vec<String>,
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,
    #[serde(default = "default_primary_timeout")]
    pub primary_timeout_secs: u64,
    #[serde(default = "default_section_timeout")]
    pub section_timeout_secs: u64,
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,
    /// Append user/pass to write requests alongside the token
    #[serde(default)]
    pub write_with_credentials: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval(),
        }
    }
}

fn default_base_url() -> String {
    "http://www.stokercloud.dk/".to_string()
}

fn default_screen() -> String {
    "b1,17,b2,5,b3,4,b4,6,b5,12,b6,14,b7,15,b8,16,b9,9,b10,7,\
     d1,3,d2,4,d3,4,d4,0,d5,0,d6,0,d7,0,d8,0,d9,0,d10,0,\
     h1,2,h2,3,h3,5,h4,13,h5,4,h6,1,h7,9,h8,10,h9,7,h10,8,\
     w1,2,w2,3,w3,9,w4,4,w5,5"
        .to_string()
}

pub const DEFAULT_MENUS: [&str; 13] = [
    "boiler",
    "hot_water",
    "regulation",
    "weather",
    "weather2",
    "oxygen",
    "cleaning",
    "hopper",
    "fan",
    "auger",
    "ignition",
    "pump",
    "sun",
];

fn default_menus() -> Vec<String> {
    DEFAULT_MENUS.iter().map(|m| m.to_string()).collect()
}

fn default_login_timeout() -> u64 {
    10
}

fn default_primary_timeout() -> u64 {
    20
}

fn default_section_timeout() -> u64 {
    10
}

fn default_write_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    60
}

impl StokerConfig {
    /// Config with default endpoints and timeouts for the given account
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            username: username.into(),
            password: password.into(),
            screen: default_screen(),
            menus: default_menus(),
            login_timeout_secs: default_login_timeout(),
            primary_timeout_secs: default_primary_timeout(),
            section_timeout_secs: default_section_timeout(),
            write_timeout_secs: default_write_timeout(),
            write_with_credentials: false,
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::Config(
                "username and password are required".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        let timeouts = [
            self.login_timeout_secs,
            self.primary_timeout_secs,
            self.section_timeout_secs,
            self.write_timeout_secs,
        ];
        if timeouts.contains(&0) {
            return Err(ClientError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Join an endpoint path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }

    pub fn primary_timeout(&self) -> Duration {
        Duration::from_secs(self.primary_timeout_secs)
    }

    pub fn section_timeout(&self) -> Duration {
        Duration::from_secs(self.section_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("STOKER").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.stoker.validate()?;
        if config.poll.interval_secs == 0 {
            anyhow::bail!("poll.interval_secs must be non-zero");
        }

        Ok(config)
    }
}
