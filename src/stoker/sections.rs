//! Controller payload and menu section aggregation
//!
//! One controller request carries the headline readings; every configured
//! menu is then requested at once. A failing menu only empties its own slot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde_json::{Map, Value};

use super::schema::normalize_section;
use crate::config::StokerConfig;
use crate::error::ClientError;
use crate::models::{NormalizedSection, Snapshot, UNKNOWN_STATE};
use crate::transport::HttpTransport;

pub const CONTROLLER_PATH: &str = "v16bckbeta/dataout2/controllerdata2.php";
pub const MENU_PATH: &str = "v16bckbeta/dataout2/getmenudata.php";

/// Top-level key whose absence means the token was not accepted
const DATA_KEY: &str = "frontdata";

/// Controller payload key → snapshot section name
const CONTROLLER_SECTIONS: [(&str, &str); 6] = [
    ("frontdata", "front"),
    ("boilerdata", "boiler"),
    ("hopperdata", "hopper"),
    ("dhwdata", "dhw"),
    ("weathercomp", "weathercomp"),
    ("miscdata", "misc"),
];

pub struct SectionAggregator {
    transport: Arc<dyn HttpTransport>,
    controller_url: String,
    menu_url: String,
    screen: String,
    menus: Vec<String>,
    primary_timeout: Duration,
    section_timeout: Duration,
}

impl SectionAggregator {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &StokerConfig) -> Self {
        Self {
            transport,
            controller_url: config.url(CONTROLLER_PATH),
            menu_url: config.url(MENU_PATH),
            screen: config.screen.clone(),
            menus: config.menus.clone(),
            primary_timeout: config.primary_timeout(),
            section_timeout: config.section_timeout(),
        }
    }

    /// Controller payload followed by the concurrent menu fan-out.
    pub async fn collect(&self, token: &str) -> Result<Snapshot, ClientError> {
        let payload = self.fetch_controller(token).await?;
        let mut snapshot = snapshot_from_controller(&payload);
        snapshot.menus = self.fetch_menus(token).await;
        Ok(snapshot)
    }

    /// Fetch the controller payload, classifying token symptoms as `Unauthorized`.
    pub async fn fetch_controller(&self, token: &str) -> Result<Map<String, Value>, ClientError> {
        let query = [("screen", self.screen.clone()), ("token", token.to_string())];
        let reply = self
            .transport
            .get(&self.controller_url, &query, self.primary_timeout)
            .await?;

        if reply.status == 401 {
            return Err(ClientError::Unauthorized("HTTP 401".to_string()));
        }
        if !reply.is_ok() {
            return Err(ClientError::Status(reply.status));
        }

        match reply.json()? {
            Value::Object(map) => {
                if map.get(DATA_KEY).map_or(true, Value::is_null) {
                    return Err(ClientError::Unauthorized(format!(
                        "payload has no {}",
                        DATA_KEY
                    )));
                }
                Ok(map)
            }
            _ => Err(ClientError::Unauthorized(
                "payload root is not an object".to_string(),
            )),
        }
    }

    /// Every menu is requested without waiting on the others; each result
    /// lands in its own slot.
    pub async fn fetch_menus(&self, token: &str) -> BTreeMap<String, NormalizedSection> {
        let requests = self.menus.iter().map(|menu| self.fetch_menu(menu, token));
        let results = join_all(requests).await;

        self.menus
            .iter()
            .zip(results)
            .map(|(menu, result)| {
                let section = result.unwrap_or_else(|e| {
                    tracing::warn!("[Stoker] Menu {} fetch failed: {}", menu, e);
                    NormalizedSection::new()
                });
                (menu.clone(), section)
            })
            .collect()
    }

    async fn fetch_menu(&self, menu: &str, token: &str) -> Result<NormalizedSection, ClientError> {
        let query = [("menu", menu.to_string()), ("token", token.to_string())];
        let reply = self
            .transport
            .get(&self.menu_url, &query, self.section_timeout)
            .await?;

        if !reply.is_ok() {
            return Err(ClientError::Status(reply.status));
        }
        if reply.body.trim().is_empty() {
            return Ok(NormalizedSection::new());
        }

        let data = reply.json()?;
        Ok(normalize_section(Some(&data)))
    }
}

/// Headline readings and controller sub-sections; `menus` is left empty.
pub fn snapshot_from_controller(payload: &Map<String, Value>) -> Snapshot {
    let controller: BTreeMap<String, NormalizedSection> = CONTROLLER_SECTIONS
        .iter()
        .map(|(key, name)| (name.to_string(), normalize_section(payload.get(*key))))
        .collect();

    let front = &controller["front"];
    let boiler_temp = front.number("boilertemp");
    let target_temp = front.number("-wantedboilertemp");
    let state = controller["misc"]
        .get("state")
        .and_then(state_text)
        .unwrap_or_else(|| UNKNOWN_STATE.to_string());
    let serial = payload.get("serial").and_then(scalar_text);

    Snapshot {
        boiler_temp,
        target_temp,
        state,
        serial,
        fetched_at: Some(Utc::now()),
        controller,
        menus: BTreeMap::new(),
    }
}

/// `{"value": "Heating"}` in the flat layout, plain `"Heating"` in the record layout
fn state_text(raw: &Value) -> Option<String> {
    match raw {
        Value::Object(obj) => obj.get("value").and_then(scalar_text),
        other => scalar_text(other),
    }
}

fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
