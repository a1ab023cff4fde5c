//! Parameter write path
//!
//! Logical parameter keys are mapped to the vendor's `(menu, name)` pair and
//! written as integers. The reply is plain text; success is signalled by an
//! `OK` word or a zero status.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;

use crate::config::StokerConfig;
use crate::error::ClientError;
use crate::models::WriteTarget;
use crate::transport::HttpTransport;

pub const WRITE_PATH: &str = "v2/dataout2/updatevalue.php";

/// Logical keys whose vendor names do not follow the `menu.name` pattern
const KNOWN_TARGETS: [(&str, &str, &str); 4] = [
    ("dhwwanted", "hot_water", "hot_water.temp"),
    ("dhwdiff", "hot_water", "hot_water.diff_under"),
    ("wantedboilertemp", "boiler", "boiler.temp"),
    ("-wantedboilertemp", "boiler", "boiler.temp"),
];

pub fn resolve(key: &str) -> WriteTarget {
    if let Some((_, menu, name)) = KNOWN_TARGETS.iter().find(|(k, _, _)| *k == key) {
        return WriteTarget::new(*menu, *name);
    }

    match key.split_once('.') {
        Some((menu, _)) => WriteTarget::new(menu, key),
        None => WriteTarget::new(key, key),
    }
}

/// The endpoint only takes integers. Non-finite input has no integer form.
pub fn round_value(value: f64) -> Option<i64> {
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value.round() as i64)
}

fn ok_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bok\b").expect("valid regex"))
}

fn status_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""status"\s*:\s*(?:"0"|0\b)"#).expect("valid regex"))
}

pub fn is_confirmed(status: u16, body: &str) -> bool {
    status == 200 && (ok_marker().is_match(body) || status_marker().is_match(body))
}

pub struct ParameterWriter {
    transport: Arc<dyn HttpTransport>,
    url: String,
    timeout: Duration,
}

impl ParameterWriter {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &StokerConfig) -> Self {
        Self {
            transport,
            url: config.url(WRITE_PATH),
            timeout: config.write_timeout(),
        }
    }

    /// Send one write. `credentials` is appended verbatim to the query.
    pub async fn send(
        &self,
        target: &WriteTarget,
        value: i64,
        token: &str,
        credentials: Vec<(&'static str, String)>,
    ) -> Result<(), ClientError> {
        let mut query = vec![
            ("menu", target.menu.clone()),
            ("name", target.name.clone()),
            ("token", token.to_string()),
            ("value", value.to_string()),
        ];
        query.extend(credentials);

        let reply = self.transport.get(&self.url, &query, self.timeout).await?;

        if reply.status == 401 {
            return Err(ClientError::Unauthorized("HTTP 401".to_string()));
        }
        if !is_confirmed(reply.status, &reply.body) {
            let body: String = reply.body.trim().chars().take(200).collect();
            return Err(ClientError::Rejected(format!(
                "HTTP {}: {}",
                reply.status, body
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockOutcome, MockTransport};

    #[test]
    fn test_resolve_known_keys() {
        assert_eq!(resolve("dhwwanted"), WriteTarget::new("hot_water", "hot_water.temp"));
        assert_eq!(resolve("-wantedboilertemp"), WriteTarget::new("boiler", "boiler.temp"));
    }

    #[test]
    fn test_resolve_fallback() {
        assert_eq!(resolve("fan.speed"), WriteTarget::new("fan", "fan.speed"));
        assert_eq!(resolve("igniter"), WriteTarget::new("igniter", "igniter"));
        assert_eq!(
            resolve("weather.zone1.offset"),
            WriteTarget::new("weather", "weather.zone1.offset")
        );
    }

    #[test]
    fn test_round_value() {
        assert_eq!(round_value(54.6), Some(55));
        assert_eq!(round_value(54.4), Some(54));
        assert_eq!(round_value(-0.5), Some(-1));
        assert_eq!(round_value(f64::NAN), None);
        assert_eq!(round_value(f64::INFINITY), None);
    }

    #[test]
    fn test_confirmation_markers() {
        assert!(is_confirmed(200, "OK"));
        assert!(is_confirmed(200, "value saved: ok"));
        assert!(is_confirmed(200, r#"{"status":"0"}"#));
        assert!(is_confirmed(200, r#"{"status": 0}"#));

        assert!(!is_confirmed(500, "OK"));
        assert!(!is_confirmed(200, r#"{"status":"1","error":"bad token"}"#));
        assert!(!is_confirmed(200, r#"{"status":10}"#));
        assert!(!is_confirmed(200, ""));
    }

    #[tokio::test]
    async fn test_send_builds_query() {
        let mock = Arc::new(MockTransport::new().on(WRITE_PATH, |_| MockOutcome::text(200, "OK")));
        let writer = ParameterWriter::new(mock.clone(), &StokerConfig::new("user", "secret"));

        let target = resolve("dhwwanted");
        writer
            .send(&target, 55, "abc", vec![("user", "user".to_string())])
            .await
            .unwrap();

        let req = &mock.requests()[0];
        assert_eq!(req.param("menu"), Some("hot_water"));
        assert_eq!(req.param("name"), Some("hot_water.temp"));
        assert_eq!(req.param("token"), Some("abc"));
        assert_eq!(req.param("value"), Some("55"));
        assert_eq!(req.param("user"), Some("user"));
    }

    #[tokio::test]
    async fn test_send_classifies_failures() {
        let mock = Arc::new(
            MockTransport::new().on(WRITE_PATH, |req| match req.param("name") {
                Some("a") => MockOutcome::text(401, ""),
                _ => MockOutcome::text(200, "ERROR"),
            }),
        );
        let writer = ParameterWriter::new(mock, &StokerConfig::new("user", "secret"));

        let err = writer.send(&resolve("a"), 1, "abc", vec![]).await.unwrap_err();
        assert!(err.is_auth_failure());

        let err = writer.send(&resolve("b"), 1, "abc", vec![]).await.unwrap_err();
        assert!(matches!(err, ClientError::Rejected(_)));
    }
}
