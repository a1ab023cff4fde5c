//! Data models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stoker::value;

// ============================================================================
// Normalized sections
// ============================================================================

/// Uniform `id → value` view of one data section.
///
/// Values are kept as the server sent them; `null` marks an absent reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSection(BTreeMap<String, Value>);

impl NormalizedSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.0.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    /// Numeric reading for `id`, absent when missing or unparseable
    pub fn number(&self, id: &str) -> Option<f64> {
        self.0.get(id).and_then(value::normalize)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.0.get(id).and_then(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for NormalizedSection {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Result of one poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub boiler_temp: Option<f64>,
    pub target_temp: Option<f64>,
    pub state: String,
    pub serial: Option<String>,
    /// `None` for the empty snapshot returned when a poll produced nothing
    pub fetched_at: Option<DateTime<Utc>>,
    /// Sub-sections of the controller payload (front, boiler, hopper, dhw, weathercomp, misc)
    pub controller: BTreeMap<String, NormalizedSection>,
    /// Auxiliary menu sections keyed by menu name
    pub menus: BTreeMap<String, NormalizedSection>,
}

pub const UNKNOWN_STATE: &str = "Unknown";

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            boiler_temp: None,
            target_temp: None,
            state: UNKNOWN_STATE.to_string(),
            serial: None,
            fetched_at: None,
            controller: BTreeMap::new(),
            menus: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fetched_at.is_none()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Write target
// ============================================================================

/// Vendor-side address of a writable parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteTarget {
    pub menu: String,
    pub name: String,
}

impl WriteTarget {
    pub fn new(menu: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            menu: menu.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_number_lookup() {
        let section: NormalizedSection = vec![
            ("boilertemp".to_string(), json!("62,3")),
            ("power".to_string(), json!(41)),
            ("alarm".to_string(), Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(section.number("boilertemp"), Some(62.3));
        assert_eq!(section.number("power"), Some(41.0));
        assert_eq!(section.number("alarm"), None);
        assert_eq!(section.number("missing"), None);
        assert_eq!(section.text("boilertemp"), Some("62,3"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.state, "Unknown");
        assert!(snapshot.controller.is_empty());
        assert!(snapshot.menus.is_empty());
    }

    #[test]
    fn test_section_serializes_flat() {
        let mut section = NormalizedSection::new();
        section.insert("a", json!("1"));
        assert_eq!(serde_json::to_value(&section).unwrap(), json!({"a": "1"}));
    }
}
