//! Section shape normalization
//!
//! The same logical section arrives as a list of `{id, value}` records, as a
//! flat object, as an empty list, or as something else entirely. Every shape
//! ends up as a [`NormalizedSection`]; unknown shapes become empty.

use serde_json::Value;

use crate::models::NormalizedSection;

const NOT_AVAILABLE: &str = "N/A";

pub fn normalize_section(raw: Option<&Value>) -> NormalizedSection {
    match raw {
        Some(Value::Array(items)) => from_records(items),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) if s == NOT_AVAILABLE => Value::Null,
                    other => other.clone(),
                };
                (k.clone(), value)
            })
            .collect(),
        _ => NormalizedSection::new(),
    }
}

fn from_records(items: &[Value]) -> NormalizedSection {
    items
        .iter()
        .filter_map(|item| {
            let record = item.as_object()?;
            let id = match record.get("id")? {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let value = record.get("value").cloned().unwrap_or(Value::Null);
            Some((id, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_keep_only_identified_objects() {
        let raw = json!([{"id": "a", "value": "1"}, {"novalue": "x"}, "junk", 5]);
        let section = normalize_section(Some(&raw));
        assert_eq!(serde_json::to_value(&section).unwrap(), json!({"a": "1"}));
    }

    #[test]
    fn test_records_stringify_numeric_ids() {
        let raw = json!([{"id": 17, "value": 3}, {"id": "x"}]);
        let section = normalize_section(Some(&raw));
        assert_eq!(section.get("17"), Some(&json!(3)));
        assert_eq!(section.get("x"), Some(&Value::Null));
    }

    #[test]
    fn test_flat_object_replaces_not_available() {
        let raw = json!({"a": "1", "b": "N/A", "state": {"value": "Heating"}});
        let section = normalize_section(Some(&raw));
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({"a": "1", "b": null, "state": {"value": "Heating"}})
        );
    }

    #[test]
    fn test_other_shapes_are_empty() {
        assert!(normalize_section(None).is_empty());
        assert!(normalize_section(Some(&Value::Null)).is_empty());
        assert!(normalize_section(Some(&json!("text"))).is_empty());
        assert!(normalize_section(Some(&json!(42))).is_empty());
        assert!(normalize_section(Some(&json!([]))).is_empty());
    }
}
