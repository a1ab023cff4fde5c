//! Raw field value codec
//!
//! StokerCloud reports readings as JSON numbers, numeric strings with either
//! decimal separator, or sentinel strings. Anything that does not yield a
//! finite number is reported as absent.

use serde_json::{Number, Value};

/// Strings the service uses for "no reading"
const SENTINELS: [&str; 3] = ["", "N/A", "None"];

pub fn is_sentinel(raw: &str) -> bool {
    SENTINELS.contains(&raw.trim())
}

/// Parse a raw value into a number, `None` when absent or unparseable.
pub fn normalize(raw: &Value) -> Option<f64> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_str(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Same as [`normalize`] but stays in JSON: a number or `null`.
pub fn normalize_value(raw: &Value) -> Value {
    normalize(raw)
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn parse_str(raw: &str) -> Option<f64> {
    if is_sentinel(raw) {
        return None;
    }
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinels_are_absent() {
        for raw in [Value::Null, json!(""), json!("N/A"), json!("None"), json!("  ")] {
            assert_eq!(normalize(&raw), None, "{raw}");
        }
    }

    #[test]
    fn test_decimal_separators() {
        assert_eq!(normalize(&json!("12,5")), Some(12.5));
        assert_eq!(normalize(&json!("12.5")), Some(12.5));
        assert_eq!(normalize(&json!(" 7 ")), Some(7.0));
        assert_eq!(normalize(&json!("-3,25")), Some(-3.25));
        assert_eq!(normalize(&json!(12.5)), Some(12.5));
        assert_eq!(normalize(&json!(0)), Some(0.0));
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(normalize(&json!("Heating")), None);
        assert_eq!(normalize(&json!("1,2,3")), None);
        assert_eq!(normalize(&json!("NaN")), None);
        assert_eq!(normalize(&json!("inf")), None);
        assert_eq!(normalize(&json!(true)), None);
        assert_eq!(normalize(&json!([1])), None);
        assert_eq!(normalize(&json!({"value": 1})), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            Value::Null,
            json!(""),
            json!("N/A"),
            json!("None"),
            json!("62,3"),
            json!("62.3"),
            json!(80),
            json!("off"),
        ];
        for raw in inputs {
            let once = normalize_value(&raw);
            assert_eq!(normalize_value(&once), once, "{raw}");
        }
        assert_eq!(normalize_value(&json!("62,3")), json!(62.3));
        assert_eq!(normalize_value(&json!("N/A")), Value::Null);
    }
}
