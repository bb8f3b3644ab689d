//! Lenient field readers for preset configuration
//!
//! Preset files are hand-edited, so extension fields are read forgivingly:
//! a value of the wrong JSON type deserializes as `None` and the extension's
//! documented default applies. Use with
//! `#[serde(default, deserialize_with = "lenient::bool")]` on `Option` fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a boolean; the strings "true"/"false" (any case) are accepted.
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Read a float from a number or a numeric string.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Read an integer; floats with no fractional part are accepted.
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Read a string; numbers are rendered (YAML turns `1` into a number).
pub fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_bool))
}

pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_f64))
}

pub fn i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_i64))
}

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(as_string))
}

/// Read a nested object; a value of the wrong shape reads as `None`.
pub fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Read a list where a malformed item becomes `T::default()` instead of
/// failing the whole list, so item positions are kept.
pub fn vec_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        Some(Value::Array(items)) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Probe {
        #[serde(default, deserialize_with = "super::bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "super::f64")]
        ratio: Option<f64>,
        #[serde(default, deserialize_with = "super::i64")]
        steps: Option<i64>,
        #[serde(default, deserialize_with = "super::string")]
        label: Option<String>,
    }

    #[test]
    fn test_wrong_types_become_none() {
        let probe: Probe = serde_json::from_value(json!({
            "flag": [1, 2],
            "ratio": "wide",
            "steps": {"n": 3},
            "label": true
        }))
        .unwrap();
        assert_eq!(probe, Probe::default());
    }

    #[test]
    fn test_string_forms_are_accepted() {
        let probe: Probe = serde_json::from_value(json!({
            "flag": "TRUE",
            "ratio": "0.25",
            "steps": "20",
            "label": 1
        }))
        .unwrap();
        assert_eq!(probe.flag, Some(true));
        assert_eq!(probe.ratio, Some(0.25));
        assert_eq!(probe.steps, Some(20));
        assert_eq!(probe.label.as_deref(), Some("1"));
    }

    #[test]
    fn test_missing_and_null_fields() {
        let probe: Probe = serde_json::from_value(json!({ "flag": null })).unwrap();
        assert_eq!(probe, Probe::default());
    }

    #[test]
    fn test_integral_float_reads_as_integer() {
        assert_eq!(as_i64(&json!(28.0)), Some(28));
        assert_eq!(as_i64(&json!(28.5)), None);
    }

    #[test]
    fn test_or_none_on_wrong_shape() {
        #[derive(Debug, Default, Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "super::or_none")]
            probe: Option<Probe>,
        }

        let holder: Holder = serde_json::from_value(json!({ "probe": true })).unwrap();
        assert!(holder.probe.is_none());
        let holder: Holder = serde_json::from_value(json!({ "probe": {"steps": 4} })).unwrap();
        assert_eq!(holder.probe.and_then(|p| p.steps), Some(4));
    }

    #[test]
    fn test_vec_or_default_keeps_positions() {
        #[derive(Debug, Default, Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "super::vec_or_default")]
            items: Vec<Probe>,
        }

        let holder: Holder =
            serde_json::from_value(json!({ "items": [{"flag": true}, 42, {"steps": 3}] }))
                .unwrap();
        assert_eq!(holder.items.len(), 3);
        assert_eq!(holder.items[0].flag, Some(true));
        assert_eq!(holder.items[1], Probe::default());
        assert_eq!(holder.items[2].steps, Some(3));
    }
}
