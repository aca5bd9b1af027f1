//! Lenient field deserializers
//!
//! The backend is loosely typed: ids arrive as strings or numbers, confidences
//! as floats or strings like `"87.5"`, counts as ints or floats. These helpers
//! accept every shape seen in practice and map the rest to "absent".

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String or scalar → `Some(text)`; null, missing, arrays, objects → `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Number or numeric string → `Some(f64)`
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Number or numeric string → `f64`, else 0
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64(deserializer)?.unwrap_or(0.0))
}

/// Non-negative integer (or float/string thereof) → `u64`, else 0
pub fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = opt_f64(deserializer)?.unwrap_or(0.0);
    if n.is_finite() && n > 0.0 {
        Ok(n as u64)
    } else {
        Ok(0)
    }
}

/// Sequence, or null/missing → empty
pub fn vec_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Struct, or null/missing → `T::default()`
pub fn default_on_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_f64(s),
        _ => None,
    }
}

/// Parse the longest numeric prefix of a string
///
/// `"87.5"` → 87.5, `" 92.1% "` → 92.1, `"n/a"` → None.
pub fn parse_leading_f64(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let end = s
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit() || *c == '.' || ((*c == '-' || *c == '+') && *i == 0)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    // "1.2.3" style prefixes: back off until something parses
    (1..=end)
        .rev()
        .filter(|i| s.is_char_boundary(*i))
        .find_map(|i| s[..i].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "f64_or_zero")]
        confidence: f64,
        #[serde(default, deserialize_with = "u64_or_zero")]
        count: u64,
        #[serde(default, deserialize_with = "vec_or_empty")]
        tags: Vec<String>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_id_accepts_string_and_number() {
        assert_eq!(sample(r#"{"id": "abc"}"#).id.as_deref(), Some("abc"));
        assert_eq!(sample(r#"{"id": 42}"#).id.as_deref(), Some("42"));
        assert_eq!(sample(r#"{"id": null}"#).id, None);
        assert_eq!(sample(r#"{}"#).id, None);
    }

    #[test]
    fn test_confidence_accepts_string_and_float() {
        assert_eq!(sample(r#"{"confidence": 87.5}"#).confidence, 87.5);
        assert_eq!(sample(r#"{"confidence": "91.25"}"#).confidence, 91.25);
        assert_eq!(sample(r#"{"confidence": "bogus"}"#).confidence, 0.0);
    }

    #[test]
    fn test_count_truncates_and_clamps() {
        assert_eq!(sample(r#"{"count": 7}"#).count, 7);
        assert_eq!(sample(r#"{"count": 7.9}"#).count, 7);
        assert_eq!(sample(r#"{"count": -3}"#).count, 0);
    }

    #[test]
    fn test_null_sequence_is_empty() {
        assert!(sample(r#"{"tags": null}"#).tags.is_empty());
        assert_eq!(sample(r#"{"tags": ["a"]}"#).tags, vec!["a".to_string()]);
    }

    #[test]
    fn test_parse_leading_f64() {
        assert_eq!(parse_leading_f64(" 92.1% "), Some(92.1));
        assert_eq!(parse_leading_f64("1.2.3"), Some(1.2));
        assert_eq!(parse_leading_f64("-4"), Some(-4.0));
        assert_eq!(parse_leading_f64("n/a"), None);
        assert_eq!(parse_leading_f64(""), None);
    }
}
