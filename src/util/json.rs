use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Read a number that may have been written as a JSON number or as text.
///
/// Text is read the way a form field would be: a full numeric parse first,
/// then the leading integer ("30 days" reads as 30).
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<f64>() {
                return n.is_finite().then_some(n);
            }
            let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Non-blank string field, trimmed.
pub fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Array of strings. Non-string and blank entries are dropped; a missing or
/// non-array field is `None`.
pub fn string_list_field(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let arr = obj.get(key)?.as_array()?;
    Some(
        arr.iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    )
}

pub fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(number_from_value)
}

/// `deserialize_with` helper for numeric fields that tolerate text.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp (its date part).
pub fn date_from_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// `deserialize_with` helper for optional dates. Blank or unreadable dates
/// are `None`.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(date_from_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_text() {
        assert_eq!(number_from_value(&json!(12)), Some(12.0));
        assert_eq!(number_from_value(&json!("12.5")), Some(12.5));
        assert_eq!(number_from_value(&json!("30 días")), Some(30.0));
        assert_eq!(number_from_value(&json!("unos días")), None);
        assert_eq!(number_from_value(&json!(null)), None);
    }

    #[test]
    fn string_fields_are_trimmed() {
        let obj = json!({"a": "  hi ", "b": "   ", "c": 3});
        let obj = obj.as_object().unwrap();
        assert_eq!(string_field(obj, "a").as_deref(), Some("hi"));
        assert_eq!(string_field(obj, "b"), None);
        assert_eq!(string_field(obj, "c"), None);
        assert_eq!(string_field(obj, "missing"), None);
    }

    #[test]
    fn string_lists_skip_junk() {
        let obj = json!({"techs": ["React", 3, "", "Node"], "bad": "React"});
        let obj = obj.as_object().unwrap();
        assert_eq!(
            string_list_field(obj, "techs"),
            Some(vec!["React".to_string(), "Node".to_string()])
        );
        assert_eq!(string_list_field(obj, "bad"), None);
    }

    #[test]
    fn dates_from_forms_and_timestamps() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(date_from_str("2024-03-01"), day);
        assert_eq!(date_from_str(" 2024-03-01T10:30:00Z "), day);
        assert_eq!(date_from_str("2024-03-01T23:30:00-05:00"), day);
        assert_eq!(date_from_str(""), None);
        assert_eq!(date_from_str("next week"), None);
    }
}
