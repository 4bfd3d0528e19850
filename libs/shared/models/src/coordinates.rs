use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coordinates were written as text by the onboarding flow, so accept both
/// JSON numbers and numeric strings.
pub fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!("expected coordinate, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Point {
        #[serde(default, deserialize_with = "lenient_coordinate")]
        lat: Option<f64>,
    }

    #[test]
    fn test_accepts_numbers_strings_and_blanks() {
        let p: Point = serde_json::from_value(json!({ "lat": 10.5 })).unwrap();
        assert_eq!(p.lat, Some(10.5));

        let p: Point = serde_json::from_value(json!({ "lat": " 10.5" })).unwrap();
        assert_eq!(p.lat, Some(10.5));

        let p: Point = serde_json::from_value(json!({ "lat": "" })).unwrap();
        assert_eq!(p.lat, None);

        let p: Point = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.lat, None);

        assert!(serde_json::from_value::<Point>(json!({ "lat": "north" })).is_err());
    }
}
