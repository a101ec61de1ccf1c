//! Helper functions for reading `project.json` values (key access, scalar rendering).

use serde_json::Value;

/// String value of an object key, if present and a string.
pub fn get_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

/// Boolean value of an object key, defaulting to `false`.
pub fn get_bool(obj: &Value, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Numeric value of an object key. The editor serializes positions both as
/// numbers and as numeric strings, so both are accepted.
pub fn get_f64(obj: &Value, key: &str) -> Option<f64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Nullable string key: `null` and a missing key both map to `None`.
pub fn get_opt_string(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(|s| s.to_string())
}

/// Render a scalar JSON value the way the editor shows it: strings verbatim,
/// numbers and booleans in their canonical textual form.
pub fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_f64_accepts_numeric_strings() {
        let v = json!({"x": 12.5, "y": "-40", "z": "abc"});
        assert_eq!(get_f64(&v, "x"), Some(12.5));
        assert_eq!(get_f64(&v, "y"), Some(-40.0));
        assert_eq!(get_f64(&v, "z"), None);
        assert_eq!(get_f64(&v, "w"), None);
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("hi")), "hi");
        assert_eq!(scalar_to_string(&json!(10)), "10");
        assert_eq!(scalar_to_string(&json!(true)), "true");
        assert_eq!(scalar_to_string(&json!(null)), "");
    }
}
