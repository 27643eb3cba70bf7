//! Structural comparison over JSON values.
//!
//! `serde_json::Value`'s own `PartialEq` separates `40` from `40.0`; the
//! tracker serializes numbers without caring about that distinction, so
//! numbers are compared by value here. No other coercion happens: `"40"`
//! never equals `40`.

use serde_json::{Number, Value};

/// Deep equality over JSON values.
#[must_use]
pub fn json_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_eq(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_eq(x, y)))
        }
        _ => false,
    }
}

/// Partial structural match: every key of an object `pattern` must be present
/// in `value` and match recursively. Non-object patterns, arrays included,
/// use [`json_eq`].
#[must_use]
pub fn json_is_match(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(actual), Value::Object(wanted)) => wanted
            .iter()
            .all(|(key, p)| actual.get(key).is_some_and(|v| json_is_match(v, p))),
        _ => json_eq(value, pattern),
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert!(json_eq(&json!(null), &json!(null)));
        assert!(json_eq(&json!(true), &json!(true)));
        assert!(!json_eq(&json!(true), &json!(false)));
        assert!(json_eq(&json!("pv"), &json!("pv")));
        assert!(!json_eq(&json!("pv"), &json!("se")));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(json_eq(&json!(40), &json!(40.0)));
        assert!(json_eq(&json!(55.1), &json!(55.1)));
        assert!(!json_eq(&json!(55.1), &json!(55.2)));
        assert!(json_eq(&json!(-3), &json!(-3)));
        assert!(json_eq(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!json_eq(&json!(u64::MAX), &json!(u64::MAX - 1)));
    }

    #[test]
    fn no_type_coercion() {
        assert!(!json_eq(&json!("0.0"), &json!(0.0)));
        assert!(!json_eq(&json!("1"), &json!(1)));
        assert!(!json_eq(&json!(0), &json!(false)));
        assert!(!json_eq(&json!(null), &json!("")));
    }

    #[test]
    fn arrays_are_ordered() {
        assert!(json_eq(&json!([1, 2]), &json!([1, 2])));
        assert!(!json_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_eq(&json!([1, 2]), &json!([1, 2, 3])));
    }

    #[test]
    fn objects_ignore_key_order() {
        assert!(json_eq(
            &json!({"a": 1, "b": {"c": [true]}}),
            &json!({"b": {"c": [true]}, "a": 1.0})
        ));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn is_match_is_partial_on_objects() {
        let value = json!({"osType": "ubuntu", "osVersion": "2016", "nested": {"x": 1, "y": 2}});
        assert!(json_is_match(&value, &json!({"osType": "ubuntu"})));
        assert!(json_is_match(&value, &json!({"nested": {"y": 2}})));
        assert!(json_is_match(&value, &json!({})));
        assert!(!json_is_match(&value, &json!({"osType": "android"})));
        assert!(!json_is_match(&value, &json!({"missing": null})));
    }

    #[test]
    fn is_match_on_non_objects_is_equality() {
        assert!(json_is_match(&json!([1, 2]), &json!([1, 2])));
        assert!(!json_is_match(&json!([1, 2]), &json!([1])));
        assert!(!json_is_match(&json!("a"), &json!({})));
    }

    #[test]
    fn nested_arrays_in_pattern_require_full_equality() {
        let value = json!({"tags": ["a", "b"], "meta": {"ids": [1, 2, 3]}});
        assert!(json_is_match(&value, &json!({"tags": ["a", "b"]})));
        assert!(json_is_match(&value, &json!({"meta": {"ids": [1, 2, 3]}})));
        assert!(!json_is_match(&value, &json!({"tags": ["a"]})));
        assert!(!json_is_match(&value, &json!({"tags": ["b", "a"]})));
        assert!(!json_is_match(&value, &json!({"meta": {"ids": [1, 2]}})));
    }
}
