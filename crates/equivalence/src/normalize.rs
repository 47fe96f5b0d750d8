//! Compaction of documents before comparison
//!
//! The remote API and the local declaration disagree about whether an unset
//! field is omitted, `null`, `{}` or `[]`. Compaction removes all of these
//! so that only meaningful content is compared.

use crate::value::Value;

/// Result of [`normalize`]
#[derive(Debug, Clone, PartialEq)]
pub enum Compacted {
    /// Something meaningful was left
    Value(Value),
    /// The root was a container that held nothing meaningful
    Empty,
    /// The root was `null`
    Absent,
}

impl Compacted {
    /// The remaining value, if any
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Empty | Self::Absent => None,
        }
    }

    /// Check if nothing meaningful was left
    pub fn is_nothing(&self) -> bool {
        !matches!(self, Self::Value(_))
    }
}

/// Strip nulls and empty containers, bottom-up.
///
/// A map or list that becomes empty is removed from its parent. Scalars,
/// including empty strings, are kept as they are.
pub fn normalize(value: &Value) -> Compacted {
    match value {
        Value::Null => Compacted::Absent,
        other => compact(other).map_or(Compacted::Empty, Compacted::Value),
    }
}

fn compact(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Map(map) => {
            let map: std::collections::BTreeMap<_, _> = map
                .iter()
                .filter_map(|(k, v)| compact(v).map(|v| (k.clone(), v)))
                .collect();
            (!map.is_empty()).then_some(Value::Map(map))
        }
        Value::List(items) => {
            let items: Vec<_> = items.iter().filter_map(compact).collect();
            (!items.is_empty()).then_some(Value::List(items))
        }
        scalar => Some(scalar.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_removes_null_and_empty_members() {
        let result = normalize(&v(json!({"a": null, "b": {}, "c": 1})));
        assert_eq!(result, Compacted::Value(v(json!({"c": 1}))));
    }

    #[test]
    fn test_whole_document_collapses() {
        assert_eq!(normalize(&v(json!({"a": null, "b": {}}))), Compacted::Empty);
        assert_eq!(normalize(&v(json!([]))), Compacted::Empty);
    }

    #[test]
    fn test_null_root_is_absent() {
        assert_eq!(normalize(&Value::Null), Compacted::Absent);
        assert_ne!(Compacted::Absent, Compacted::Empty);
    }

    #[test]
    fn test_emptiness_propagates_upward() {
        let result = normalize(&v(json!({"a": {"b": {"c": [null, {}]}}, "d": "x"})));
        assert_eq!(result, Compacted::Value(v(json!({"d": "x"}))));
    }

    #[test]
    fn test_nulls_removed_from_lists() {
        let result = normalize(&v(json!([1, null, [null], 2])));
        assert_eq!(result, Compacted::Value(v(json!([1, 2]))));
    }

    #[test]
    fn test_scalars_kept() {
        let result = normalize(&v(json!({"s": "", "b": false, "n": 0})));
        assert_eq!(result, Compacted::Value(v(json!({"s": "", "b": false, "n": 0}))));
        assert_eq!(normalize(&v(json!(""))), Compacted::Value(v(json!(""))));
    }

    #[test]
    fn test_into_value() {
        assert_eq!(normalize(&v(json!({"a": 1}))).into_value(), Some(v(json!({"a": 1}))));
        assert!(normalize(&v(json!({}))).is_nothing());
        assert_eq!(normalize(&Value::Null).into_value(), None);
    }
}
