//! Semantic comparison of documents
//!
//! Two documents are equivalent when they describe the same configuration,
//! even if the remote side reorders lists or adds fields that never
//! round-trip. See [`Comparator`] for the exact rules.

use crate::normalize::{Compacted, normalize};
use crate::value::{Number, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Keys ignored by [`Options::default`].
///
/// The remote API returns metric expressions in a different textual form
/// than the one that was sent, so they never compare equal.
pub const DEFAULT_IGNORE_KEYS: &[&str] = &["metricExpressions"];

/// How numbers of different kinds compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberMode {
    /// Integers compare with integers, floats with floats; `4 != 4.0`
    #[default]
    Strict,
    /// Everything compares as `f64`; `4 == 4.0`
    Unified,
}

/// How lists are matched against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMatching {
    /// Each element takes the first unmatched equal element on the other
    /// side. Not guaranteed to find a matching when ignored keys make
    /// element equality non-transitive.
    #[default]
    Greedy,
    /// Bring both sides into canonical form (ignored keys stripped, lists
    /// sorted by [`Value::total_cmp`] at every depth) and compare pairwise.
    Sorted,
}

/// Comparison options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Map keys that never take part in a comparison, at any depth
    pub ignore_keys: BTreeSet<String>,
    /// Numeric comparison mode
    pub numbers: NumberMode,
    /// List matching strategy
    pub lists: ListMatching,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_keys: DEFAULT_IGNORE_KEYS.iter().map(ToString::to_string).collect(),
            numbers: NumberMode::default(),
            lists: ListMatching::default(),
        }
    }
}

impl Options {
    /// Options that ignore exactly the given keys
    pub fn ignoring<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignore_keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Decides whether two documents are equivalent.
///
/// - Values of different variants are never equal; `Null` equals `Null`.
/// - Scalars compare by value; numbers follow [`NumberMode`].
/// - Maps are equal when they have the same keys (ignored keys dropped on
///   both sides) and equal values for every key.
/// - Lists are compared as multisets: same length and every element has a
///   distinct equal partner on the other side.
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    options: Options,
}

impl Comparator {
    /// Create a comparator with the given options
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// The options in use
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compare two values as they are
    pub fn equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => self.numbers_equal(a, b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => self.maps_equal(a, b),
            (Value::List(a), Value::List(b)) => self.lists_equal(a, b),
            _ => false,
        }
    }

    /// Compare two values after compacting both with [`normalize`]
    pub fn equivalent(&self, a: &Value, b: &Value) -> bool {
        self.equal_compacted(&normalize(a), &normalize(b))
    }

    /// Compare two compacted documents.
    ///
    /// A root that compacted to nothing matches another root that compacted
    /// to nothing, whether it started out empty or null.
    pub fn equal_compacted(&self, a: &Compacted, b: &Compacted) -> bool {
        match (a, b) {
            (Compacted::Value(a), Compacted::Value(b)) => self.equal(a, b),
            (Compacted::Value(_), _) | (_, Compacted::Value(_)) => false,
            _ => true,
        }
    }

    fn is_ignored(&self, key: &str) -> bool {
        self.options.ignore_keys.contains(key)
    }

    fn numbers_equal(&self, a: &Number, b: &Number) -> bool {
        match self.options.numbers {
            NumberMode::Strict => match (a.as_integer(), b.as_integer()) {
                (Some(a), Some(b)) => a == b,
                (None, None) => a.as_f64() == b.as_f64(),
                _ => false,
            },
            NumberMode::Unified => match (a.as_integer(), b.as_integer()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
        }
    }

    fn maps_equal(&self, a: &BTreeMap<String, Value>, b: &BTreeMap<String, Value>) -> bool {
        let keys_a = a.keys().filter(|k| !self.is_ignored(k));
        let keys_b = b.keys().filter(|k| !self.is_ignored(k));
        if !keys_a.eq(keys_b) {
            return false;
        }

        a.iter()
            .filter(|(k, _)| !self.is_ignored(k))
            .all(|(k, va)| b.get(k).is_some_and(|vb| self.equal(va, vb)))
    }

    fn lists_equal(&self, a: &[Value], b: &[Value]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        match self.options.lists {
            ListMatching::Greedy => self.lists_equal_greedy(a, b),
            ListMatching::Sorted => self.lists_equal_sorted(a, b),
        }
    }

    fn lists_equal_greedy(&self, a: &[Value], b: &[Value]) -> bool {
        let mut matched = vec![false; b.len()];
        for item in a {
            let Some(index) = (0..b.len()).find(|&i| !matched[i] && self.equal(item, &b[i])) else {
                return false;
            };
            matched[index] = true;
        }
        true
    }

    fn lists_equal_sorted(&self, a: &[Value], b: &[Value]) -> bool {
        let sorted = |items: &[Value]| {
            let mut items: Vec<Value> = items.iter().map(|v| self.canonical(v)).collect();
            items.sort_by(Value::total_cmp);
            items
        };
        let a = sorted(a);
        let b = sorted(b);
        a.iter().zip(&b).all(|(x, y)| self.equal(x, y))
    }

    /// Remove ignored keys and sort lists, at every depth
    fn canonical(&self, value: &Value) -> Value {
        match value {
            Value::Map(map) => Value::Map(
                map.iter()
                    .filter(|(k, _)| !self.is_ignored(k))
                    .map(|(k, v)| (k.clone(), self.canonical(v)))
                    .collect(),
            ),
            Value::List(items) => {
                let mut items: Vec<Value> = items.iter().map(|v| self.canonical(v)).collect();
                items.sort_by(Value::total_cmp);
                Value::List(items)
            }
            other => other.clone(),
        }
    }
}

/// Compare `a` and `b`, ignoring exactly `ignore_keys`, with default
/// number and list handling.
pub fn equal(a: &Value, b: &Value, ignore_keys: &[&str]) -> bool {
    Comparator::new(Options::ignoring(ignore_keys.iter().copied())).equal(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_reflexive() {
        let samples = [
            json!(null),
            json!(true),
            json!(4),
            json!(4.5),
            json!("text"),
            json!([1, [2, 3], {"a": null}]),
            json!({"a": {"b": [1, 1, 2]}, "c": "", "d": []}),
        ];
        for sample in samples {
            let value = v(sample);
            assert!(equal(&value, &value, &[]), "{value:?}");
        }
    }

    #[test]
    fn test_type_mismatch() {
        assert!(!equal(&v(json!({})), &v(json!([])), &[]));
        assert!(!equal(&v(json!("1")), &v(json!(1)), &[]));
        assert!(!equal(&v(json!(false)), &v(json!(0)), &[]));
    }

    #[test]
    fn test_null_handling() {
        assert!(equal(&Value::Null, &Value::Null, &[]));
        assert!(!equal(&Value::Null, &v(json!(0)), &[]));
        assert!(!equal(&v(json!("")), &Value::Null, &[]));
    }

    #[test]
    fn test_scalars() {
        assert!(equal(&v(json!("a")), &v(json!("a")), &[]));
        assert!(!equal(&v(json!("a")), &v(json!("a ")), &[]));
        assert!(!equal(&v(json!(1)), &v(json!(2)), &[]));
    }

    #[test]
    fn test_list_order_independent() {
        assert!(equal(&v(json!([1, 2, 3])), &v(json!([3, 1, 2])), &[]));
    }

    #[test]
    fn test_list_is_multiset() {
        assert!(!equal(&v(json!([1, 1, 2])), &v(json!([1, 2, 2])), &[]));
        assert!(!equal(&v(json!([1, 2])), &v(json!([1, 2, 2])), &[]));
    }

    #[test]
    fn test_nested_lists_of_maps() {
        let a = v(json!([{"name": "a", "tags": ["x", "y"]}, {"name": "b"}]));
        let b = v(json!([{"name": "b"}, {"tags": ["y", "x"], "name": "a"}]));
        assert!(equal(&a, &b, &[]));
    }

    #[test]
    fn test_map_ignores_supplied_key() {
        let a = v(json!({"a": 1, "b": 2}));
        let b = v(json!({"a": 1, "b": 3}));
        assert!(equal(&a, &b, &["b"]));
        assert!(!equal(&a, &b, &[]));
    }

    #[test]
    fn test_ignored_key_missing_on_one_side() {
        let a = v(json!({"a": 1, "b": 2}));
        let b = v(json!({"a": 1}));
        assert!(equal(&a, &b, &["b"]));
    }

    #[test]
    fn test_ignored_key_at_depth() {
        let a = v(json!({"tiles": [{"metricExpressions": ["x"], "name": "t"}]}));
        let b = v(json!({"tiles": [{"metricExpressions": ["y"], "name": "t"}]}));
        assert!(Comparator::default().equal(&a, &b));
        assert!(!equal(&a, &b, &[]));
    }

    #[test]
    fn test_map_key_sets_differ() {
        assert!(!equal(&v(json!({"a": 1})), &v(json!({"b": 1})), &[]));
        assert!(!equal(&v(json!({"a": 1})), &v(json!({"a": 1, "b": 1})), &[]));
    }

    #[test]
    fn test_strict_numbers() {
        let comparator = Comparator::default();
        assert!(!comparator.equal(&Value::from(4_i64), &Value::from(4.0)));
        assert!(comparator.equal(&Value::from(4.0), &Value::from(4.0)));
        assert!(comparator.equal(
            &Value::Number(Number::Int(7)),
            &Value::Number(Number::UInt(7))
        ));
    }

    #[test]
    fn test_unified_numbers() {
        let comparator = Comparator::new(Options {
            numbers: NumberMode::Unified,
            ..Options::default()
        });
        assert!(comparator.equal(&Value::from(4_i64), &Value::from(4.0)));
        assert!(!comparator.equal(&Value::from(4_i64), &Value::from(4.5)));
    }

    #[test]
    fn test_sorted_matching_agrees_with_greedy() {
        let sorted = Comparator::new(Options {
            lists: ListMatching::Sorted,
            ..Options::default()
        });
        let greedy = Comparator::default();
        let cases = [
            (json!([1, 2, 3]), json!([3, 1, 2]), true),
            (json!([1, 1, 2]), json!([1, 2, 2]), false),
            (json!([{"a": [2, 1]}, "x"]), json!(["x", {"a": [1, 2]}]), true),
            (json!([null, true]), json!([true, null]), true),
            (
                json!([{"a": [2, 1]}, {"a": [1, 3]}]),
                json!([{"a": [1, 2]}, {"a": [3, 1]}]),
                true,
            ),
        ];
        for (a, b, expected) in cases {
            let (a, b) = (v(a), v(b));
            assert_eq!(greedy.equal(&a, &b), expected);
            assert_eq!(sorted.equal(&a, &b), expected);
        }
    }

    #[test]
    fn test_sorted_matching_respects_ignored_keys() {
        let sorted = Comparator::new(Options {
            ignore_keys: ["id".to_string()].into(),
            lists: ListMatching::Sorted,
            ..Options::default()
        });
        let a = v(json!([{"id": 9, "n": "a"}, {"id": 1, "n": "b"}]));
        let b = v(json!([{"id": 2, "n": "b"}, {"id": 3, "n": "a"}]));
        assert!(sorted.equal(&a, &b));
    }

    #[test]
    fn test_equivalent_compacts_first() {
        let comparator = Comparator::default();
        let a = v(json!({"a": 1, "b": null, "c": {}, "d": [null]}));
        let b = v(json!({"a": 1}));
        assert!(comparator.equivalent(&a, &b));
        assert!(!comparator.equal(&a, &b));
    }

    #[test]
    fn test_equivalent_empty_roots() {
        let comparator = Comparator::default();
        assert!(comparator.equivalent(&v(json!({})), &v(json!({"a": null}))));
        assert!(comparator.equivalent(&Value::Null, &v(json!([]))));
        assert!(!comparator.equivalent(&Value::Null, &v(json!(0))));
    }

    #[test]
    fn test_options_serde_names() {
        let options: Options = serde_json::from_value(json!({
            "ignore_keys": ["a"],
            "numbers": "unified",
            "lists": "sorted"
        }))
        .unwrap();
        assert_eq!(options.numbers, NumberMode::Unified);
        assert_eq!(options.lists, ListMatching::Sorted);
        assert!(options.ignore_keys.contains("a"));
    }
}
