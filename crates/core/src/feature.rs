//! Feature schema and input reconciliation.
//!
//! A fitted transform only understands records shaped exactly like the data it
//! was fitted on: the same columns, in the same order. Inbound requests are
//! arbitrary JSON objects, so every record passes through [`reconcile`] first.
//!
//! Reconciliation is deliberately shallow:
//! - columns missing from the input get [`MISSING_FEATURE_DEFAULT`] (`0`);
//! - keys not in the schema are dropped;
//! - values are copied as-is (no coercion). A malformed scalar is the
//!   transform's problem, not the reconciler's.

use std::collections::HashSet;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Value substituted for a schema column absent from the input.
pub const MISSING_FEATURE_DEFAULT: i64 = 0;

/// Ordered, immutable list of feature columns a fitted transform expects.
///
/// Cheap to clone; all clones share the same column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
}

impl FeatureSchema {
    /// Build a schema from an ordered column list.
    ///
    /// Column names must be non-empty and unique.
    pub fn new<I, S>(columns: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        let mut seen = HashSet::with_capacity(columns.len());
        for c in &columns {
            if c.trim().is_empty() {
                return Err(DomainError::invariant("feature column name must not be empty"));
            }
            if !seen.insert(c.as_str()) {
                return Err(DomainError::invariant(format!("duplicate feature column '{c}'")));
            }
        }

        Ok(Self {
            columns: columns.into(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }
}

/// A record shaped to a [`FeatureSchema`]: exactly its columns, in its order.
///
/// Only [`reconcile`] constructs these, so the shape invariant always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, Value)>,
}

impl FeatureRecord {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Value at a schema position.
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

}

// Serialized as a JSON object in schema order (serde_json's `Map` would sort keys).
impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Shape an arbitrary input object to `schema`.
pub fn reconcile(raw: &Map<String, Value>, schema: &FeatureSchema) -> FeatureRecord {
    let entries = schema
        .columns()
        .iter()
        .map(|column| {
            let value = raw
                .get(column)
                .cloned()
                .unwrap_or_else(|| Value::from(MISSING_FEATURE_DEFAULT));
            (column.clone(), value)
        })
        .collect();

    FeatureRecord { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn schema(cols: &[&str]) -> FeatureSchema {
        FeatureSchema::new(cols.iter().copied()).unwrap()
    }

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn missing_columns_default_to_zero() {
        let s = schema(&["age", "bmi", "smoker"]);
        let rec = reconcile(&object(json!({"age": 45})), &s);

        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({"age": 45, "bmi": 0, "smoker": 0})
        );
        assert_eq!(rec.names().collect::<Vec<_>>(), vec!["age", "bmi", "smoker"]);
    }

    #[test]
    fn output_follows_schema_order_not_input_order() {
        let s = schema(&["c", "a", "b"]);
        let rec = reconcile(&object(json!({"a": 1, "b": "x", "c": true, "z": 9})), &s);

        assert_eq!(rec.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
        assert_eq!(rec.value_at(0), Some(&json!(true)));
        assert_eq!(rec.get("b"), Some(&json!("x")));
        assert_eq!(rec.get("z"), None);
        assert_eq!(
            serde_json::to_string(&rec).unwrap(),
            r#"{"c":true,"a":1,"b":"x"}"#
        );
    }

    #[test]
    fn values_are_not_coerced() {
        let s = schema(&["hour"]);
        let rec = reconcile(&object(json!({"hour": "not-a-number"})), &s);
        assert_eq!(rec.get("hour"), Some(&json!("not-a-number")));

        let rec = reconcile(&object(json!({"hour": null})), &s);
        assert_eq!(rec.get("hour"), Some(&Value::Null));
    }

    #[test]
    fn empty_schema_yields_empty_record() {
        let s = schema(&[]);
        let rec = reconcile(&object(json!({"a": 1})), &s);
        assert!(rec.is_empty());
    }

    #[test]
    fn duplicate_or_blank_columns_are_rejected() {
        let err = FeatureSchema::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("'a'")));

        assert!(FeatureSchema::new(["a", "  "]).is_err());
    }

    proptest! {
        /// Property: every schema column is present, absent ones are 0, nothing else leaks in.
        #[test]
        fn reconciled_record_has_exactly_schema_columns(
            cols in prop::collection::hash_set("[a-z]{1,6}", 0..8),
            present in prop::collection::vec(any::<bool>(), 8),
            extras in prop::collection::hash_map("[A-Z]{1,6}", any::<i32>(), 0..5),
        ) {
            let cols: Vec<String> = cols.into_iter().collect();
            let s = FeatureSchema::new(cols.clone()).unwrap();

            let mut raw = Map::new();
            for (i, c) in cols.iter().enumerate() {
                if present[i] {
                    raw.insert(c.clone(), json!(i as i64 + 100));
                }
            }
            for (k, v) in &extras {
                raw.insert(k.clone(), json!(v));
            }

            let rec = reconcile(&raw, &s);

            prop_assert_eq!(rec.len(), cols.len());
            prop_assert_eq!(rec.names().collect::<Vec<_>>(), cols.iter().map(String::as_str).collect::<Vec<_>>());
            for (i, c) in cols.iter().enumerate() {
                let expected = if present[i] { json!(i as i64 + 100) } else { json!(0) };
                prop_assert_eq!(rec.get(c), Some(&expected));
            }
            for k in extras.keys() {
                prop_assert!(rec.get(k).is_none());
            }

            // Reconciling twice is stable.
            prop_assert_eq!(reconcile(&raw, &s), rec);
        }
    }
}
