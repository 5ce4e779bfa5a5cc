//! Structural comparison of schema bodies.
//!
//! Two bodies are equal when every field outside the ignore list matches
//! recursively. Mapping key order never matters; sequence order always does.
//! Numbers compare by value, so `1` and `1.0` are the same.
//! The ignore list applies to the fields of each compared schema body at any
//! depth, never to the entry names of keyword maps such as `properties`, so
//! a property literally called `description` still has to match.
//!
//! # Examples
//!
//! ```
//! use schema_consolidate_core::equal_schemas;
//! use serde_json::json;
//!
//! let a = json!({
//!     "title": "Pet",
//!     "description": "A pet",
//!     "properties": {"name": {"type": "string", "description": "Pet name"}}
//! });
//! let b = json!({
//!     "properties": {"name": {"type": "string"}},
//!     "title": "Pet"
//! });
//!
//! assert!(equal_schemas(&a, &b, &["description"]));
//! assert!(!equal_schemas::<&str>(&a, &b, &[]));
//! ```

use serde_json::{Map, Number, Value};

/// Keywords whose value maps entry names to subschemas.
const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependentSchemas",
];

/// Keywords whose value is instance data rather than a schema.
const LITERAL_KEYWORDS: &[&str] = &["enum", "const", "default", "example", "examples"];

/// Returns `true` if `a` and `b` are structurally equal, skipping
/// `ignore_keys` on every compared schema body.
pub fn equal_schemas<S: AsRef<str>>(a: &Value, b: &Value, ignore_keys: &[S]) -> bool {
    let comparator = Comparator { ignore_keys };
    comparator.schema_eq(a, b)
}

struct Comparator<'a, S> {
    ignore_keys: &'a [S],
}

impl<S: AsRef<str>> Comparator<'_, S> {
    fn is_ignored(&self, key: &str) -> bool {
        self.ignore_keys.iter().any(|k| k.as_ref() == key)
    }

    fn schema_eq(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Object(left), Value::Object(right)) => self.body_eq(left, right),
            (Value::Array(left), Value::Array(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| self.schema_eq(l, r))
            }
            _ => literal_eq(a, b),
        }
    }

    fn body_eq(&self, left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
        let compared =
            |map: &Map<String, Value>| map.keys().filter(|key| !self.is_ignored(key)).count();
        if compared(left) != compared(right) {
            return false;
        }

        left.iter()
            .filter(|(key, _)| !self.is_ignored(key))
            .all(|(key, value)| match right.get(key) {
                Some(other) => self.field_eq(key, value, other),
                None => false,
            })
    }

    fn field_eq(&self, key: &str, a: &Value, b: &Value) -> bool {
        if LITERAL_KEYWORDS.contains(&key) {
            return literal_eq(a, b);
        }
        if SCHEMA_MAP_KEYWORDS.contains(&key) {
            return match (a, b) {
                (Value::Object(left), Value::Object(right)) => self.schema_map_eq(left, right),
                _ => self.schema_eq(a, b),
            };
        }
        self.schema_eq(a, b)
    }

    fn schema_map_eq(&self, left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
        left.len() == right.len()
            && left.iter().all(|(name, schema)| {
                right
                    .get(name)
                    .is_some_and(|other| self.schema_eq(schema, other))
            })
    }
}

/// Plain JSON equality, except that numbers compare by value.
fn literal_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(left), Value::Number(right)) => number_eq(left, right),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| literal_eq(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, value)| right.get(key).is_some_and(|other| literal_eq(value, other)))
        }
        _ => a == b,
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(left), Some(right)) = (a.as_i64(), b.as_i64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (a.as_u64(), b.as_u64()) {
        return left == right;
    }
    a.as_f64() == b.as_f64()
}
