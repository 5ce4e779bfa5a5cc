//! Node classification over untyped JSON trees.
//!
//! A node is never tagged with a type. It is classified by which keys it
//! carries:
//!
//! - a **reference** is a mapping holding `$ref`;
//! - a **schema body** is any other mapping;
//! - an **extractable** schema body also carries a non-empty string `title`
//!   and a truthy `properties` value.
//!
//! Scalars and sequences are none of these.
//!
//! # Examples
//!
//! ```
//! use schema_consolidate_core::node::{is_extractable, is_reference, is_schema_body};
//! use serde_json::json;
//!
//! let reference = json!({"$ref": "#/components/schemas/Pet"});
//! assert!(is_reference(&reference));
//! assert!(!is_schema_body(&reference));
//!
//! let pet = json!({"title": "Pet", "properties": {"name": {"type": "string"}}});
//! assert!(is_extractable(&pet));
//!
//! let untitled = json!({"properties": {"name": {"type": "string"}}});
//! assert!(!is_extractable(&untitled));
//! ```

use serde_json::Value;

/// Key holding a reference pointer.
pub const REF_KEY: &str = "$ref";
/// Key naming a schema body.
pub const TITLE_KEY: &str = "title";
/// Key holding the property schemas of an object schema.
pub const PROPERTIES_KEY: &str = "properties";
/// Key holding the element schema of an array schema.
pub const ITEMS_KEY: &str = "items";

/// Returns `true` if `node` is a mapping containing `$ref`.
pub fn is_reference(node: &Value) -> bool {
    node.as_object().is_some_and(|map| map.contains_key(REF_KEY))
}

/// Returns `true` if `node` is a mapping that is not a reference.
pub fn is_schema_body(node: &Value) -> bool {
    node.as_object().is_some_and(|map| !map.contains_key(REF_KEY))
}

/// Returns the non-empty string `title` of a schema body.
pub fn schema_title(node: &Value) -> Option<&str> {
    if !is_schema_body(node) {
        return None;
    }
    node.get(TITLE_KEY)
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
}

/// Returns `true` if `node` is a titled schema body with properties.
pub fn is_extractable(node: &Value) -> bool {
    schema_title(node).is_some() && node.get(PROPERTIES_KEY).is_some_and(is_truthy)
}

/// Builds a reference node pointing at `target`.
pub fn reference_to(target: String) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(REF_KEY.to_string(), Value::String(target));
    Value::Object(map)
}

/// Loose presence test: `null`, `false`, `0` and `""` count as absent.
///
/// Documents written by hand often carry placeholder values such as
/// `"items": null`; those never trigger a rewrite.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Escapes one JSON Pointer segment (RFC 6901).
pub fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Joins segments into a JSON Pointer (`""` for the root).
pub fn pointer_from_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let mut pointer = String::new();
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&escape_pointer_segment(segment.as_ref()));
    }
    pointer
}
