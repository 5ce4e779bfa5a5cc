//! Name registry for the shared schema table.
//!
//! The registry owns the table for the duration of one run. It starts from
//! whatever table the document already had and only ever grows. Collisions
//! are resolved by probing `candidate`, `candidate1`, `candidate2`, ... until
//! a vacant name or a structurally equal occupant turns up.
//!
//! # Examples
//!
//! ```
//! use schema_consolidate_core::{NameResolution, SchemaRegistry};
//! use serde_json::{Map, json};
//!
//! let mut seed = Map::new();
//! seed.insert("Pet".into(), json!({"title": "Pet", "properties": {"id": {}}}));
//! let mut registry = SchemaRegistry::new(seed, vec!["description".into()]);
//!
//! let other = json!({"title": "Pet", "properties": {"name": {}}});
//! assert_eq!(registry.resolve("Pet", &other), NameResolution::Vacant("Pet1".into()));
//!
//! registry.register("Pet1", other.clone()).unwrap();
//! assert_eq!(registry.resolve("Pet", &other), NameResolution::Existing("Pet1".into()));
//! ```

use serde_json::{Map, Value};
use tracing::trace;

use crate::compare::equal_schemas;
use crate::error::{ConsolidateError, Result};

/// Outcome of resolving a candidate name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    /// No entry uses this name yet; the caller should register the body.
    Vacant(String),
    /// An equal body is already stored under this name.
    Existing(String),
}

impl NameResolution {
    /// Returns the resolved table name.
    pub fn name(&self) -> &str {
        match self {
            Self::Vacant(name) | Self::Existing(name) => name,
        }
    }

    /// Consumes the resolution and returns the table name.
    pub fn into_name(self) -> String {
        match self {
            Self::Vacant(name) | Self::Existing(name) => name,
        }
    }
}

/// Growing table of name to schema body.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: Map<String, Value>,
    ignore_keys: Vec<String>,
}

impl SchemaRegistry {
    /// Creates a registry seeded with an existing table.
    pub fn new(seed: Map<String, Value>, ignore_keys: Vec<String>) -> Self {
        Self {
            entries: seed,
            ignore_keys,
        }
    }

    /// Finds the name `body` should be referenced by.
    ///
    /// Nothing is registered here; a [`NameResolution::Vacant`] result must
    /// be followed by [`register`](Self::register) when the body is new.
    pub fn resolve(&self, candidate: &str, body: &Value) -> NameResolution {
        let mut name = candidate.to_string();
        let mut suffix = 1usize;
        loop {
            match self.entries.get(&name) {
                None => return NameResolution::Vacant(name),
                Some(occupant) if equal_schemas(occupant, body, &self.ignore_keys) => {
                    return NameResolution::Existing(name);
                }
                Some(_) => {
                    trace!(name = %name, "name taken by a different schema");
                    name = format!("{candidate}{suffix}");
                    suffix += 1;
                }
            }
        }
    }

    /// Same as [`resolve`](Self::resolve), returning only the name.
    pub fn resolve_name(&self, candidate: &str, body: &Value) -> String {
        self.resolve(candidate, body).into_name()
    }

    /// Stores `body` under `name`.
    ///
    /// Returns `Ok(true)` when a new entry was added and `Ok(false)` when an
    /// equal body was already stored under that name.
    ///
    /// # Errors
    ///
    /// Returns [`ConsolidateError::NameConflict`] if `name` is bound to a
    /// structurally different body.
    pub fn register(&mut self, name: impl Into<String>, body: Value) -> Result<bool> {
        let name = name.into();
        match self.entries.get(&name) {
            Some(occupant) if equal_schemas(occupant, &body, &self.ignore_keys) => Ok(false),
            Some(_) => Err(ConsolidateError::NameConflict(name)),
            None => {
                self.entries.insert(name, body);
                Ok(true)
            }
        }
    }

    /// Returns the body stored under `name`.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is taken.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of stored entries, seed included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, body)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Keys skipped during comparison.
    pub fn ignore_keys(&self) -> &[String] {
        &self.ignore_keys
    }

    /// Returns the finished table.
    pub fn into_table(self) -> Map<String, Value> {
        self.entries
    }
}
