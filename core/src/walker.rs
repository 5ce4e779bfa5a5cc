//! Depth-first tree walker that moves titled schemas into the table.
//!
//! For every child of a container the walker runs three steps:
//!
//! 1. **Pre-order fix-up**: a titled schema whose `items` is an untitled
//!    schema body gives that body the title `<title><suffix>`
//!    (`MyArray.Items` by default) so it becomes extractable.
//! 2. **Descend** into the child.
//! 3. **Post-order extraction**: a schema body with a title and properties
//!    is resolved through the [`SchemaRegistry`], registered when new, and
//!    replaced in its parent slot by a reference.
//!
//! References and scalars are opaque. Because children are rewritten before
//! their parent is examined, a stored body refers to its own nested titled
//! schemas by reference too, and running the walker again over its own
//! output changes nothing.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{ConsolidateError, Result};
use crate::node::{
    ITEMS_KEY, REF_KEY, TITLE_KEY, is_extractable, is_reference, is_truthy,
    pointer_from_segments, reference_to, schema_title,
};
use crate::options::ConsolidateOptions;
use crate::registry::{NameResolution, SchemaRegistry};
use crate::report::{ConsolidationReport, ExtractionOutcome, ExtractionRecord};

/// Rewrites `scan_root` in place and fills `registry`.
///
/// `scan_root` is treated as a container: its descendants are candidates,
/// the root itself is never replaced. `base_path` holds the key path of the
/// scan root inside the whole document and is only used for the pointers
/// in the returned report.
///
/// # Errors
///
/// Returns [`ConsolidateError::DepthLimitExceeded`] when nesting goes past
/// `options.max_depth`, and [`ConsolidateError::NameConflict`] only if the
/// registry was mutated behind the walker's back.
///
/// # Examples
///
/// ```
/// use schema_consolidate_core::{ConsolidateOptions, SchemaRegistry, consolidate};
/// use serde_json::{Map, json};
///
/// let options = ConsolidateOptions::default();
/// let mut registry = SchemaRegistry::new(Map::new(), options.ignore_keys.clone());
/// let mut paths = json!({
///     "/pets": {"get": {"schema": {"title": "Pet", "properties": {"id": {}}}}}
/// });
///
/// let report = consolidate(&mut paths, &mut registry, &options, &["paths"]).unwrap();
///
/// assert_eq!(paths["/pets"]["get"]["schema"], json!({"$ref": "#/components/schemas/Pet"}));
/// assert!(registry.contains("Pet"));
/// assert_eq!(report.records[0].pointer, "/paths/~1pets/get/schema");
/// ```
pub fn consolidate<S: AsRef<str>>(
    scan_root: &mut Value,
    registry: &mut SchemaRegistry,
    options: &ConsolidateOptions,
    base_path: &[S],
) -> Result<ConsolidationReport> {
    let mut walker = Walker {
        registry,
        options,
        reference_prefix: options.reference_prefix(),
        path: base_path.iter().map(|s| s.as_ref().to_string()).collect(),
        report: ConsolidationReport::default(),
    };
    walker.walk_children(scan_root, 0)?;
    Ok(walker.report)
}

struct Walker<'a> {
    registry: &'a mut SchemaRegistry,
    options: &'a ConsolidateOptions,
    reference_prefix: String,
    path: Vec<String>,
    report: ConsolidationReport,
}

impl Walker<'_> {
    fn walk_children(&mut self, node: &mut Value, depth: usize) -> Result<()> {
        match node {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    self.path.push(key.clone());
                    let result = self.visit(child, depth + 1);
                    self.path.pop();
                    result?;
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter_mut().enumerate() {
                    self.path.push(index.to_string());
                    let result = self.visit(child, depth + 1);
                    self.path.pop();
                    result?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn visit(&mut self, node: &mut Value, depth: usize) -> Result<()> {
        if is_reference(node) || !matches!(node, Value::Object(_) | Value::Array(_)) {
            return Ok(());
        }
        if depth > self.options.max_depth {
            return Err(ConsolidateError::DepthLimitExceeded {
                pointer: pointer_from_segments(&self.path),
                limit: self.options.max_depth,
            });
        }

        self.name_array_items(node);
        self.walk_children(node, depth)?;
        self.extract(node)
    }

    fn name_array_items(&self, node: &mut Value) {
        let Some(title) = schema_title(node).map(str::to_owned) else {
            return;
        };
        let Some(Value::Object(fields)) = node.get_mut(ITEMS_KEY) else {
            return;
        };
        if fields.contains_key(REF_KEY) || fields.get(TITLE_KEY).is_some_and(is_truthy) {
            return;
        }

        let synthesized = format!("{title}{}", self.options.items_title_suffix);
        trace!(title = %synthesized, "naming untitled array items");

        // Existing fields win, so the title goes in first.
        let mut named = Map::with_capacity(fields.len() + 1);
        named.insert(TITLE_KEY.to_string(), Value::String(synthesized));
        named.extend(std::mem::take(fields));
        *fields = named;
    }

    fn extract(&mut self, node: &mut Value) -> Result<()> {
        if !is_extractable(node) {
            return Ok(());
        }
        let Some(title) = schema_title(node).map(str::to_owned) else {
            return Ok(());
        };

        let resolution = self.registry.resolve(&title, node);
        let outcome = match &resolution {
            NameResolution::Vacant(name) => {
                self.registry.register(name.clone(), std::mem::take(node))?;
                ExtractionOutcome::Registered
            }
            NameResolution::Existing(_) => ExtractionOutcome::Reused,
        };
        let name = resolution.into_name();
        let pointer = pointer_from_segments(&self.path);

        debug!(%pointer, %name, ?outcome, "replaced inline schema with reference");
        *node = reference_to(format!("{}{name}", self.reference_prefix));
        self.report.push(ExtractionRecord {
            pointer,
            title,
            name,
            outcome,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn run(scan: &mut Value, seed: Value) -> (ConsolidationReport, Map<String, Value>) {
        let options = ConsolidateOptions::default();
        let seed = match seed {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut registry = SchemaRegistry::new(seed, options.ignore_keys.clone());
        let report = consolidate(scan, &mut registry, &options, &["paths"]).unwrap();
        (report, registry.into_table())
    }

    #[test]
    fn test_extracts_titled_schema_with_properties() {
        let mut scan = json!({
            "/": {"get": {"responses": {"200": {"content": {"application/json": {
                "schema": {"title": "Pet", "properties": {"name": {"type": "string"}}}
            }}}}}}
        });
        let (report, table) = run(&mut scan, json!({}));

        assert_eq!(
            scan["/"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/Pet"})
        );
        assert_eq!(
            table["Pet"],
            json!({"title": "Pet", "properties": {"name": {"type": "string"}}})
        );
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.records[0].pointer,
            "/paths/~1/get/responses/200/content/application~1json/schema"
        );
    }

    #[test]
    fn test_untitled_and_propertyless_schemas_are_untouched() {
        let mut scan = json!({
            "a": {"schema": {"properties": {"id": {"type": "integer"}}}},
            "b": {"schema": {"title": "Id", "type": "integer"}}
        });
        let before = scan.clone();
        let (report, table) = run(&mut scan, json!({}));

        assert_eq!(scan, before);
        assert!(report.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_nested_titled_schemas_are_extracted_inside_out() {
        let mut scan = json!({
            "op": {"schema": {
                "title": "Owner",
                "properties": {
                    "pet": {"title": "Pet", "properties": {"name": {"type": "string"}}}
                }
            }}
        });
        let (report, table) = run(&mut scan, json!({}));

        assert_eq!(scan["op"]["schema"], json!({"$ref": "#/components/schemas/Owner"}));
        assert_eq!(
            table["Owner"]["properties"]["pet"],
            json!({"$ref": "#/components/schemas/Pet"})
        );
        assert!(table.contains_key("Pet"));
        assert_eq!(report.names(), vec!["Pet", "Owner"]);
    }

    #[test]
    fn test_same_title_different_bodies_get_suffixed_names() {
        let mut scan = json!({
            "a": {"schema": {"title": "Pet", "properties": {"name": {"type": "string"}}}},
            "b": {"schema": {"title": "Pet", "properties": {"age": {"type": "integer"}}}},
            "c": {"schema": {"title": "Pet", "properties": {"name": {"type": "string"}}}}
        });
        let (report, table) = run(&mut scan, json!({}));

        assert_eq!(scan["a"]["schema"]["$ref"], "#/components/schemas/Pet");
        assert_eq!(scan["b"]["schema"]["$ref"], "#/components/schemas/Pet1");
        assert_eq!(scan["c"]["schema"]["$ref"], "#/components/schemas/Pet");
        assert_eq!(table.len(), 2);
        assert_eq!(report.registered_count(), 2);
        assert_eq!(report.reused_count(), 1);
    }

    #[test]
    fn test_array_items_receive_synthesized_title() {
        let mut scan = json!({
            "op": {"schema": {
                "title": "MyArray",
                "type": "array",
                "items": {"properties": {"test": {"type": "string"}}}
            }}
        });
        let (_, table) = run(&mut scan, json!({}));

        assert_eq!(
            scan["op"]["schema"],
            json!({
                "title": "MyArray",
                "type": "array",
                "items": {"$ref": "#/components/schemas/MyArray.Items"}
            })
        );
        assert_eq!(
            table["MyArray.Items"],
            json!({"title": "MyArray.Items", "properties": {"test": {"type": "string"}}})
        );
        let keys: Vec<_> = table["MyArray.Items"].as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "title");
    }

    #[test]
    fn test_titled_items_and_tuple_items_are_left_alone() {
        let mut scan = json!({
            "a": {"title": "List", "items": {"title": "Entry", "type": "string"}},
            "b": {"title": "Pair", "items": [{"type": "string"}, {"type": "integer"}]}
        });
        let before = scan.clone();
        run(&mut scan, json!({}));
        assert_eq!(scan, before);
    }

    #[test]
    fn test_references_are_opaque() {
        let mut scan = json!({
            "op": {"schema": {
                "$ref": "#/components/schemas/Pet",
                "title": "Pet",
                "properties": {"inner": {"title": "Inner", "properties": {}}}
            }}
        });
        let before = scan.clone();
        let (report, _) = run(&mut scan, json!({}));
        assert!(report.is_empty());
        assert_eq!(scan, before);
    }

    #[test]
    fn test_sequence_elements_are_walked() {
        let mut scan = json!({
            "op": {"schema": {"oneOf": [
                {"title": "Cat", "properties": {"meow": {"type": "boolean"}}},
                {"type": "null"}
            ]}}
        });
        let (report, _) = run(&mut scan, json!({}));
        assert_eq!(scan["op"]["schema"]["oneOf"][0]["$ref"], "#/components/schemas/Cat");
        assert_eq!(report.records[0].pointer, "/paths/op/schema/oneOf/0");
    }

    #[test]
    fn test_collision_with_seed_entry() {
        let mut scan = json!({
            "op": {"schema": {"title": "Pet", "properties": {"test": {"type": "string"}}}}
        });
        let seed = json!({"Pet": {"title": "Other", "properties": {"testDiff": {"type": "string"}}}});
        let (report, table) = run(&mut scan, seed);

        assert_eq!(scan["op"]["schema"]["$ref"], "#/components/schemas/Pet1");
        assert_eq!(table["Pet"]["title"], "Other");
        assert!(report.records[0].renamed());
    }

    #[test]
    fn test_depth_limit_fails_fast() {
        let options = ConsolidateOptions {
            max_depth: 2,
            ..ConsolidateOptions::default()
        };
        let mut registry = SchemaRegistry::new(Map::new(), Vec::new());
        let mut scan = json!({"a": {"b": {"c": {}}}});
        let err = consolidate(&mut scan, &mut registry, &options, &["paths"]).unwrap_err();
        match err {
            ConsolidateError::DepthLimitExceeded { pointer, limit } => {
                assert_eq!(pointer, "/paths/a/b/c");
                assert_eq!(limit, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
