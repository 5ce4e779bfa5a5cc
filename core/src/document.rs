//! Whole-document consolidation.
//!
//! Copies the scan region and the existing table out of the document, runs
//! the walker, and writes both back. An empty table is pruned together with
//! every container on the table path that became empty, so a document
//! without titled schemas never gains a dangling `components: {}`.

use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ConsolidateError, Result};
use crate::node::pointer_from_segments;
use crate::options::ConsolidateOptions;
use crate::registry::SchemaRegistry;
use crate::report::ConsolidationReport;
use crate::walker::consolidate;

/// A rewritten document together with its report.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    /// The document with inline schemas replaced by references.
    pub document: Value,
    /// Every replacement made, in traversal order.
    pub report: ConsolidationReport,
}

/// Consolidates `document` with default options.
///
/// # Errors
///
/// See [`consolidate_document`].
pub fn consolidate_value(document: &Value) -> Result<Consolidation> {
    consolidate_document(document, &ConsolidateOptions::default())
}

/// Moves titled inline schemas of `document` into its schema table.
///
/// The input is left untouched; the result owns a fresh copy.
///
/// # Errors
///
/// Returns [`ConsolidateError::InvalidDocument`] if the root, a container on
/// the table path, or the table itself is present but not a mapping, and
/// [`ConsolidateError::DepthLimitExceeded`] from the walker.
///
/// # Examples
///
/// ```
/// use schema_consolidate_core::{ConsolidateOptions, consolidate_document};
/// use serde_json::json;
///
/// let spec = json!({
///     "openapi": "3.0.0",
///     "paths": {"/": {"get": {"responses": {"200": {"content": {"application/json": {
///         "schema": {"title": "Pet", "properties": {"name": {"type": "string"}}}
///     }}}}}}}
/// });
///
/// let result = consolidate_document(&spec, &ConsolidateOptions::default()).unwrap();
/// let doc = result.document;
///
/// assert_eq!(
///     doc["paths"]["/"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
///     json!({"$ref": "#/components/schemas/Pet"})
/// );
/// assert_eq!(
///     doc["components"]["schemas"]["Pet"],
///     json!({"title": "Pet", "properties": {"name": {"type": "string"}}})
/// );
/// ```
pub fn consolidate_document(
    document: &Value,
    options: &ConsolidateOptions,
) -> Result<Consolidation> {
    if options.table_path.is_empty() {
        return Err(ConsolidateError::InvalidDocument(
            "table path cannot be empty".to_string(),
        ));
    }
    let mut output = document.clone();
    if !output.is_object() {
        return Err(not_a_mapping(&[]));
    }

    let seed = take_table(&mut output, &options.table_path)?;
    let mut registry = SchemaRegistry::new(seed, options.ignore_keys.clone());

    let report = match lookup_mut(&mut output, &options.scan_path) {
        Some(scan_root) => consolidate(scan_root, &mut registry, options, &options.scan_path)?,
        None => ConsolidationReport::default(),
    };

    put_table(&mut output, &options.table_path, registry.into_table())?;

    info!(
        replaced = report.len(),
        registered = report.registered_count(),
        reused = report.reused_count(),
        "consolidated schemas"
    );

    Ok(Consolidation {
        document: output,
        report,
    })
}

fn lookup_mut<'a>(root: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter()
        .try_fold(root, |node, segment| node.as_object_mut()?.get_mut(segment))
}

/// Detaches the table from the document, leaving an empty mapping in place.
fn take_table(root: &mut Value, path: &[String]) -> Result<Map<String, Value>> {
    let mut node = root;
    for (depth, segment) in path.iter().enumerate() {
        let map = node.as_object_mut().ok_or_else(|| not_a_mapping(&path[..depth]))?;
        match map.get_mut(segment) {
            Some(child) => node = child,
            None => return Ok(Map::new()),
        }
    }
    match node {
        Value::Object(table) => Ok(std::mem::take(table)),
        _ => Err(not_a_mapping(path)),
    }
}

/// Writes the table back, creating containers on demand and pruning any
/// that end up empty.
fn put_table(root: &mut Value, path: &[String], table: Map<String, Value>) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };

    if table.is_empty() {
        prune_empty(root, path);
        return Ok(());
    }

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        let map = node.as_object_mut().ok_or_else(|| not_a_mapping(&path[..depth]))?;
        node = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let map = node.as_object_mut().ok_or_else(|| not_a_mapping(parents))?;
    map.insert(last.clone(), Value::Object(table));
    Ok(())
}

/// Removes the empty mapping at `path`, then each ancestor left empty.
///
/// Missing levels are skipped, so an empty ancestor is pruned even when the
/// table below it never existed.
fn prune_empty(root: &mut Value, path: &[String]) {
    for len in (1..=path.len()).rev() {
        let (parents, last) = (&path[..len - 1], &path[len - 1]);
        let Some(Value::Object(parent)) = lookup_mut(root, parents) else {
            continue;
        };
        match parent.get(last) {
            None => continue,
            Some(Value::Object(child)) if child.is_empty() => {
                parent.shift_remove(last);
            }
            Some(_) => return,
        }
    }
}

fn not_a_mapping(path: &[String]) -> ConsolidateError {
    let location = if path.is_empty() {
        "document root".to_string()
    } else {
        pointer_from_segments(path)
    };
    ConsolidateError::InvalidDocument(format!("{location} must be an object"))
}
