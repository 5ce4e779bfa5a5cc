//! Schema consolidation for OpenAPI-style documents.
//!
//! Inline schemas that carry a `title` and `properties` are moved into a
//! shared table (`components.schemas` by default) and replaced by `$ref`
//! pointers, so a shape defined in many places ends up defined once:
//!
//! - [`equal_schemas`]: structural comparison with an ignore list
//!   (`description` by default).
//! - [`SchemaRegistry`]: the growing name → schema table with
//!   deterministic collision suffixes (`Pet`, `Pet1`, `Pet2`, ...).
//! - [`consolidate`]: the depth-first walker that rewrites a scan region.
//! - [`consolidate_document`]: the whole-document entry point that seeds
//!   the registry from the existing table and writes the result back.
//!
//! Every run also yields a [`ConsolidationReport`] listing each replaced
//! location and the table name it now points at.
//!
//! # Example
//!
//! ```
//! use schema_consolidate_core::*;
//! use serde_json::json;
//!
//! let spec = json!({
//!     "paths": {
//!         "/pets": {"get": {"schema": {
//!             "title": "Pet",
//!             "properties": {"name": {"type": "string"}}
//!         }}}
//!     },
//!     "components": {"schemas": {
//!         "Pet": {"title": "Pet", "properties": {"id": {"type": "integer"}}}
//!     }}
//! });
//!
//! let result = consolidate_value(&spec).unwrap();
//!
//! // The existing `Pet` differs, so the inline one is stored as `Pet1`.
//! assert_eq!(
//!     result.document["paths"]["/pets"]["get"]["schema"],
//!     json!({"$ref": "#/components/schemas/Pet1"})
//! );
//! assert_eq!(result.report.names(), vec!["Pet1"]);
//! ```

mod compare;
mod document;
mod error;
pub mod node;
mod options;
mod registry;
mod report;
mod walker;

pub use compare::equal_schemas;
pub use document::{Consolidation, consolidate_document, consolidate_value};
pub use error::{ConsolidateError, Result};
pub use options::{ConsolidateOptions, DEFAULT_MAX_DEPTH};
pub use registry::{NameResolution, SchemaRegistry};
pub use report::{ConsolidationReport, ExtractionOutcome, ExtractionRecord};
pub use walker::consolidate;
