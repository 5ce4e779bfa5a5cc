//! Per-run record of what the walker rewrote.
//!
//! Every inline schema replaced by a reference produces one
//! [`ExtractionRecord`]. The report is serializable so callers can keep an
//! audit trail next to the rewritten document.

use serde::{Deserialize, Serialize};

/// What happened to the table when a schema was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// The body was stored under a new table name.
    Registered,
    /// An equal body was already stored; its name was reused.
    Reused,
}

/// One inline schema that was replaced by a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// JSON Pointer of the original location, relative to the document root.
    pub pointer: String,
    /// Title the schema carried.
    pub title: String,
    /// Table name the reference points to.
    pub name: String,
    /// Whether the table gained an entry.
    pub outcome: ExtractionOutcome,
}

impl ExtractionRecord {
    /// Returns `true` if a collision forced a suffixed name.
    pub fn renamed(&self) -> bool {
        self.name != self.title
    }
}

/// Summary of one consolidation run.
///
/// # Examples
///
/// ```
/// use schema_consolidate_core::consolidate_value;
/// use serde_json::json;
///
/// let spec = json!({
///     "paths": {
///         "/a": {"schema": {"title": "Pet", "properties": {"id": {"type": "integer"}}}},
///         "/b": {"schema": {"title": "Pet", "properties": {"id": {"type": "integer"}}}}
///     }
/// });
///
/// let result = consolidate_value(&spec).unwrap();
/// assert_eq!(result.report.registered_count(), 1);
/// assert_eq!(result.report.reused_count(), 1);
/// assert_eq!(result.report.names(), vec!["Pet"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationReport {
    /// Replacements in traversal order.
    pub records: Vec<ExtractionRecord>,
}

impl ConsolidationReport {
    /// Returns `true` if nothing was replaced.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of replaced inline schemas.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Records that added a table entry.
    pub fn registered(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == ExtractionOutcome::Registered)
    }

    /// Records that pointed at an existing table entry.
    pub fn reused(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome == ExtractionOutcome::Reused)
    }

    /// Records whose name differs from their title.
    pub fn renamed(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records.iter().filter(|r| r.renamed())
    }

    /// Number of new table entries.
    pub fn registered_count(&self) -> usize {
        self.registered().count()
    }

    /// Number of references to pre-existing or earlier entries.
    pub fn reused_count(&self) -> usize {
        self.reused().count()
    }

    /// Names of new table entries in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.registered().map(|r| r.name.as_str()).collect()
    }

    pub(crate) fn push(&mut self, record: ExtractionRecord) {
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, name: &str, outcome: ExtractionOutcome) -> ExtractionRecord {
        ExtractionRecord {
            pointer: format!("/paths/{title}"),
            title: title.to_string(),
            name: name.to_string(),
            outcome,
        }
    }

    #[test]
    fn test_counts_and_renames() {
        let mut report = ConsolidationReport::default();
        report.push(record("Pet", "Pet", ExtractionOutcome::Registered));
        report.push(record("Pet", "Pet1", ExtractionOutcome::Registered));
        report.push(record("Pet", "Pet", ExtractionOutcome::Reused));

        assert_eq!(report.len(), 3);
        assert_eq!(report.registered_count(), 2);
        assert_eq!(report.reused_count(), 1);
        assert_eq!(report.names(), vec!["Pet", "Pet1"]);
        let renamed: Vec<_> = report.renamed().map(|r| r.name.as_str()).collect();
        assert_eq!(renamed, vec!["Pet1"]);
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_value(record("Pet", "Pet", ExtractionOutcome::Reused)).unwrap();
        assert_eq!(json["outcome"], "reused");
        assert_eq!(json["pointer"], "/paths/Pet");
    }
}
