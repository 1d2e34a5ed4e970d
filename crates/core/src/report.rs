//! Validation report model
//!
//! One `FieldResult` per (section, entity, key), in canonical
//! section -> entity -> position order, plus aggregate counts. Results
//! are immutable once produced; the report distinguishes "API had no
//! data" from "UI failed to render" from "values differ".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one field comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Match,
    Mismatch,
    /// API data absent for this field
    MissingExpected,
    /// UI element absent or lookup timed out
    MissingActual,
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldStatus::Match => "match",
            FieldStatus::Mismatch => "mismatch",
            FieldStatus::MissingExpected => "missing_expected",
            FieldStatus::MissingActual => "missing_actual",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of validating one field of one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldResult {
    pub section: String,
    pub entity_id: String,
    pub field_key: String,
    pub position: usize,
    pub expected_raw: Option<Value>,
    pub expected_formatted: Option<String>,
    pub actual: Option<String>,
    pub status: FieldStatus,
    /// Degradation detail (format failure, cyclic reference, retry
    /// exhaustion), when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Aggregate counts per status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing_expected: usize,
    pub missing_actual: usize,
}

/// Immutable record of every field's outcome for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub results: Vec<FieldResult>,
    pub summary: Summary,
    /// Configuration-level observations (e.g. empty entity set), not
    /// failures
    pub warnings: Vec<String>,
    /// Whether missing API data counts as a failure for this run
    pub missing_expected_fails: bool,
}

impl ValidationReport {
    pub(crate) fn new(
        results: Vec<FieldResult>,
        warnings: Vec<String>,
        missing_expected_fails: bool,
    ) -> Self {
        let mut summary = Summary {
            total: results.len(),
            ..Summary::default()
        };
        for result in &results {
            match result.status {
                FieldStatus::Match => summary.matched += 1,
                FieldStatus::Mismatch => summary.mismatched += 1,
                FieldStatus::MissingExpected => summary.missing_expected += 1,
                FieldStatus::MissingActual => summary.missing_actual += 1,
            }
        }
        Self {
            results,
            summary,
            warnings,
            missing_expected_fails,
        }
    }

    /// True iff nothing mismatched and nothing failed to render;
    /// missing API data fails only when the run's policy says so
    pub fn ok(&self) -> bool {
        self.summary.mismatched == 0
            && self.summary.missing_actual == 0
            && (!self.missing_expected_fails || self.summary.missing_expected == 0)
    }

    /// Every non-match, as (section, entity, key) triples
    pub fn failing(&self) -> Vec<(&str, &str, &str)> {
        self.results
            .iter()
            .filter(|r| r.status != FieldStatus::Match)
            .map(|r| (r.section.as_str(), r.entity_id.as_str(), r.field_key.as_str()))
            .collect()
    }

    /// Human-readable diff: one line per non-match plus the counts
    pub fn render(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            if result.status == FieldStatus::Match {
                continue;
            }
            let expected = result
                .expected_formatted
                .as_deref()
                .unwrap_or("<none>");
            let actual = result.actual.as_deref().unwrap_or("<none>");
            out.push_str(&format!(
                "{}.{}[{}]: expected={} actual={} ({})",
                result.section, result.field_key, result.entity_id, expected, actual, result.status
            ));
            if let Some(note) = &result.note {
                out.push_str(&format!(" [{}]", note));
            }
            out.push('\n');
        }
        for warning in &self.warnings {
            out.push_str(&format!("warning: {}\n", warning));
        }
        out.push_str(&format!(
            "{} checked: {} matched, {} mismatched, {} missing expected, {} missing actual\n",
            self.summary.total,
            self.summary.matched,
            self.summary.mismatched,
            self.summary.missing_expected,
            self.summary.missing_actual
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(status: FieldStatus) -> FieldResult {
        FieldResult {
            section: "basicInfo".into(),
            entity_id: "C123".into(),
            field_key: "status".into(),
            position: 2,
            expected_raw: Some(json!("active")),
            expected_formatted: Some("ACTIVE".into()),
            actual: Some("Inactive".into()),
            status,
            note: None,
        }
    }

    #[test]
    fn ok_requires_no_mismatch_or_missing_actual() {
        let report = ValidationReport::new(vec![result(FieldStatus::Match)], vec![], false);
        assert!(report.ok());

        let report = ValidationReport::new(vec![result(FieldStatus::Mismatch)], vec![], false);
        assert!(!report.ok());

        let report = ValidationReport::new(vec![result(FieldStatus::MissingActual)], vec![], false);
        assert!(!report.ok());
    }

    #[test]
    fn missing_expected_fails_only_under_policy() {
        let lenient =
            ValidationReport::new(vec![result(FieldStatus::MissingExpected)], vec![], false);
        assert!(lenient.ok());

        let strict =
            ValidationReport::new(vec![result(FieldStatus::MissingExpected)], vec![], true);
        assert!(!strict.ok());
    }

    #[test]
    fn render_lists_every_non_match() {
        let report = ValidationReport::new(
            vec![result(FieldStatus::Mismatch), result(FieldStatus::Match)],
            vec!["entity set is empty".into()],
            false,
        );
        let rendered = report.render();
        assert!(rendered.contains("basicInfo.status[C123]: expected=ACTIVE actual=Inactive (mismatch)"));
        assert!(rendered.contains("warning: entity set is empty"));
        assert!(rendered.contains("2 checked: 1 matched, 1 mismatched"));
    }

    #[test]
    fn summary_counts_per_status() {
        let report = ValidationReport::new(
            vec![
                result(FieldStatus::Match),
                result(FieldStatus::Mismatch),
                result(FieldStatus::MissingExpected),
                result(FieldStatus::MissingActual),
            ],
            vec![],
            false,
        );
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.mismatched, 1);
        assert_eq!(report.summary.missing_expected, 1);
        assert_eq!(report.summary.missing_actual, 1);
        assert_eq!(report.failing().len(), 3);
    }
}
