//! Per-section, per-entity field comparison
//!
//! Walks a section's keys in position order. Every field yields exactly
//! one `FieldResult`; nothing aborts the walk:
//! - absent or unresolvable expected data -> `missing_expected`
//! - cyclic reference or format failure -> `mismatch` with a note
//! - element absent or lookup timed out -> `missing_actual`
//!
//! Comparison always uses the field's format semantics (numeric, date
//! instant, or string), never naive string equality except under the
//! default format.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::LocatorAdapter;
use crate::error::ResolveError;
use crate::format;
use crate::report::{FieldResult, FieldStatus};
use crate::resolver::Resolver;
use crate::schema::{ExpectedData, Section};

/// Lookup policy: how long one adapter call may take and how many times
/// a timed-out lookup is retried. A returned "not found" is data and is
/// never retried.
#[derive(Debug, Clone, Copy)]
pub struct LookupPolicy {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retries: 2,
        }
    }
}

pub struct Comparator<'a> {
    pub resolver: &'a Resolver,
    pub adapter: &'a dyn LocatorAdapter,
    pub lookup: LookupPolicy,
}

enum Lookup {
    Found(String),
    Absent,
    TimedOut(u32),
}

impl<'a> Comparator<'a> {
    /// Validate one (section, entity) pair, yielding one result per key
    /// in position order
    pub async fn compare_section(
        &self,
        section: &Section,
        entity_id: &str,
        entity_index: usize,
        expected: &ExpectedData,
    ) -> Vec<FieldResult> {
        let mut results = Vec::with_capacity(section.keys.len());
        for (position, key) in section.keys.iter().enumerate() {
            results.push(
                self.compare_field(section, entity_id, entity_index, key, position, expected)
                    .await,
            );
        }
        results
    }

    async fn compare_field(
        &self,
        section: &Section,
        entity_id: &str,
        entity_index: usize,
        key: &str,
        position: usize,
        expected: &ExpectedData,
    ) -> FieldResult {
        let base = |status: FieldStatus, raw: Option<Value>, formatted: Option<String>, actual: Option<String>, note: Option<String>| FieldResult {
            section: section.name.clone(),
            entity_id: entity_id.to_string(),
            field_key: key.to_string(),
            position,
            expected_raw: raw,
            expected_formatted: formatted,
            actual,
            status,
            note,
        };

        // 1. Expected raw value
        let Some(raw) = expected.get(entity_id, &section.name, key) else {
            debug!(section = %section.name, entity = entity_id, key, "no expected data");
            return base(FieldStatus::MissingExpected, None, None, None, None);
        };

        // 2. Resolve indirect references
        let resolved = match self.resolver.resolve(raw) {
            Ok(v) => v,
            Err(e @ ResolveError::MissingReference { .. }) => {
                return base(
                    FieldStatus::MissingExpected,
                    Some(raw.clone()),
                    None,
                    None,
                    Some(e.to_string()),
                );
            }
            Err(e @ ResolveError::CyclicReference { .. }) => {
                warn!(section = %section.name, key, "cyclic reference");
                return base(
                    FieldStatus::Mismatch,
                    Some(raw.clone()),
                    None,
                    None,
                    Some(e.to_string()),
                );
            }
        };

        // 3. Format the expected side
        let chain = section.chain_for(key);
        let formatted = match format::apply(&resolved, &chain) {
            Ok(v) => v,
            Err(e) => {
                return base(
                    FieldStatus::Mismatch,
                    Some(resolved),
                    None,
                    None,
                    Some(format!("format error: {e}")),
                );
            }
        };

        // 4. Rendered value from the locator adapter
        let actual = match self.lookup(&section.name, position, entity_index).await {
            Lookup::Found(text) => text,
            Lookup::Absent => {
                return base(
                    FieldStatus::MissingActual,
                    Some(resolved),
                    Some(formatted.to_string()),
                    None,
                    None,
                );
            }
            Lookup::TimedOut(attempts) => {
                return base(
                    FieldStatus::MissingActual,
                    Some(resolved),
                    Some(formatted.to_string()),
                    None,
                    Some(format!("lookup timed out after {attempts} attempt(s)")),
                );
            }
        };

        // 5. Compare under the chain's semantics
        match format::compare(&formatted, &actual, &chain) {
            Ok(true) => base(
                FieldStatus::Match,
                Some(resolved),
                Some(formatted.to_string()),
                Some(actual),
                None,
            ),
            Ok(false) => base(
                FieldStatus::Mismatch,
                Some(resolved),
                Some(formatted.to_string()),
                Some(actual),
                None,
            ),
            Err(e) => base(
                FieldStatus::Mismatch,
                Some(resolved),
                Some(formatted.to_string()),
                Some(actual),
                Some(format!("rendered value unparsable: {e}")),
            ),
        }
    }

    /// One adapter lookup under the policy: only timeouts are retried,
    /// a clean "not found" is final
    async fn lookup(&self, section: &str, position: usize, entity_index: usize) -> Lookup {
        let attempts = self.lookup.retries + 1;
        for attempt in 1..=attempts {
            match tokio::time::timeout(
                self.lookup.timeout,
                self.adapter.field_text(section, position, entity_index),
            )
            .await
            {
                Ok(Some(text)) => return Lookup::Found(text),
                Ok(None) => return Lookup::Absent,
                Err(_) => {
                    debug!(section, position, entity_index, attempt, "lookup timed out");
                }
            }
        }
        Lookup::TimedOut(attempts)
    }
}
