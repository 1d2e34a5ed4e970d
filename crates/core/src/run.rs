//! Validation run orchestration
//!
//! Iterates sections in config order and entities in entity-set order,
//! invoking the comparator for every pair and collecting all results
//! into one report. The traversal never short-circuits: one entity's
//! missing data must not hide the others.
//!
//! Entities within a section may be validated concurrently under a
//! bounded window; `buffered` keeps completion reassembly in the
//! canonical section -> entity -> position order, so concurrency changes
//! latency only, never the emitted ordering. The run holds no locks
//! across await points and owns no external resources, making it safe
//! to cancel between entities.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapter::LocatorAdapter;
use crate::compare::{Comparator, LookupPolicy};
use crate::report::{FieldResult, ValidationReport};
use crate::resolver::Resolver;
use crate::schema::{EntitySet, ExpectedData, ValidationConfig};

/// Caller-supplied run policy
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Whether missing API data fails the run, or is an accepted
    /// "N/A" display outcome
    pub missing_expected_fails: bool,
    /// Bound on concurrently validated entities per section
    pub max_concurrent_entities: usize,
    /// Budget for one adapter lookup
    pub lookup_timeout: Duration,
    /// Timed-out lookups retried this many times before degrading to
    /// missing_actual; comparison outcomes are never retried
    pub lookup_retries: u32,
    /// Checked between entities; a cancelled run returns the results
    /// gathered so far
    pub cancel: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            missing_expected_fails: false,
            max_concurrent_entities: 4,
            lookup_timeout: Duration::from_secs(5),
            lookup_retries: 2,
            cancel: CancellationToken::new(),
        }
    }
}

pub struct Orchestrator {
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Validate every configured section for every entity, in declared
    /// order, and aggregate all outcomes into one report
    pub async fn run(
        &self,
        config: &ValidationConfig,
        expected: &ExpectedData,
        entities: &EntitySet,
        resolver: &Resolver,
        adapter: &dyn LocatorAdapter,
    ) -> ValidationReport {
        let start = Instant::now();
        let mut results: Vec<FieldResult> = Vec::new();
        let mut warnings = Vec::new();

        if entities.is_empty() {
            warn!("entity set is empty; nothing to validate");
            warnings.push("entity set is empty; nothing to validate".to_string());
        }

        let comparator = Comparator {
            resolver,
            adapter,
            lookup: LookupPolicy {
                timeout: self.options.lookup_timeout,
                retries: self.options.lookup_retries,
            },
        };

        info!(
            sections = config.sections().len(),
            entities = entities.len(),
            "starting validation run"
        );

        'sections: for section in config.sections() {
            debug!(section = %section.name, "validating section");

            let window = self.options.max_concurrent_entities.max(1);
            let mut section_results = stream::iter(
                entities.ids().iter().enumerate().map(|(index, id)| {
                    let comparator = &comparator;
                    async move {
                        comparator
                            .compare_section(section, id, index, expected)
                            .await
                    }
                }),
            )
            .buffered(window);

            while let Some(entity_results) = tokio::select! {
                biased;
                _ = self.options.cancel.cancelled() => {
                    warn!(section = %section.name, "run cancelled");
                    warnings.push("run cancelled before completion".to_string());
                    break 'sections;
                }
                next = section_results.next() => next,
            } {
                results.extend(entity_results);
            }
        }

        let report =
            ValidationReport::new(results, warnings, self.options.missing_expected_fails);
        info!(
            total = report.summary.total,
            matched = report.summary.matched,
            mismatched = report.summary.mismatched,
            missing_expected = report.summary.missing_expected,
            missing_actual = report.summary.missing_actual,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "validation run finished"
        );
        report
    }
}
