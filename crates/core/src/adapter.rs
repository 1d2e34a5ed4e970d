//! Field locator adapter boundary
//!
//! The engine never touches a page itself. Rendered values come through
//! `LocatorAdapter`, owned by the UI automation layer: given a section
//! name, field position, and entity column index, it returns the text
//! currently shown, or `None` when the element is not present. Lookups
//! may suspend while the page settles but must resolve within the
//! orchestrator's timeout.
//!
//! `SnapshotAdapter` is the in-repo implementation over a rendered-page
//! snapshot document, used by the CLI and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};

#[async_trait]
pub trait LocatorAdapter: Send + Sync {
    /// Text rendered at (section, position, entity column), or `None`
    /// when no such element exists
    async fn field_text(
        &self,
        section: &str,
        position: usize,
        entity_index: usize,
    ) -> Option<String>;

    async fn element_exists(&self, section: &str, position: usize, entity_index: usize) -> bool {
        self.field_text(section, position, entity_index).await.is_some()
    }
}

/// Adapter over a captured snapshot of the rendered page:
/// `{ "<section>": [ ["<cell>", ...] per entity column ] }`.
/// `null` cells model elements the UI failed to render.
pub struct SnapshotAdapter {
    sections: HashMap<String, Vec<Vec<Option<String>>>>,
    latency: Option<Duration>,
}

impl SnapshotAdapter {
    pub fn from_json(doc: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(doc)?;
        Self::from_value(&value)
    }

    pub fn from_value(doc: &Value) -> ConfigResult<Self> {
        let map = doc
            .as_object()
            .ok_or_else(|| ConfigError::Malformed("snapshot root must be an object".into()))?;

        let mut sections = HashMap::new();
        for (name, columns) in map {
            let columns = columns
                .as_array()
                .ok_or_else(|| {
                    ConfigError::Malformed(format!("snapshot section {name} must be an array"))
                })?
                .iter()
                .map(|column| parse_column(name, column))
                .collect::<ConfigResult<Vec<_>>>()?;
            sections.insert(name.clone(), columns);
        }
        Ok(Self {
            sections,
            latency: None,
        })
    }

    /// Simulate per-lookup latency; lets tests exercise the
    /// orchestrator's timeout path
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

fn parse_column(section: &str, column: &Value) -> ConfigResult<Vec<Option<String>>> {
    column
        .as_array()
        .ok_or_else(|| {
            ConfigError::Malformed(format!("snapshot section {section} columns must be arrays"))
        })?
        .iter()
        .map(|cell| match cell {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Ok(Some(other.to_string())),
        })
        .collect()
}

#[async_trait]
impl LocatorAdapter for SnapshotAdapter {
    async fn field_text(
        &self,
        section: &str,
        position: usize,
        entity_index: usize,
    ) -> Option<String> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.sections
            .get(section)?
            .get(entity_index)?
            .get(position)?
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "basicInfo": [
            ["C123", "Acme", "ACTIVE"],
            ["C456", "Globex", null]
        ]
    }"#;

    #[tokio::test]
    async fn reads_cell_by_position_and_column() {
        let adapter = SnapshotAdapter::from_json(SNAPSHOT).unwrap();
        assert_eq!(
            adapter.field_text("basicInfo", 1, 0).await,
            Some("Acme".to_string())
        );
        assert_eq!(
            adapter.field_text("basicInfo", 0, 1).await,
            Some("C456".to_string())
        );
    }

    #[tokio::test]
    async fn null_cell_and_out_of_range_are_absent() {
        let adapter = SnapshotAdapter::from_json(SNAPSHOT).unwrap();
        assert_eq!(adapter.field_text("basicInfo", 2, 1).await, None);
        assert_eq!(adapter.field_text("basicInfo", 0, 5).await, None);
        assert_eq!(adapter.field_text("nosuch", 0, 0).await, None);
        assert!(!adapter.element_exists("basicInfo", 2, 1).await);
    }
}
