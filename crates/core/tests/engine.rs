//! Full-engine integration: custom locator adapter, uneven lookup
//! latencies, reference resolution through the captured response

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use gridcheck_core::{
    EntitySet, ExpectedData, LocatorAdapter, Orchestrator, Resolver, RunOptions, ValidationConfig,
};

/// Adapter that answers slower for earlier columns, so completion order
/// is the reverse of canonical order
struct StaggeredAdapter {
    grid: Vec<Vec<&'static str>>,
}

#[async_trait]
impl LocatorAdapter for StaggeredAdapter {
    async fn field_text(
        &self,
        _section: &str,
        position: usize,
        entity_index: usize,
    ) -> Option<String> {
        let delay = 10 * (self.grid.len().saturating_sub(entity_index)) as u64;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.grid
            .get(entity_index)?
            .get(position)
            .map(|s| s.to_string())
    }
}

const CONFIG: &str = r#"{
    "basicInfo": {
        "keys": ["clientId", "name", "status"],
        "formats": { "status": "uppercase" }
    }
}"#;

#[tokio::test]
async fn staggered_completion_keeps_canonical_order() {
    let config = ValidationConfig::from_json(CONFIG).unwrap();
    let entities = EntitySet::new(vec!["C123".into(), "C456".into(), "C789".into()]).unwrap();
    let expected = ExpectedData::from_value(&json!({
        "C123": { "basicInfo": { "clientId": "C123", "name": "Acme",    "status": "active" } },
        "C456": { "basicInfo": { "clientId": "C456", "name": "Globex",  "status": "pending" } },
        "C789": { "basicInfo": { "clientId": "C789", "name": "Initech", "status": "closed" } }
    }))
    .unwrap();
    let adapter = StaggeredAdapter {
        grid: vec![
            vec!["C123", "Acme", "ACTIVE"],
            vec!["C456", "Globex", "PENDING"],
            vec!["C789", "Initech", "CLOSED"],
        ],
    };
    let resolver = Resolver::empty();
    let orchestrator = Orchestrator::new(RunOptions {
        max_concurrent_entities: 3,
        ..RunOptions::default()
    });

    let report = orchestrator
        .run(&config, &expected, &entities, &resolver, &adapter)
        .await;

    assert!(report.ok(), "unexpected failures:\n{}", report.render());
    let entity_order: Vec<_> = report.results.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(
        entity_order,
        ["C123", "C123", "C123", "C456", "C456", "C456", "C789", "C789", "C789"]
    );
}

#[tokio::test]
async fn dot_path_references_resolve_through_the_response() {
    let config = ValidationConfig::from_json(CONFIG).unwrap();
    let resolver = Resolver::new(json!({
        "data": { "clients": [
            { "id": "C123", "name": "Acme", "status": "active" }
        ]}
    }));
    // expected values are dot-path references into the captured response
    let expected = ExpectedData::from_value(&json!({
        "C123": { "basicInfo": {
            "clientId": "data.clients.0.id",
            "name": "data.clients.0.name",
            "status": "data.clients.0.status"
        }}
    }))
    .unwrap();
    let adapter = StaggeredAdapter {
        grid: vec![vec!["C123", "Acme", "ACTIVE"]],
    };
    let entities = EntitySet::new(vec!["C123".into()]).unwrap();

    let report = Orchestrator::new(RunOptions::default())
        .run(&config, &expected, &entities, &resolver, &adapter)
        .await;

    assert_eq!(report.summary.matched, 3, "{}", report.render());
}

#[tokio::test]
async fn render_is_consumable_by_assertion_layers() {
    let config = ValidationConfig::from_json(CONFIG).unwrap();
    let entities = EntitySet::new(vec!["C123".into()]).unwrap();
    let expected = ExpectedData::from_value(&json!({
        "C123": { "basicInfo": { "clientId": "C123", "name": "Acme", "status": "active" } }
    }))
    .unwrap();
    let adapter = StaggeredAdapter {
        grid: vec![vec!["C123", "Acme Corp", "Active"]],
    };
    let resolver = Resolver::empty();

    let report = Orchestrator::new(RunOptions::default())
        .run(&config, &expected, &entities, &resolver, &adapter)
        .await;

    assert!(!report.ok());
    let rendered = report.render();
    assert!(rendered.contains("basicInfo.name[C123]: expected=Acme actual=Acme Corp (mismatch)"));
    assert!(rendered.contains("basicInfo.status[C123]: expected=ACTIVE actual=Active (mismatch)"));
}
