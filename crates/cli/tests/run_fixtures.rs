//! End-to-end runs over the fixture documents, through the CLI's
//! library entry points

use std::path::PathBuf;

use gridcheck_cli::commands::{check_config, run_validation, RunArgs};
use gridcheck_core::FieldStatus;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn base_args() -> RunArgs {
    RunArgs {
        config: fixture("config.json"),
        entities: fixture("entities.json"),
        scenario: Some("three_client_set".to_string()),
        response: Some(fixture("response.json")),
        expected: None,
        snapshot: fixture("snapshot.json"),
        fixtures: vec![],
        records_path: "data.clients".to_string(),
        id_field: "clientId".to_string(),
        missing_expected_fails: false,
        max_concurrent: 4,
        lookup_timeout_ms: 5000,
        lookup_retries: 2,
    }
}

#[tokio::test]
async fn three_clients_with_one_absent_from_response() {
    let report = run_validation(&base_args()).await.unwrap();

    // 2 sections x 3 entities x 3 keys
    assert_eq!(report.summary.total, 18);
    // C456 has no record: every one of its fields is missing_expected
    assert_eq!(report.summary.missing_expected, 6);
    assert_eq!(report.summary.matched, 12);
    assert_eq!(report.summary.mismatched, 0);

    assert!(report
        .results
        .iter()
        .filter(|r| r.entity_id == "C456")
        .all(|r| r.status == FieldStatus::MissingExpected));

    // missing API data is an accepted N/A display by default
    assert!(report.ok());
}

#[tokio::test]
async fn strict_missing_expected_policy_fails() {
    let args = RunArgs {
        missing_expected_fails: true,
        ..base_args()
    };
    let report = run_validation(&args).await.unwrap();
    assert!(!report.ok());
    assert_eq!(report.failing().len(), 6);
}

#[tokio::test]
async fn pre_shaped_expected_with_fixture_alias() {
    let args = RunArgs {
        scenario: Some("single_client".to_string()),
        response: None,
        expected: Some(fixture("expected.json")),
        fixtures: vec![format!("labels={}", fixture("labels.json").display())],
        ..base_args()
    };
    let report = run_validation(&args).await.unwrap();

    // basicInfo matches through the labels: alias; financials has no
    // expected data for this entity
    let basic: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.section == "basicInfo")
        .collect();
    assert!(basic.iter().all(|r| r.status == FieldStatus::Match));
    assert_eq!(report.summary.missing_expected, 3);
    assert!(report.ok());
}

#[tokio::test]
async fn missing_inputs_are_rejected() {
    let args = RunArgs {
        response: None,
        expected: None,
        ..base_args()
    };
    assert!(run_validation(&args).await.is_err());
}

#[test]
fn check_config_accepts_and_rejects() {
    let parsed = check_config(&fixture("config.json")).unwrap();
    assert_eq!(parsed.sections().len(), 2);

    let bad = fixture("nonexistent.json");
    assert!(check_config(&bad).is_err());
}
