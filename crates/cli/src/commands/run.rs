//! The `run` command: load collaborator documents, run a validation,
//! return the report

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::info;

use gridcheck_core::{
    EntitySet, ExpectedData, ExtractionRule, Orchestrator, Resolver, RunOptions, SnapshotAdapter,
    ValidationConfig, ValidationReport,
};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Validation config document (sections, keys, formats)
    #[arg(long)]
    pub config: PathBuf,

    /// Entity set document (bare array, or scenario object with --scenario)
    #[arg(long)]
    pub entities: PathBuf,

    /// Scenario name when the entity document is keyed by scenario
    #[arg(long)]
    pub scenario: Option<String>,

    /// Captured API response; expected data is extracted from it
    #[arg(long)]
    pub response: Option<PathBuf>,

    /// Pre-shaped expected data (entity -> section -> key), instead of
    /// --response
    #[arg(long)]
    pub expected: Option<PathBuf>,

    /// Rendered page snapshot consumed by the locator adapter
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Named fixture documents for alias references, as alias=path
    #[arg(long = "fixture", value_name = "ALIAS=PATH")]
    pub fixtures: Vec<String>,

    /// Dot-path to the response array holding one record per entity
    #[arg(long, default_value = "data.records")]
    pub records_path: String,

    /// Record field matched against the entity identifier
    #[arg(long, default_value = "id")]
    pub id_field: String,

    /// Treat missing API data as a failure instead of an accepted N/A
    #[arg(long)]
    pub missing_expected_fails: bool,

    /// Bound on concurrently validated entities
    #[arg(long, default_value_t = 4)]
    pub max_concurrent: usize,

    /// Budget for one rendered-value lookup, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub lookup_timeout_ms: u64,

    /// Timed-out lookups retried this many times
    #[arg(long, default_value_t = 2)]
    pub lookup_retries: u32,
}

fn load_json(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn parse_json(path: &Path) -> Result<Value> {
    serde_json::from_str(&load_json(path)?).with_context(|| format!("parsing {}", path.display()))
}

pub async fn run_validation(args: &RunArgs) -> Result<ValidationReport> {
    let config = ValidationConfig::from_json(&load_json(&args.config)?)
        .with_context(|| format!("invalid config {}", args.config.display()))?;
    let entities = EntitySet::from_json(&load_json(&args.entities)?, args.scenario.as_deref())
        .with_context(|| format!("invalid entity set {}", args.entities.display()))?;
    let adapter = SnapshotAdapter::from_json(&load_json(&args.snapshot)?)
        .with_context(|| format!("invalid snapshot {}", args.snapshot.display()))?;

    let (resolver, expected) = match (&args.response, &args.expected) {
        (Some(response_path), _) => {
            let response = parse_json(response_path)?;
            let rule = ExtractionRule {
                records_path: args.records_path.clone(),
                id_field: args.id_field.clone(),
            };
            let expected = ExpectedData::from_response(&response, &rule, &config, &entities);
            (Resolver::new(response), expected)
        }
        (None, Some(expected_path)) => {
            let expected = ExpectedData::from_value(&parse_json(expected_path)?)
                .with_context(|| format!("invalid expected data {}", expected_path.display()))?;
            (Resolver::empty(), expected)
        }
        (None, None) => bail!("one of --response or --expected is required"),
    };

    let mut resolver = resolver;
    for spec in &args.fixtures {
        let (alias, path) = spec
            .split_once('=')
            .with_context(|| format!("--fixture must be ALIAS=PATH, got {spec:?}"))?;
        resolver = resolver.with_source(alias, parse_json(Path::new(path))?);
    }

    info!(
        config = %args.config.display(),
        entities = entities.len(),
        "loaded validation inputs"
    );

    let orchestrator = Orchestrator::new(RunOptions {
        missing_expected_fails: args.missing_expected_fails,
        max_concurrent_entities: args.max_concurrent,
        lookup_timeout: Duration::from_millis(args.lookup_timeout_ms),
        lookup_retries: args.lookup_retries,
        ..RunOptions::default()
    });

    Ok(orchestrator
        .run(&config, &expected, &entities, &resolver, &adapter)
        .await)
}
