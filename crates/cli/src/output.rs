//! Report rendering for the CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use gridcheck_core::{FieldStatus, ValidationReport};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table of non-matching fields
    #[default]
    Table,
    /// Full report as JSON
    Json,
    /// The engine's plain diff rendering
    Plain,
}

pub fn print_report(report: &ValidationReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => print_table(report),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).unwrap_or_default()
            );
        }
        OutputFormat::Plain => print!("{}", report.render()),
    }
}

fn print_table(report: &ValidationReport) {
    let failing: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.status != FieldStatus::Match)
        .collect();

    if !failing.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Section", "Entity", "Field", "Expected", "Actual", "Status", "Note"]);
        for r in &failing {
            table.add_row(vec![
                r.section.clone(),
                r.entity_id.clone(),
                r.field_key.clone(),
                r.expected_formatted.clone().unwrap_or_else(|| "-".into()),
                r.actual.clone().unwrap_or_else(|| "-".into()),
                r.status.to_string(),
                r.note.clone().unwrap_or_default(),
            ]);
        }
        println!("{table}");
    }

    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow(), warning);
    }

    let summary = format!(
        "{} checked: {} matched, {} mismatched, {} missing expected, {} missing actual",
        report.summary.total,
        report.summary.matched,
        report.summary.mismatched,
        report.summary.missing_expected,
        report.summary.missing_actual
    );
    if report.ok() {
        println!("{} {}", "PASS".green().bold(), summary);
    } else {
        println!("{} {}", "FAIL".red().bold(), summary);
    }
}
