//! Format transformer
//!
//! Pure normalization and comparison rules applied to a field before the
//! equality check:
//! - Numeric formats (currency, number, percentage) compare magnitudes,
//!   never digit strings
//! - Dates normalize both sides to a UTC instant
//! - Case formats fold the expected value only; the rendered value is
//!   compared as-is
//!
//! A field may declare a chain of formats applied left to right. Single
//! and chained declarations share one code path.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormatError;

/// A named, pure normalization rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    Currency,
    Date,
    Number,
    Uppercase,
    Lowercase,
    Percentage,
    Boolean,
    Trim,
    Default,
}

impl FormatName {
    /// Parse a format name as it appears in a config document.
    /// Returns `None` for unregistered names so the schema loader can
    /// report the exact section and key.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "currency" => Some(Self::Currency),
            "date" => Some(Self::Date),
            "number" => Some(Self::Number),
            "uppercase" => Some(Self::Uppercase),
            "lowercase" => Some(Self::Lowercase),
            "percentage" => Some(Self::Percentage),
            "boolean" => Some(Self::Boolean),
            "trim" => Some(Self::Trim),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Date => "date",
            Self::Number => "number",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Percentage => "percentage",
            Self::Boolean => "boolean",
            Self::Trim => "trim",
            Self::Default => "default",
        }
    }
}

/// An ordered sequence of formats applied left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormatChain(pub Vec<FormatName>);

impl FormatChain {
    pub fn single(name: FormatName) -> Self {
        Self(vec![name])
    }

    /// The format whose comparison semantics govern the final equality
    /// check: the last entry that is not a plain string pass-through.
    pub fn comparison_format(&self) -> FormatName {
        self.0
            .iter()
            .rev()
            .copied()
            .find(|f| !matches!(f, FormatName::Trim | FormatName::Default))
            .unwrap_or(FormatName::Default)
    }
}

/// A value normalized for comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparable {
    Text(String),
    Decimal(f64),
    Instant(DateTime<Utc>),
    Flag(bool),
}

impl std::fmt::Display for Comparable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparable::Text(s) => write!(f, "{}", s),
            Comparable::Decimal(n) => write!(f, "{}", n),
            Comparable::Instant(t) => write!(f, "{}", t.to_rfc3339()),
            Comparable::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// Render a raw JSON value as text for normalization
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn comparable_text(value: &Comparable) -> String {
    value.to_string()
}

/// Strip currency symbols, thousands separators, and whitespace
fn strip_currency(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ',') && !c.is_whitespace())
        .collect()
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
}

fn parse_decimal(s: &str, format: &'static str) -> Result<f64, FormatError> {
    s.trim().parse::<f64>().map_err(|_| FormatError::NotNumeric {
        format,
        value: s.to_string(),
    })
}

/// Round to two decimal places; currency comparison granularity
fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Parse a date in any accepted rendering, normalized to a UTC instant.
/// Naive timestamps are taken as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, FormatError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(NaiveTime::MIN).and_utc());
        }
    }

    Err(FormatError::UnparsableDate {
        value: s.to_string(),
    })
}

fn parse_flag(s: &str) -> Result<bool, FormatError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(FormatError::NotBoolean {
            value: s.to_string(),
        }),
    }
}

/// Apply one format to an already-normalized value
fn apply_one(value: Comparable, format: FormatName) -> Result<Comparable, FormatError> {
    match format {
        FormatName::Currency => match value {
            Comparable::Decimal(n) => Ok(Comparable::Decimal(round2(n))),
            other => {
                let stripped = strip_currency(&comparable_text(&other));
                Ok(Comparable::Decimal(round2(parse_decimal(&stripped, "currency")?)))
            }
        },
        FormatName::Number => match value {
            Comparable::Decimal(n) => Ok(Comparable::Decimal(n)),
            other => {
                let stripped = strip_separators(&comparable_text(&other));
                Ok(Comparable::Decimal(parse_decimal(&stripped, "number")?))
            }
        },
        FormatName::Percentage => match value {
            Comparable::Decimal(n) => Ok(Comparable::Decimal(n)),
            other => {
                let text = comparable_text(&other);
                let stripped = strip_separators(text.trim().trim_end_matches('%'));
                Ok(Comparable::Decimal(parse_decimal(&stripped, "percentage")?))
            }
        },
        FormatName::Date => match value {
            Comparable::Instant(t) => Ok(Comparable::Instant(t)),
            other => Ok(Comparable::Instant(parse_instant(&comparable_text(&other))?)),
        },
        FormatName::Boolean => match value {
            Comparable::Flag(b) => Ok(Comparable::Flag(b)),
            other => Ok(Comparable::Flag(parse_flag(&comparable_text(&other))?)),
        },
        FormatName::Uppercase => Ok(Comparable::Text(comparable_text(&value).to_uppercase())),
        FormatName::Lowercase => Ok(Comparable::Text(comparable_text(&value).to_lowercase())),
        FormatName::Trim | FormatName::Default => {
            Ok(Comparable::Text(comparable_text(&value).trim().to_string()))
        }
    }
}

/// Apply a format chain to a raw expected value, left to right
pub fn apply(value: &Value, chain: &FormatChain) -> Result<Comparable, FormatError> {
    let seed = match value {
        Value::Number(n) if chain_is_numeric(chain) => {
            Comparable::Decimal(n.as_f64().unwrap_or(f64::NAN))
        }
        other => Comparable::Text(value_text(other)),
    };

    let mut current = seed;
    if chain.0.is_empty() {
        return apply_one(current, FormatName::Default);
    }
    for format in &chain.0 {
        current = apply_one(current, *format)?;
    }
    Ok(current)
}

fn chain_is_numeric(chain: &FormatChain) -> bool {
    matches!(
        chain.comparison_format(),
        FormatName::Currency | FormatName::Number | FormatName::Percentage
    )
}

/// Compare a formatted expected value against the rendered text under the
/// chain's comparison semantics. The rendered side is normalized the same
/// way (symbols stripped, dates parsed) but never case-folded.
pub fn compare(
    expected: &Comparable,
    actual: &str,
    chain: &FormatChain,
) -> Result<bool, FormatError> {
    match (expected, chain.comparison_format()) {
        (Comparable::Decimal(e), FormatName::Currency) => {
            let a = round2(parse_decimal(&strip_currency(actual), "currency")?);
            Ok((e - a).abs() < 0.005)
        }
        (Comparable::Decimal(e), FormatName::Percentage) => {
            let a = parse_decimal(
                &strip_separators(actual.trim().trim_end_matches('%')),
                "percentage",
            )?;
            Ok((e - a).abs() < 1e-9)
        }
        (Comparable::Decimal(e), _) => {
            let a = parse_decimal(&strip_separators(actual), "number")?;
            Ok((e - a).abs() < 1e-9)
        }
        (Comparable::Instant(e), _) => Ok(*e == parse_instant(actual)?),
        (Comparable::Flag(e), _) => Ok(*e == parse_flag(actual)?),
        (Comparable::Text(e), _) => Ok(e == actual.trim()),
    }
}
