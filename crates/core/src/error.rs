//! Error types for the validation engine
//!
//! Configuration errors are fatal and raised before a run starts.
//! Resolution and formatting errors are per-field outcomes: the
//! comparator converts them into `FieldResult` statuses and the
//! traversal continues.

use thiserror::Error;

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Fatal configuration errors, detected before any entity is processed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Duplicate section: {section}")]
    DuplicateSection { section: String },

    #[error("Duplicate key in section {section}: {key}")]
    DuplicateKey { section: String, key: String },

    #[error("Unknown format {format:?} in section {section}, key {key}")]
    UnknownFormat {
        section: String,
        key: String,
        format: String,
    },

    #[error("Format declared for unknown key in section {section}: {key}")]
    FormatOnUnknownKey { section: String, key: String },

    #[error("Duplicate entity identifier: {id}")]
    DuplicateEntity { id: String },

    #[error("Entity set scenario not found: {scenario}")]
    ScenarioNotFound { scenario: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-field reference resolution failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Missing reference: {reference} (no value at {segment})")]
    MissingReference { reference: String, segment: String },

    #[error("Cyclic reference: {reference} exceeded depth {limit}")]
    CyclicReference { reference: String, limit: usize },
}

/// Per-field formatting failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Value {value:?} is not numeric-coercible for {format}")]
    NotNumeric { format: &'static str, value: String },

    #[error("Unparsable date: {value:?}")]
    UnparsableDate { value: String },

    #[error("Value {value:?} is not a recognized boolean")]
    NotBoolean { value: String },
}
