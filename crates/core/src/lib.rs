//! Gridcheck validation engine
//!
//! Verifies that every UI-displayed field matches the corresponding API
//! field after section-specific formatting, for one or many repeated
//! entities rendered as table columns, tolerating missing or malformed
//! data without aborting and reporting every mismatch rather than
//! failing fast.
//!
//! # Architecture
//!
//! ```text
//! ValidationConfig + ExpectedData + EntitySet
//!         |
//!    Orchestrator ── per section, per entity ──> Comparator
//!         |                                        |    |
//!         |                              Transformer    LocatorAdapter
//!         |                                        |    |
//!         +──────────────<── FieldResult <─────────+────+
//!         |
//!   ValidationReport
//! ```
//!
//! Browser automation, network capture, and fixture discovery live
//! outside this crate; they supply a captured response, the config
//! documents, and a [`adapter::LocatorAdapter`] implementation.

pub mod adapter;
pub mod compare;
pub mod error;
pub mod format;
pub mod report;
pub mod resolver;
pub mod run;
pub mod schema;

pub use adapter::{LocatorAdapter, SnapshotAdapter};
pub use compare::{Comparator, LookupPolicy};
pub use error::{ConfigError, FormatError, ResolveError};
pub use format::{Comparable, FormatChain, FormatName};
pub use report::{FieldResult, FieldStatus, Summary, ValidationReport};
pub use resolver::Resolver;
pub use run::{Orchestrator, RunOptions};
pub use schema::{EntitySet, ExpectedData, ExtractionRule, Section, ValidationConfig};
