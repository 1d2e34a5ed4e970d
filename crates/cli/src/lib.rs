//! Gridcheck CLI
//!
//! Thin driver around `gridcheck-core`: loads the collaborator-supplied
//! JSON documents (validation config, entity set, captured response or
//! pre-shaped expected data, rendered snapshot, named fixtures), runs a
//! validation, and renders the report.

pub mod commands;
pub mod output;
