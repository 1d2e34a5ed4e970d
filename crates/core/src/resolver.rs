//! Test data resolver
//!
//! Resolves indirect references in expected data to concrete values:
//! - `"path.in.response"` dot-paths into the captured API response
//! - `"alias:key.path"` pointers into a named fixture document
//! - anything else is a literal
//!
//! Resolution is recursive (a resolved value may itself be a reference)
//! with a fixed depth limit, deterministic, and memoized for the
//! lifetime of one resolver instance.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::error::ResolveError;

/// Maximum reference-chain depth before resolution is treated as cyclic
pub const MAX_DEPTH: usize = 10;

/// Name under which the captured API response is registered
pub const RESPONSE_SOURCE: &str = "response";

pub struct Resolver {
    sources: HashMap<String, Value>,
    cache: Mutex<HashMap<String, Value>>,
}

impl Resolver {
    /// Build a resolver over a captured response document
    pub fn new(response: Value) -> Self {
        let mut sources = HashMap::new();
        sources.insert(RESPONSE_SOURCE.to_string(), response);
        Self {
            sources,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn empty() -> Self {
        Self {
            sources: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register a named fixture document, addressable as `"alias:key"`
    pub fn with_source(mut self, alias: &str, document: Value) -> Self {
        self.sources.insert(alias.to_string(), document);
        self
    }

    /// Resolve a raw expected value. Non-strings and strings that do not
    /// look like references pass through unchanged.
    pub fn resolve(&self, value: &Value) -> Result<Value, ResolveError> {
        self.resolve_at(value, 0)
    }

    fn resolve_at(&self, value: &Value, depth: usize) -> Result<Value, ResolveError> {
        let reference = match value {
            Value::String(s) if is_reference(s) => s.clone(),
            other => return Ok(other.clone()),
        };

        if depth >= MAX_DEPTH {
            return Err(ResolveError::CyclicReference {
                reference,
                limit: MAX_DEPTH,
            });
        }

        if let Some(hit) = self.cache.lock().get(&reference) {
            return Ok(hit.clone());
        }

        let (alias, path) = match reference.split_once(':') {
            Some((alias, path)) => (alias, path),
            None => (RESPONSE_SOURCE, reference.as_str()),
        };

        let source = self.sources.get(alias).ok_or_else(|| ResolveError::MissingReference {
            reference: reference.clone(),
            segment: alias.to_string(),
        })?;

        let found = walk_path(source, path, &reference)?;
        debug!(reference = %reference, "resolved reference");

        // A resolved value may itself contain a further reference
        let resolved = self.resolve_at(&found, depth + 1)?;
        self.cache.lock().insert(reference, resolved.clone());
        Ok(resolved)
    }
}

/// A string is treated as a reference when it is an `alias:path` pointer
/// or a dot-path whose first segment is an identifier. Free-form display
/// text and decimal literals like "1500.00" stay literal.
fn is_reference(s: &str) -> bool {
    if let Some((alias, path)) = s.split_once(':') {
        return is_ident(alias) && path.split('.').all(is_segment);
    }
    let mut segments = s.split('.');
    let first = match segments.next() {
        Some(seg) => seg,
        None => return false,
    };
    if !is_ident(first) {
        return false;
    }
    let mut count = 1;
    for seg in segments {
        if !is_segment(seg) {
            return false;
        }
        count += 1;
    }
    count >= 2
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_segment(s: &str) -> bool {
    is_ident(s) || (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
}

/// Walk a dot-path through objects and arrays (numeric segments index)
fn walk_path(root: &Value, path: &str, reference: &str) -> Result<Value, ResolveError> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| ResolveError::MissingReference {
            reference: reference.to_string(),
            segment: segment.to_string(),
        })?;
    }
    Ok(current.clone())
}
