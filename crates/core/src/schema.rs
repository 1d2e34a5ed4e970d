//! Validation configuration and expected data
//!
//! A `ValidationConfig` is an ordered set of sections; each section is an
//! ordered key list (index = UI position) plus per-key format chains.
//! Section and key order come straight from the config document and are
//! significant, so sections live in a `Vec`, never a hash map.
//!
//! All structural problems (unknown format name, duplicate keys, format
//! declared for a key that does not exist) are fatal and detected here,
//! before any entity is processed.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::format::{FormatChain, FormatName};

/// One logical UI section: ordered field keys and per-key formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub keys: Vec<String>,
    pub formats: HashMap<String, FormatChain>,
}

impl Section {
    /// Format chain for a key; unlisted keys use the default raw comparison
    pub fn chain_for(&self, key: &str) -> FormatChain {
        self.formats
            .get(key)
            .cloned()
            .unwrap_or_else(|| FormatChain::single(FormatName::Default))
    }

    /// Zero-based UI position of a key, defined by key order
    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for key in &self.keys {
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::DuplicateKey {
                    section: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        for key in self.formats.keys() {
            if !seen.contains(key.as_str()) {
                return Err(ConfigError::FormatOnUnknownKey {
                    section: self.name.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered mapping of section name to schema; iteration order is the
/// display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    sections: Vec<Section>,
}

impl ValidationConfig {
    pub fn new(sections: Vec<Section>) -> ConfigResult<Self> {
        let mut names = HashSet::new();
        for section in &sections {
            if !names.insert(section.name.as_str()) {
                return Err(ConfigError::DuplicateSection {
                    section: section.name.clone(),
                });
            }
            section.validate()?;
        }
        Ok(Self { sections })
    }

    /// Parse the config document shape:
    /// `{ "<section>": { "keys": [..], "formats": { "<key>": "<name>" | [..] } } }`
    pub fn from_json(doc: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(doc)?;
        Self::from_value(&value)
    }

    pub fn from_value(doc: &Value) -> ConfigResult<Self> {
        let map = doc
            .as_object()
            .ok_or_else(|| ConfigError::Malformed("config root must be an object".into()))?;

        let mut sections = Vec::with_capacity(map.len());
        for (name, body) in map {
            sections.push(parse_section(name, body)?);
        }
        Self::new(sections)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn parse_section(name: &str, body: &Value) -> ConfigResult<Section> {
    let obj = body.as_object().ok_or_else(|| {
        ConfigError::Malformed(format!("section {name} must be an object"))
    })?;

    let keys = obj
        .get("keys")
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::Malformed(format!("section {name} missing keys array")))?
        .iter()
        .map(|k| {
            k.as_str().map(String::from).ok_or_else(|| {
                ConfigError::Malformed(format!("section {name} has a non-string key"))
            })
        })
        .collect::<ConfigResult<Vec<_>>>()?;

    let mut formats = HashMap::new();
    if let Some(raw) = obj.get("formats") {
        let format_map = raw.as_object().ok_or_else(|| {
            ConfigError::Malformed(format!("section {name} formats must be an object"))
        })?;
        for (key, spec) in format_map {
            formats.insert(key.clone(), parse_chain(name, key, spec)?);
        }
    }

    Ok(Section {
        name: name.to_string(),
        keys,
        formats,
    })
}

/// A format spec is a single name or an array of names applied in order
fn parse_chain(section: &str, key: &str, spec: &Value) -> ConfigResult<FormatChain> {
    let names: Vec<&str> = match spec {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| {
                    ConfigError::Malformed(format!(
                        "section {section}, key {key}: format entries must be strings"
                    ))
                })
            })
            .collect::<ConfigResult<_>>()?,
        _ => {
            return Err(ConfigError::Malformed(format!(
                "section {section}, key {key}: format must be a string or array"
            )))
        }
    };

    let mut chain = Vec::with_capacity(names.len());
    for name in names {
        let format = FormatName::parse(name).ok_or_else(|| ConfigError::UnknownFormat {
            section: section.to_string(),
            key: key.to_string(),
            format: name.to_string(),
        })?;
        chain.push(format);
    }
    Ok(FormatChain(chain))
}

/// Ordered entity identifiers; order defines the UI column index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySet {
    ids: Vec<String>,
}

impl EntitySet {
    pub fn new(ids: Vec<String>) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateEntity { id: id.clone() });
            }
        }
        Ok(Self { ids })
    }

    /// Parse either a bare array or a named-scenario document
    pub fn from_json(doc: &str, scenario: Option<&str>) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(doc)?;
        let array = match (&value, scenario) {
            (Value::Array(_), _) => &value,
            (Value::Object(map), Some(name)) => map.get(name).ok_or_else(|| {
                ConfigError::ScenarioNotFound {
                    scenario: name.to_string(),
                }
            })?,
            _ => {
                return Err(ConfigError::Malformed(
                    "entity set must be an array, or an object with --scenario".into(),
                ))
            }
        };
        let ids = array
            .as_array()
            .ok_or_else(|| ConfigError::Malformed("entity scenario must be an array".into()))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| ConfigError::Malformed("entity ids must be strings".into()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;
        Self::new(ids)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Rule for extracting one entity's record from a captured response:
/// the record is the element of the array at `records_path` whose
/// `id_field` equals the entity identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRule {
    pub records_path: String,
    pub id_field: String,
}

/// Expected values per entity, per section, per field key. Leaf values
/// may still be resolver references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedData {
    entities: HashMap<String, HashMap<String, HashMap<String, Value>>>,
}

impl ExpectedData {
    /// Take an already-shaped document: entity -> section -> key -> value
    pub fn from_value(doc: &Value) -> ConfigResult<Self> {
        serde_json::from_value(Value::Object(
            doc.as_object()
                .ok_or_else(|| ConfigError::Malformed("expected data must be an object".into()))?
                .clone(),
        ))
        .map(|entities| Self { entities })
        .map_err(ConfigError::from)
    }

    /// Derive expected data from a captured API response. For each entity
    /// the matching record is located per the extraction rule, then every
    /// configured section key is pulled from that record (dot-paths
    /// descend into nested objects). Entities without a matching record
    /// are simply absent and later surface as `missing_expected`.
    pub fn from_response(
        response: &Value,
        rule: &ExtractionRule,
        config: &ValidationConfig,
        entities: &EntitySet,
    ) -> Self {
        let records = lookup_path(response, &rule.records_path)
            .and_then(Value::as_array)
            .map(|a| a.as_slice())
            .unwrap_or(&[]);

        let mut out = HashMap::new();
        for id in entities.ids() {
            let record = records.iter().find(|r| {
                r.get(&rule.id_field).and_then(Value::as_str) == Some(id.as_str())
            });
            let Some(record) = record else { continue };

            let mut per_section = HashMap::new();
            for section in config.sections() {
                let mut fields = HashMap::new();
                for key in &section.keys {
                    if let Some(v) = lookup_path(record, key) {
                        fields.insert(key.clone(), v.clone());
                    }
                }
                per_section.insert(section.name.clone(), fields);
            }
            out.insert(id.clone(), per_section);
        }
        Self { entities: out }
    }

    pub fn get(&self, entity: &str, section: &str, key: &str) -> Option<&Value> {
        self.entities.get(entity)?.get(section)?.get(key)
    }

    pub fn has_entity(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CONFIG: &str = r#"{
        "basicInfo": {
            "keys": ["clientId", "name", "status"],
            "formats": { "status": "uppercase" }
        },
        "financials": {
            "keys": ["balance", "growth"],
            "formats": { "balance": ["trim", "currency"], "growth": "percentage" }
        }
    }"#;

    #[test]
    fn parses_sections_in_declared_order() {
        let config = ValidationConfig::from_json(CONFIG).unwrap();
        let names: Vec<_> = config.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["basicInfo", "financials"]);
    }

    #[test]
    fn position_is_key_index() {
        let config = ValidationConfig::from_json(CONFIG).unwrap();
        let section = config.section("basicInfo").unwrap();
        assert_eq!(section.position("clientId"), Some(0));
        assert_eq!(section.position("status"), Some(2));
        assert_eq!(section.position("missing"), None);
    }

    #[test]
    fn reordering_keys_moves_position_not_formats() {
        let reordered = r#"{
            "basicInfo": {
                "keys": ["status", "clientId", "name"],
                "formats": { "status": "uppercase" }
            }
        }"#;
        let config = ValidationConfig::from_json(reordered).unwrap();
        let section = config.section("basicInfo").unwrap();
        assert_eq!(section.position("status"), Some(0));
        assert_eq!(
            section.chain_for("status"),
            FormatChain(vec![FormatName::Uppercase])
        );
    }

    #[test]
    fn unknown_format_is_config_error() {
        let bad = r#"{ "s": { "keys": ["a"], "formats": { "a": "titlecase" } } }"#;
        match ValidationConfig::from_json(bad).unwrap_err() {
            ConfigError::UnknownFormat { section, key, format } => {
                assert_eq!((section.as_str(), key.as_str(), format.as_str()), ("s", "a", "titlecase"));
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn format_on_unknown_key_is_config_error() {
        let bad = r#"{ "s": { "keys": ["a"], "formats": { "b": "number" } } }"#;
        assert!(matches!(
            ValidationConfig::from_json(bad).unwrap_err(),
            ConfigError::FormatOnUnknownKey { .. }
        ));
    }

    #[test]
    fn duplicate_keys_rejected() {
        let bad = r#"{ "s": { "keys": ["a", "a"] } }"#;
        assert!(matches!(
            ValidationConfig::from_json(bad).unwrap_err(),
            ConfigError::DuplicateKey { .. }
        ));
    }

    #[test]
    fn entity_set_from_scenario_document() {
        let doc = r#"{ "three_client_set": ["C123", "C456", "C789"] }"#;
        let set = EntitySet::from_json(doc, Some("three_client_set")).unwrap();
        assert_eq!(set.ids(), ["C123", "C456", "C789"]);
    }

    #[test]
    fn duplicate_entity_rejected() {
        assert!(matches!(
            EntitySet::new(vec!["C1".into(), "C1".into()]).unwrap_err(),
            ConfigError::DuplicateEntity { .. }
        ));
    }

    #[test]
    fn expected_data_from_response_matches_by_id() {
        let config = ValidationConfig::from_json(CONFIG).unwrap();
        let entities = EntitySet::new(vec!["C123".into(), "C456".into()]).unwrap();
        let response = json!({
            "data": {
                "clients": [
                    { "clientId": "C123", "name": "Acme", "status": "active",
                      "balance": "1500.00", "growth": 12.5 }
                ]
            }
        });
        let rule = ExtractionRule {
            records_path: "data.clients".into(),
            id_field: "clientId".into(),
        };
        let expected = ExpectedData::from_response(&response, &rule, &config, &entities);
        assert_eq!(expected.get("C123", "basicInfo", "name"), Some(&json!("Acme")));
        assert_eq!(expected.get("C123", "financials", "growth"), Some(&json!(12.5)));
        // C456 has no record in the response
        assert!(!expected.has_entity("C456"));
    }
}
