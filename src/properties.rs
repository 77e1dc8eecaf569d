//! Dashboard property definitions with defaults from dashboard.json
//!
//! dashboard.json is embedded at compile time and is the only place defaults
//! are defined. `PropertyReader` layers user-set values (from
//! `dashboard_config.json`) over those defaults with typed, validated getters.

use crate::dataset::error::{DashboardError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// dashboard.json embedded at compile time
const DASHBOARD_JSON: &str = include_str!("../dashboard.json");

/// Property definition from dashboard.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Enumerated,
}

/// Registry of all dashboard properties with their defaults
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a property document (`{"properties": [...]}`)
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: serde_json::Value = serde_json::from_str(json)?;
        let entries = doc["properties"].as_array().ok_or_else(|| {
            DashboardError::Config("property document missing 'properties' array".to_string())
        })?;

        let mut properties = HashMap::new();
        for entry in entries {
            let name = entry["name"]
                .as_str()
                .ok_or_else(|| DashboardError::Config("property missing 'name'".to_string()))?
                .to_string();

            let kind = match entry["kind"].as_str() {
                Some("StringProperty") => PropertyKind::String,
                Some("EnumeratedProperty") => PropertyKind::Enumerated,
                other => {
                    return Err(DashboardError::Config(format!(
                        "property '{}' has unknown kind {:?}",
                        name, other
                    )))
                }
            };

            let valid_values = if kind == PropertyKind::Enumerated {
                entry["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value: entry["defaultValue"].as_str().unwrap_or("").to_string(),
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true)
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Global registry built from the embedded dashboard.json
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| match PropertyRegistry::from_json(DASHBOARD_JSON) {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Embedded dashboard.json is invalid: {}", e);
            PropertyRegistry {
                properties: HashMap::new(),
            }
        }
    })
}

/// Typed property reader: user values first, dashboard.json defaults second
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(user_values: HashMap<String, String>) -> Self {
        let user_values = user_values
            .into_iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .collect();
        Self { user_values }
    }

    /// Parse a flat JSON object of property name → value
    ///
    /// Strings, numbers and booleans are accepted; other values are skipped.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut values = HashMap::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    warn!("Ignoring non-scalar value for '{}': {}", key, other);
                    continue;
                }
            };
            if registry().get_property(&key).is_none() {
                warn!("Unknown property '{}' in configuration", key);
            }
            values.insert(key, value);
        }
        Ok(Self::new(values))
    }

    /// Read user values from `path`, or defaults only if the file is absent
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                debug!("Loaded configuration from {}", path.display());
                Self::from_json(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {} found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// String property (user value or dashboard.json default)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Enumerated property, falling back to the default on an invalid value
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.clone();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value, name, valid_values, default
            );
        }

        default.to_string()
    }

    fn get_parsed<T>(&self, name: &str) -> T
    where
        T: std::str::FromStr + Default + std::fmt::Display,
    {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<T>().ok())
            .unwrap_or_default();
        let value = self.get_string(name);
        if value.is_empty() {
            return default;
        }
        match value.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    "Invalid value '{}' for property '{}'. Using default: {}",
                    value, name, default
                );
                default
            }
        }
    }

    pub fn get_f64(&self, name: &str) -> f64 {
        self.get_parsed(name)
    }

    /// f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if value >= min && value <= max {
            return value;
        }
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(min);
        warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value, name, min, max, default
        );
        default
    }

    pub fn get_u64(&self, name: &str) -> u64 {
        self.get_parsed(name)
    }

    pub fn get_u32(&self, name: &str) -> u32 {
        self.get_parsed(name)
    }

    pub fn get_i32(&self, name: &str) -> i32 {
        self.get_parsed(name)
    }

    pub fn get_usize(&self, name: &str) -> usize {
        self.get_parsed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(pairs: &[(&str, &str)]) -> PropertyReader {
        PropertyReader::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("data.path").is_some());
        assert!(reg.get_property("tail.zone").is_some());
        assert!(reg.get_property("report.template").is_some());
        assert_eq!(reg.get_property("tail.zone").unwrap().kind, PropertyKind::Enumerated);
        assert!(reg.get_property("no.such.property").is_none());
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("data.path"), Some("data/sensor_data.parquet"));
        assert_eq!(reg.get_default("data.seed"), Some("42"));
        assert_eq!(reg.get_default("tail.zone"), Some("Industrial"));
        assert_eq!(reg.get_default("report.template"), Some("simple_white"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("tail.zone", "Residential"));
        assert!(reg.is_valid_enum_value("tail.zone", "industrial"));
        assert!(!reg.is_valid_enum_value("tail.zone", "Commercial"));
        // Non-enumerated properties accept anything
        assert!(reg.is_valid_enum_value("report.title", "anything"));
    }

    #[test]
    fn test_reader_defaults() {
        let r = PropertyReader::default();
        assert_eq!(r.get_enum("tail.zone"), "Industrial");
        assert_eq!(r.get_u64("data.seed"), 42);
        assert_eq!(r.get_usize("histogram.bins"), 50);
        assert_eq!(r.get_f64("loadings.scale"), 5.0);
        assert_eq!(r.get_string("no.such.property"), "");
    }

    #[test]
    fn test_reader_user_values() {
        let r = reader(&[("tail.zone", "Residential"), ("data.seed", "7"), ("data.path", "")]);
        assert_eq!(r.get_enum("tail.zone"), "Residential");
        assert_eq!(r.get_u64("data.seed"), 7);
        // Empty user value falls back to default
        assert_eq!(r.get_string("data.path"), "data/sensor_data.parquet");
    }

    #[test]
    fn test_reader_invalid_values_fall_back() {
        let r = reader(&[
            ("tail.zone", "Downtown"),
            ("data.seed", "forty-two"),
            ("tail.percentile", "250"),
        ]);
        assert_eq!(r.get_enum("tail.zone"), "Industrial");
        assert_eq!(r.get_u64("data.seed"), 42);
        assert_eq!(r.get_f64_in_range("tail.percentile", 0.0, 100.0), 99.0);
    }

    #[test]
    fn test_reader_from_json() {
        let r = PropertyReader::from_json(
            r#"{"data.seed": 11, "report.title": "Audit", "histogram.bins": "20", "nested": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(r.get_u64("data.seed"), 11);
        assert_eq!(r.get_string("report.title"), "Audit");
        assert_eq!(r.get_usize("histogram.bins"), 20);
    }

    #[test]
    fn test_reader_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let r = PropertyReader::from_file_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(r.get_u64("data.seed"), 42);
    }

    #[test]
    fn test_reader_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PropertyReader::from_file_or_default(&path).is_err());
    }
}
