//! Report configuration.
//!
//! Every field has a default matching the standard FedEx report layout, so an
//! empty file (or no file at all) is a valid configuration.

use crate::error::{ReportError, Result};
use crate::formulas::{CriteriaLookup, TrailerRule};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names of the sheets read from inputs and written to the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetNames {
    pub criteria: String,
    pub shipments: String,
    pub loc_test_data: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            criteria: "Criteria".to_string(),
            shipments: "Shipment Data".to_string(),
            loc_test_data: "LOC test data".to_string(),
        }
    }
}

/// Options controlling how the report workbook is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub sheets: SheetNames,
    /// Name of the structured table on the shipments sheet
    pub table_name: String,
    /// Column count of a standard raw export (A:AW); wider exports get an advisory
    pub nominal_shipment_width: usize,
    pub trailer: TrailerRule,
    /// Characters of the order number that form the network code
    pub network_prefix_len: usize,
    pub criteria_lookup: CriteriaLookup,
    /// Shipments sheet column widths by header
    pub column_widths: IndexMap<String, f64>,
    pub default_column_width: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let column_widths = [
            ("Carrier Name", 24.0),
            ("Order Number", 18.0),
            ("Active Equipment ID", 20.0),
            ("Historical Equipment ID", 22.0),
            ("Trailer", 16.0),
            ("Network", 10.0),
            ("LOC", 10.0),
        ]
        .into_iter()
        .map(|(header, width)| (header.to_string(), width))
        .collect();

        ReportConfig {
            sheets: SheetNames::default(),
            table_name: "ShipmentDataTable".to_string(),
            nominal_shipment_width: 49,
            trailer: TrailerRule::default(),
            network_prefix_len: 3,
            criteria_lookup: CriteriaLookup::default(),
            column_widths,
            default_column_width: 14.0,
        }
    }
}

impl ReportConfig {
    /// Load a configuration file; `.json` is read as JSON, `.yaml`/`.yml` as YAML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReportError::Config(format!("cannot read {}: {e}", path.display()))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let config: ReportConfig = match ext.as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))?,
            _ => {
                return Err(ReportError::Config(format!(
                    "unsupported config format for '{}' (expected .json, .yaml or .yml)",
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Width for a shipments column, falling back to the default width
    #[must_use]
    pub fn column_width(&self, header: &str) -> f64 {
        self.column_widths
            .get(header)
            .copied()
            .unwrap_or(self.default_column_width)
    }

    /// Check the settings that would otherwise produce broken formulas or sheets
    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.sheets.criteria,
            &self.sheets.shipments,
            &self.sheets.loc_test_data,
        ];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(ReportError::Config("sheet names must not be empty".to_string()));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(ReportError::Config("sheet names must be distinct".to_string()));
        }
        if self.table_name.is_empty() || self.table_name.contains(char::is_whitespace) {
            return Err(ReportError::Config(format!(
                "table name '{}' must be non-empty and contain no spaces",
                self.table_name
            )));
        }
        if self.network_prefix_len == 0 {
            return Err(ReportError::Config(
                "network_prefix_len must be at least 1".to_string(),
            ));
        }
        self.trailer.validate()?;
        self.criteria_lookup.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.sheets.criteria, "Criteria");
        assert_eq!(config.table_name, "ShipmentDataTable");
        assert_eq!(config.column_width("Carrier Name"), 24.0);
        assert_eq!(config.column_width("Ship Date"), 14.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        fs::write(
            &path,
            "table_name: Shipments\ntrailer:\n  short_prefix: \"86356\"\n",
        )
        .unwrap();

        let config = ReportConfig::from_path(&path).unwrap();
        assert_eq!(config.table_name, "Shipments");
        assert_eq!(config.trailer.short_prefix, "86356");
        assert_eq!(config.trailer.long_prefix, "861861");
        assert_eq!(config.nominal_shipment_width, 49);
    }

    #[test]
    fn test_json_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, r#"{"network_prefix_len": 4, "default_column_width": 12}"#).unwrap();

        let config = ReportConfig::from_path(&path).unwrap();
        assert_eq!(config.network_prefix_len, 4);
        assert_eq!(config.column_width("Anything"), 12.0);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, r#"{"tabel_name": "typo"}"#).unwrap();

        assert!(matches!(
            ReportConfig::from_path(&path),
            Err(ReportError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_settings() {
        let config = ReportConfig {
            table_name: "has space".to_string(),
            ..ReportConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.sheets.shipments = "Criteria".to_string();
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.network_prefix_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.toml");
        fs::write(&path, "").unwrap();
        assert!(ReportConfig::from_path(&path).is_err());
    }
}
