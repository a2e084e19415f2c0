//! Derived-column formulas for the Shipment Data table.
//!
//! Trailer, Network and LOC are never computed here. Each is emitted as
//! formula text bound to a structured-table column, using `[@[Column]]`
//! this-row references, and the spreadsheet evaluates it per row.
//!
//! [`TrailerRule::classify`] and [`network_code`] state what those formulas
//! compute, in plain Rust. They exist for callers that need the meaning of a
//! formula (tests, previews) and are not used to fill the table.

use crate::error::{ReportError, Result};
use crate::schema::{ACTIVE_EQUIPMENT_ID, CARRIER_NAME, HISTORICAL_EQUIPMENT_ID, ORDER_NUMBER};
use serde::{Deserialize, Serialize};
use shipment_report_sheet::{absolute_column_range, parse_column_letters, CellValue};

pub const TRAILER: &str = "Trailer";
pub const NETWORK: &str = "Network";
pub const LOC: &str = "LOC";

/// Headers of the derived columns, in the order they are appended
pub const DERIVED_COLUMNS: [&str; 3] = [TRAILER, NETWORK, LOC];

/// A table column whose cells are all given by one formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaColumn {
    pub header: String,
    pub formula: String,
}

/// Trailer classification by equipment-ID prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrailerRule {
    /// Compared against the first `long_prefix.len()` characters
    pub long_prefix: String,
    /// Compared against the first `short_prefix.len()` characters
    pub short_prefix: String,
    /// Upper-case spellings meaning the active ID is not known
    pub unknown_spellings: Vec<String>,
    pub fleet_label: String,
    pub subcontractor_label: String,
}

impl Default for TrailerRule {
    fn default() -> Self {
        TrailerRule {
            long_prefix: "861861".to_string(),
            short_prefix: "86355".to_string(),
            unknown_spellings: vec!["UNKNOWN".to_string(), "UNKOWN".to_string()],
            fleet_label: "FedEx Trailer".to_string(),
            subcontractor_label: "Subco Trailer".to_string(),
        }
    }
}

impl TrailerRule {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.long_prefix.is_empty() || self.short_prefix.is_empty() {
            return Err(ReportError::Config(
                "trailer prefixes must not be empty".to_string(),
            ));
        }
        if self.unknown_spellings.is_empty() {
            return Err(ReportError::Config(
                "trailer rule needs at least one 'unknown' spelling".to_string(),
            ));
        }
        Ok(())
    }

    fn prefix_test(&self, column: &str) -> String {
        let id = this_row(column);
        format!(
            "OR(LEFT({id},{})={},LEFT({id},{})={})",
            self.long_prefix.chars().count(),
            string_literal(&self.long_prefix),
            self.short_prefix.chars().count(),
            string_literal(&self.short_prefix),
        )
    }

    fn unknown_test(&self, column: &str) -> String {
        let normalized = format!("UPPER(TRIM({}))", this_row(column));
        let terms: Vec<String> = self
            .unknown_spellings
            .iter()
            .map(|spelling| format!("{normalized}={}", string_literal(spelling)))
            .collect();
        format!("OR({})", terms.join(","))
    }

    /// Formula text for the Trailer column
    #[must_use]
    pub fn formula(&self) -> String {
        let fleet = string_literal(&self.fleet_label);
        let subco = string_literal(&self.subcontractor_label);
        format!(
            "=IF({active},{fleet},IF({unknown},IF({historical},{fleet},{subco}),{subco}))",
            active = self.prefix_test(ACTIVE_EQUIPMENT_ID),
            unknown = self.unknown_test(ACTIVE_EQUIPMENT_ID),
            historical = self.prefix_test(HISTORICAL_EQUIPMENT_ID),
        )
    }

    fn is_fleet_id(&self, id: &str) -> bool {
        starts_with_ignore_case(id, &self.long_prefix) || starts_with_ignore_case(id, &self.short_prefix)
    }

    fn is_unknown(&self, id: &str) -> bool {
        let normalized = excel_trim(id).to_uppercase();
        self.unknown_spellings.iter().any(|s| *s == normalized)
    }

    /// The label the Trailer formula yields for one row
    #[must_use]
    pub fn classify(&self, active_id: &CellValue, historical_id: &CellValue) -> &str {
        let active = active_id.as_str();
        let fleet = self.is_fleet_id(&active)
            || (self.is_unknown(&active) && self.is_fleet_id(&historical_id.as_str()));
        if fleet {
            &self.fleet_label
        } else {
            &self.subcontractor_label
        }
    }
}

/// Where the LOC formula looks carriers up in the Criteria sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CriteriaLookup {
    /// Column holding the carrier name (letters, e.g. "A")
    pub key_column: String,
    /// Column holding the LOC code (letters, e.g. "D")
    pub value_column: String,
}

impl Default for CriteriaLookup {
    fn default() -> Self {
        CriteriaLookup {
            key_column: "A".to_string(),
            value_column: "D".to_string(),
        }
    }
}

impl CriteriaLookup {
    fn columns(&self) -> Result<(usize, usize)> {
        let key = parse_column_letters(&self.key_column)
            .map_err(|e| ReportError::Config(format!("criteria key column: {e}")))?;
        let value = parse_column_letters(&self.value_column)
            .map_err(|e| ReportError::Config(format!("criteria value column: {e}")))?;
        if value < key {
            return Err(ReportError::Config(format!(
                "criteria value column {} must not be left of key column {}",
                self.value_column, self.key_column
            )));
        }
        Ok((key, value))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.columns().map(|_| ())
    }

    /// Formula text for the LOC column
    pub fn formula(&self, criteria_sheet: &str) -> Result<String> {
        let (key, value) = self.columns()?;
        Ok(format!(
            "=IFERROR(VLOOKUP({},{}!{},{},0),\"\")",
            this_row(CARRIER_NAME),
            sheet_reference(criteria_sheet),
            absolute_column_range(key, value),
            value - key + 1,
        ))
    }
}

/// Formula text for the Network column
#[must_use]
pub fn network_formula(prefix_len: usize) -> String {
    format!("=IFERROR(LEFT({},{prefix_len}),\"\")", this_row(ORDER_NUMBER))
}

/// The value the Network formula yields for one order number
#[must_use]
pub fn network_code(order_number: &CellValue, prefix_len: usize) -> String {
    order_number.as_str().chars().take(prefix_len).collect()
}

/// Build the three derived columns in table order: Trailer, Network, LOC
pub fn derived_columns(
    trailer: &TrailerRule,
    network_prefix_len: usize,
    lookup: &CriteriaLookup,
    criteria_sheet: &str,
) -> Result<Vec<FormulaColumn>> {
    trailer.validate()?;
    Ok(vec![
        FormulaColumn {
            header: TRAILER.to_string(),
            formula: trailer.formula(),
        },
        FormulaColumn {
            header: NETWORK.to_string(),
            formula: network_formula(network_prefix_len),
        },
        FormulaColumn {
            header: LOC.to_string(),
            formula: lookup.formula(criteria_sheet)?,
        },
    ])
}

/// Structured reference to a column of the current table row
fn this_row(column: &str) -> String {
    let mut escaped = String::with_capacity(column.len());
    for c in column.chars() {
        if matches!(c, '[' | ']' | '#' | '\'') {
            escaped.push('\'');
        }
        escaped.push(c);
    }
    format!("[@[{escaped}]]")
}

fn string_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn sheet_reference(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Spreadsheet TRIM: strip outer spaces and collapse inner runs to one
fn excel_trim(text: &str) -> String {
    text.split(' ').filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let head: String = text.chars().take(prefix.chars().count()).collect();
    head.to_uppercase() == prefix.to_uppercase()
}
