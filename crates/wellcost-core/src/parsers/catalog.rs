//! Catalog parser
//!
//! Reads the rate sheet exported as JSON or YAML. Rows are either the top-level
//! array or the array stored under the sheet name `"Data"`. Column names match
//! the spreadsheet headers.
//!
//! Cells are never fatal: a numeric cell that does not hold a finite,
//! non-negative number becomes 0 and is recorded in the [`LoadReport`].

use crate::error::{CoreError, LoadReport};
use crate::models::{Catalog, LineItem, DEFAULT_SOURCE};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sheet holding the rate rows
pub const DATA_SHEET: &str = "Data";

const PACKAGE: &[&str] = &["Package"];
const SERVICE_NAME: &[&str] = &["Service Name"];
const REFERENCE: &[&str] = &["Reference"];
const SPEC_1: &[&str] = &["Specification 1"];
const SPEC_2: &[&str] = &["Specification 2"];
const DAILY_RATE: &[&str] = &["Daily Rate"];
const MONTHLY_RATE: &[&str] = &["Monthly Rate"];
const DEPTH_CHARGE: &[&str] = &["Depth Charge (per ft)"];
const FLAT_CHARGE: &[&str] = &["Flat Charge", "Flat Rate"];
const SURVEY_CHARGE: &[&str] = &["Survey Charge (per ft)"];
const HOURLY_CHARGE: &[&str] = &["Hourly Charge"];
const SOURCE: &[&str] = &["Source"];

/// Supported catalog file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    pub const EXPECTED: &'static str = ".json, .yaml, .yml";

    /// Detect format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(CatalogFormat::Json),
            "yaml" | "yml" => Some(CatalogFormat::Yaml),
            _ => None,
        }
    }
}

/// Parser for catalog rate sheets
pub struct CatalogParser;

impl Default for CatalogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a catalog file; the file name becomes the catalog source label
    pub fn parse(&self, path: &Path, report: &mut LoadReport) -> Result<Catalog, CoreError> {
        let format = CatalogFormat::from_path(path).ok_or_else(|| CoreError::UnsupportedFormat {
            path: path.to_path_buf(),
            expected: CatalogFormat::EXPECTED.to_string(),
        })?;

        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_read(path, e))?;

        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.parse_str(&content, format, &source, report)
    }

    /// Parse catalog content already in memory
    pub fn parse_str(
        &self,
        content: &str,
        format: CatalogFormat,
        source: &str,
        report: &mut LoadReport,
    ) -> Result<Catalog, CoreError> {
        let path = PathBuf::from(source);
        let document: Value = match format {
            CatalogFormat::Json => {
                serde_json::from_str(content).map_err(|e| CoreError::JsonParse {
                    path: path.clone(),
                    message: e.to_string(),
                    source: e,
                })?
            }
            CatalogFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| CoreError::YamlParse {
                    path: path.clone(),
                    message: e.to_string(),
                    source: e,
                })?
            }
        };

        let rows = match document {
            Value::Array(rows) => rows,
            Value::Object(mut sheets) => match sheets.remove(DATA_SHEET) {
                Some(Value::Array(rows)) => rows,
                _ => {
                    return Err(CoreError::CatalogShape {
                        path,
                        message: format!("no \"{}\" array of rows", DATA_SHEET),
                    })
                }
            },
            _ => {
                return Err(CoreError::CatalogShape {
                    path,
                    message: "expected an array of rows".to_string(),
                })
            }
        };

        let mut items = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let label = format!("{} row {}", source, index + 1);
            let Value::Object(row) = row else {
                report.rows_skipped += 1;
                report.add_warning(&label, "Row is not an object, skipped");
                continue;
            };
            match parse_row(row, &label, report) {
                Some(item) => items.push(item),
                None => report.rows_skipped += 1,
            }
        }

        report.rows_loaded += items.len();
        info!(
            source,
            rows = items.len(),
            skipped = report.rows_skipped,
            coerced = report.values_coerced,
            "Catalog loaded"
        );

        Ok(Catalog::new(source, items))
    }
}

fn parse_row(row: &Map<String, Value>, label: &str, report: &mut LoadReport) -> Option<LineItem> {
    let code = text_cell(row, SPEC_1);
    if code.is_empty() {
        report.add_warning(label, "Missing Specification 1, row skipped");
        return None;
    }

    let mut number = |columns: &[&str]| number_cell(row, columns, label, report);

    let item = LineItem {
        daily_rate: number(DAILY_RATE),
        monthly_rate: number(MONTHLY_RATE),
        depth_charge_per_ft: number(DEPTH_CHARGE),
        flat_charge: number(FLAT_CHARGE),
        survey_charge_per_ft: number(SURVEY_CHARGE),
        hourly_charge: number(HOURLY_CHARGE),
        code,
        reference: text_cell(row, REFERENCE),
        description: text_cell(row, SPEC_2),
        package: text_cell(row, PACKAGE),
        service_name: text_cell(row, SERVICE_NAME),
        source: match text_cell(row, SOURCE) {
            s if s.is_empty() => DEFAULT_SOURCE.to_string(),
            s => s,
        },
    };

    Some(item)
}

/// First non-null cell among `columns`
fn cell<'a>(row: &'a Map<String, Value>, columns: &[&str]) -> Option<&'a Value> {
    columns
        .iter()
        .find_map(|c| row.get(*c))
        .filter(|v| !v.is_null())
}

fn text_cell(row: &Map<String, Value>, columns: &[&str]) -> String {
    match cell(row, columns) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn number_cell(
    row: &Map<String, Value>,
    columns: &[&str],
    label: &str,
    report: &mut LoadReport,
) -> f64 {
    let Some(value) = cell(row, columns) else {
        return 0.0;
    };

    match coerce_number(value) {
        Ok(n) => n,
        Err(raw) => {
            debug!(row = label, column = columns[0], value = %raw, "Non-numeric cell treated as 0");
            report.add_coercion(
                label,
                format!("{} '{}' is not a non-negative number, treated as 0", columns[0], raw),
            );
            0.0
        }
    }
}

/// Interpret a cell as a finite non-negative number
///
/// Blank strings are empty cells and count as 0. On failure the raw value is
/// returned for reporting.
pub fn coerce_number(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Null => return Ok(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Ok(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() && n >= 0.0 => Ok(n),
        _ => Err(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn parse_json(content: &str) -> (Catalog, LoadReport) {
        let mut report = LoadReport::new();
        let catalog = CatalogParser::new()
            .parse_str(content, CatalogFormat::Json, "rates.json", &mut report)
            .unwrap();
        (catalog, report)
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12.5)), Ok(12.5));
        assert_eq!(coerce_number(&json!(" 300 ")), Ok(300.0));
        assert_eq!(coerce_number(&json!("")), Ok(0.0));
        assert_eq!(coerce_number(&Value::Null), Ok(0.0));
        assert_eq!(coerce_number(&json!("N/A")), Err("N/A".to_string()));
        assert!(coerce_number(&json!(-5)).is_err());
        assert!(coerce_number(&json!("inf")).is_err());
        assert!(coerce_number(&json!(true)).is_err());
    }

    #[test]
    fn test_non_numeric_rate_becomes_zero() {
        let (catalog, report) = parse_json(
            r#"[{"Specification 1": "GR1: GR_TOTL", "Daily Rate": "N/A", "Monthly Rate": 900}]"#,
        );

        let item = &catalog.items()[0];
        assert_eq!(item.daily_rate, 0.0);
        assert_eq!(item.monthly_rate, 900.0);
        assert_eq!(report.values_coerced, 1);
        assert!(report.errors[0].message.contains("Daily Rate"));
    }

    #[test]
    fn test_missing_columns_default() {
        let (catalog, report) = parse_json(r#"[{"Specification 1": "X"}]"#);

        let item = &catalog.items()[0];
        assert_eq!(item.flat_charge, 0.0);
        assert_eq!(item.depth_charge_per_ft, 0.0);
        assert_eq!(item.source, "Data");
        assert!(!report.has_errors());
    }

    #[test]
    fn test_flat_rate_alias() {
        let (catalog, _) = parse_json(r#"[{"Specification 1": "X", "Flat Rate": 250}]"#);
        assert_eq!(catalog.items()[0].flat_charge, 250.0);
    }

    #[test]
    fn test_code_trimmed_and_numbers_as_text() {
        let (catalog, _) = parse_json(
            r#"[{"Specification 1": "  AU14: AUX_SURELOC ", "Reference": 1042, "Source": "Addendum"}]"#,
        );
        let item = &catalog.items()[0];
        assert_eq!(item.code, "AU14: AUX_SURELOC");
        assert_eq!(item.reference, "1042");
        assert_eq!(item.source, "Addendum");
    }

    #[test]
    fn test_rows_without_code_skipped() {
        let (catalog, report) = parse_json(
            r#"[{"Specification 1": null, "Daily Rate": 1}, "junk", {"Specification 1": "A"}]"#,
        );
        assert_eq!(catalog.len(), 1);
        assert_eq!(report.rows_skipped, 2);
        assert_eq!(report.rows_loaded, 1);
    }

    #[test]
    fn test_data_sheet_wrapper() {
        let (catalog, _) = parse_json(r#"{"Data": [{"Specification 1": "A"}], "Notes": []}"#);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.source, "rates.json");
    }

    #[test]
    fn test_wrong_shape_is_error() {
        let mut report = LoadReport::new();
        let result = CatalogParser::new().parse_str(
            r#"{"Sheet1": []}"#,
            CatalogFormat::Json,
            "rates.json",
            &mut report,
        );
        assert!(matches!(result, Err(CoreError::CatalogShape { .. })));
    }

    #[test]
    fn test_parse_yaml_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rates.yaml");
        fs::write(
            &path,
            "Data:\n  - Package: Wireline\n    Service Name: STANDARD WELLS\n    Specification 1: \"RE1: RES_INDU\"\n    Depth Charge (per ft): 1.25\n",
        )
        .unwrap();

        let mut report = LoadReport::new();
        let catalog = CatalogParser::new().parse(&path, &mut report).unwrap();
        assert_eq!(catalog.source, "rates.yaml");
        let item = &catalog.items()[0];
        assert_eq!(item.code, "RE1: RES_INDU");
        assert_eq!(item.service_name, "STANDARD WELLS");
        assert_eq!(item.depth_charge_per_ft, 1.25);
    }

    #[test]
    fn test_unsupported_extension() {
        let mut report = LoadReport::new();
        let result = CatalogParser::new().parse(Path::new("rates.xlsx"), &mut report);
        assert!(matches!(result, Err(CoreError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let mut report = LoadReport::new();
        let result = CatalogParser::new().parse(&temp.path().join("gone.json"), &mut report);
        assert!(matches!(result, Err(CoreError::FileNotFound { .. })));
    }
}
