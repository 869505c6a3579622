//! Estimate definition parser
//!
//! An estimate file lists hole sections in the order they are priced:
//!
//! ```toml
//! currency = "MYR"
//!
//! [[sections]]
//! hole_size = "12.25"
//! package = "Wireline"
//! service = "STANDARD WELLS"
//! quantity = 2
//! months = 1
//! depth = 5500
//! discount_percent = 10
//! tools = ["XL Rock (150DegC Max)", "GR1: GR_TOTL"]
//!
//! [sections.flat_charge]
//! "GR1: GR_TOTL" = false
//! ```
//!
//! Omitted parameters take the form defaults. Malformed or out-of-range values
//! are coerced and reported, never rejected.

use crate::error::{CoreError, LoadReport};
use crate::models::{SectionInput, SectionParams, DEFAULT_CURRENCY};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use toml::Value;

/// Parsed estimate: currency label plus sections in processing order
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateDefinition {
    pub currency: String,
    pub sections: Vec<SectionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EstimateFile {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    sections: Vec<SectionSpec>,
}

/// Numeric parameters stay raw TOML values so a malformed one is coerced
/// and reported instead of failing the whole file
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SectionSpec {
    hole_size: String,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    service: Option<String>,
    #[serde(default)]
    quantity: Option<Value>,
    #[serde(default)]
    days: Option<Value>,
    #[serde(default)]
    months: Option<Value>,
    #[serde(default)]
    depth: Option<Value>,
    #[serde(default)]
    survey: Option<Value>,
    #[serde(default)]
    hours: Option<Value>,
    #[serde(default)]
    discount_percent: Option<Value>,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    flat_charge: BTreeMap<String, bool>,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Parser for estimate definition files
pub struct EstimateParser;

impl Default for EstimateParser {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimateParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(
        &self,
        path: &Path,
        report: &mut LoadReport,
    ) -> Result<EstimateDefinition, CoreError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_read(path, e))?;
        self.parse_str(&content, path, report)
    }

    pub fn parse_str(
        &self,
        content: &str,
        path: &Path,
        report: &mut LoadReport,
    ) -> Result<EstimateDefinition, CoreError> {
        let file: EstimateFile = toml::from_str(content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
            source: e,
        })?;

        let mut seen = HashSet::new();
        let sections = file
            .sections
            .into_iter()
            .map(|spec| {
                let section = into_section(spec, report);
                if !seen.insert(section.hole_size.clone()) {
                    report.add_warning(
                        format!("section {}", section.hole_size),
                        "Hole size listed more than once",
                    );
                }
                section
            })
            .collect();

        Ok(EstimateDefinition {
            currency: file.currency,
            sections,
        })
    }
}

/// Interpret a parameter as a finite non-negative number
///
/// Numeric strings are accepted and a blank string counts as 0. On failure
/// the raw value is returned for reporting.
fn coerce_param(value: &Value) -> Result<f64, String> {
    let parsed = match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Float(n) => Some(*n),
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

fn into_section(spec: SectionSpec, report: &mut LoadReport) -> SectionInput {
    let label = format!("section {}", spec.hole_size);
    let defaults = SectionParams::default();

    let mut amount = |name: &str, value: Option<&Value>, default: f64| -> f64 {
        let Some(value) = value else {
            return default;
        };
        coerce_param(value).unwrap_or_else(|raw| {
            report.add_coercion(
                &label,
                format!("{} '{}' is not a non-negative number, using 0", name, raw),
            );
            0.0
        })
    };

    let quantity = amount(
        "quantity",
        spec.quantity.as_ref(),
        f64::from(defaults.quantity_of_tools),
    );
    let days = amount("days", spec.days.as_ref(), defaults.total_days);
    let months = amount("months", spec.months.as_ref(), defaults.total_months);
    let depth = amount("depth", spec.depth.as_ref(), defaults.total_depth);
    let survey = amount("survey", spec.survey.as_ref(), defaults.total_survey);
    let hours = amount("hours", spec.hours.as_ref(), defaults.total_hours);
    let discount_percent = amount(
        "discount_percent",
        spec.discount_percent.as_ref(),
        defaults.discount * 100.0,
    );

    let max_quantity = f64::from(u32::MAX);
    let quantity_of_tools = if quantity.fract() == 0.0 && quantity <= max_quantity {
        quantity as u32
    } else {
        let whole = quantity.round().min(max_quantity);
        report.add_coercion(
            &label,
            format!("quantity {} is not a whole number of tools, using {}", quantity, whole),
        );
        whole as u32
    };

    let discount_percent = if discount_percent > 100.0 {
        report.add_coercion(
            &label,
            format!("discount {}% above 100, using 100%", discount_percent),
        );
        100.0
    } else {
        discount_percent
    };

    if spec.tools.is_empty() {
        report.add_warning(&label, "No tools selected, section prices to 0");
    }

    let params = SectionParams {
        quantity_of_tools,
        total_days: days,
        total_months: months,
        total_depth: depth,
        total_survey: survey,
        total_hours: hours,
        discount: discount_percent / 100.0,
    };

    SectionInput {
        hole_size: spec.hole_size,
        package: spec.package,
        service_name: spec.service,
        params,
        selected_codes: spec.tools,
        flat_charge_overrides: spec.flat_charge,
    }
}
