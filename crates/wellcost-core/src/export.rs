//! Export of priced estimates
//!
//! [`build_export_rows`] flattens an estimate into the row sequence a
//! spreadsheet writer needs: section headers, bundle dividers, item rows with
//! the full parameter and charge breakdown, section totals and a grand total.
//! The CSV, JSON and Markdown writers all render that same sequence.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::{ChargeLine, EstimateResult, SectionParams, SectionResult};

/// Divider label for codes selected directly rather than through a bundle
pub const INDIVIDUAL_TOOLS: &str = "Individual tools";

/// One priced line with everything the export sheet shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportItem {
    pub hole_size: String,
    pub status: String,
    pub bundle: Option<String>,
    pub source: String,
    pub reference: String,
    pub specification_1: String,
    pub specification_2: String,
    pub daily_rate: f64,
    pub monthly_rate: f64,
    pub depth_charge_per_ft: f64,
    pub survey_charge_per_ft: f64,
    pub flat_charge: f64,
    pub hourly_charge: f64,
    pub flat_charge_billed: bool,
    pub quantity_of_tools: u32,
    pub total_days: f64,
    pub total_months: f64,
    pub total_depth: f64,
    pub total_survey: f64,
    pub total_hours: f64,
    pub discount_percent: f64,
    pub rental_charge: f64,
    pub operating_charge: f64,
    pub total: f64,
}

impl ExportItem {
    fn new(hole_size: &str, params: &SectionParams, line: &ChargeLine) -> Self {
        let item = &line.item;
        Self {
            hole_size: hole_size.to_string(),
            status: line.status.label().to_string(),
            bundle: line.bundle.clone(),
            source: item.source.clone(),
            reference: item.reference.clone(),
            specification_1: item.code.clone(),
            specification_2: item.description.clone(),
            daily_rate: item.daily_rate,
            monthly_rate: item.monthly_rate,
            depth_charge_per_ft: item.depth_charge_per_ft,
            survey_charge_per_ft: item.survey_charge_per_ft,
            flat_charge: item.flat_charge,
            hourly_charge: item.hourly_charge,
            flat_charge_billed: line.flat_charge_billed,
            quantity_of_tools: params.quantity_of_tools,
            total_days: params.total_days,
            total_months: params.total_months,
            total_depth: params.total_depth,
            total_survey: params.total_survey,
            total_hours: params.total_hours,
            discount_percent: params.discount * 100.0,
            rental_charge: line.rental_charge,
            operating_charge: line.operating_charge,
            total: line.total,
        }
    }
}

/// Structured export row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportRow {
    SectionHeader {
        hole_size: String,
        package: Option<String>,
        service_name: Option<String>,
    },
    /// Start of a run of lines sharing the same bundle origin
    Divider { label: String },
    Item(ExportItem),
    SectionTotal { hole_size: String, total: f64 },
    GrandTotal { total: f64 },
}

/// Full export payload (JSON export shape)
#[derive(Debug, Clone, Serialize)]
pub struct ExportPayload {
    pub generated_at: DateTime<Utc>,
    pub currency: String,
    pub grand_total: f64,
    pub rows: Vec<ExportRow>,
}

impl ExportPayload {
    pub fn from_estimate(estimate: &EstimateResult) -> Self {
        Self {
            generated_at: Utc::now(),
            currency: estimate.currency.clone(),
            grand_total: estimate.grand_total,
            rows: build_export_rows(estimate),
        }
    }
}

/// Flatten an estimate into export rows
///
/// A divider is emitted every time the bundle origin changes between
/// consecutive lines of a section, including at the first line. Two picks of
/// the same bundle in a row count as two origins.
pub fn build_export_rows(estimate: &EstimateResult) -> Vec<ExportRow> {
    let mut rows = Vec::new();

    for section in &estimate.sections {
        push_section_rows(section, &mut rows);
    }

    rows.push(ExportRow::GrandTotal {
        total: estimate.grand_total,
    });
    rows
}

fn push_section_rows(section: &SectionResult, rows: &mut Vec<ExportRow>) {
    rows.push(ExportRow::SectionHeader {
        hole_size: section.hole_size.clone(),
        package: section.package.clone(),
        service_name: section.service_name.clone(),
    });

    let mut current_group = None;
    for line in &section.lines {
        let group = (line.bundle.as_deref(), line.bundle_instance);
        if current_group != Some(group) {
            rows.push(ExportRow::Divider {
                label: group.0.unwrap_or(INDIVIDUAL_TOOLS).to_string(),
            });
            current_group = Some(group);
        }
        rows.push(ExportRow::Item(ExportItem::new(
            &section.hole_size,
            &section.params,
            line,
        )));
    }

    rows.push(ExportRow::SectionTotal {
        hole_size: section.hole_size.clone(),
        total: section.section_total,
    });
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Escape pipes so free text stays inside one Markdown table cell
fn md_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

fn csv_header(currency: &str) -> String {
    [
        "Section".to_string(),
        "Status".to_string(),
        "Bundle".to_string(),
        "Source".to_string(),
        "Reference".to_string(),
        "Specification 1".to_string(),
        "Specification 2".to_string(),
        "Daily Rate".to_string(),
        "Monthly Rate".to_string(),
        "Depth Charge (per ft)".to_string(),
        "Survey Charge (per ft)".to_string(),
        "Flat Charge".to_string(),
        "Hourly Charge".to_string(),
        "Quantity of Tools".to_string(),
        "Total Days".to_string(),
        "Total Months".to_string(),
        "Total Depth (ft)".to_string(),
        "Total Survey (ft)".to_string(),
        "Total Hours".to_string(),
        "Discount (%)".to_string(),
        format!("Rental Charge ({})", currency),
        format!("Operating Charge ({})", currency),
        format!("Total ({})", currency),
    ]
    .join(",")
}

const CSV_COLUMNS: usize = 23;

/// Export an estimate to CSV
///
/// One header line, then the export rows. Section headers, dividers and
/// totals occupy the text columns and leave the numeric columns blank.
///
/// # Errors
/// Returns error if file creation or write operations fail
pub fn export_estimate_to_csv(estimate: &EstimateResult, path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", csv_header(&estimate.currency)).context("Failed to write CSV header")?;

    let padded = |cells: Vec<String>| {
        let mut cells = cells;
        cells.resize(CSV_COLUMNS, String::new());
        cells.join(",")
    };

    for row in build_export_rows(estimate) {
        let line = match &row {
            ExportRow::SectionHeader {
                hole_size,
                package,
                service_name,
            } => padded(vec![
                csv_field(&format!("{}\" Hole Section", hole_size)),
                String::new(),
                String::new(),
                csv_field(package.as_deref().unwrap_or("")),
                String::new(),
                csv_field(service_name.as_deref().unwrap_or("")),
            ]),
            ExportRow::Divider { label } => padded(vec![
                String::new(),
                String::new(),
                csv_field(&format!("--- {} ---", label)),
            ]),
            ExportRow::Item(item) => [
                csv_field(&item.hole_size),
                csv_field(&item.status),
                csv_field(item.bundle.as_deref().unwrap_or("")),
                csv_field(&item.source),
                csv_field(&item.reference),
                csv_field(&item.specification_1),
                csv_field(&item.specification_2),
                item.daily_rate.to_string(),
                item.monthly_rate.to_string(),
                item.depth_charge_per_ft.to_string(),
                item.survey_charge_per_ft.to_string(),
                item.flat_charge.to_string(),
                item.hourly_charge.to_string(),
                item.quantity_of_tools.to_string(),
                item.total_days.to_string(),
                item.total_months.to_string(),
                item.total_depth.to_string(),
                item.total_survey.to_string(),
                item.total_hours.to_string(),
                format!("{:.2}", item.discount_percent),
                format!("{:.2}", item.rental_charge),
                format!("{:.2}", item.operating_charge),
                format!("{:.2}", item.total),
            ]
            .join(","),
            ExportRow::SectionTotal { hole_size, total } => {
                let mut cells = vec![csv_field(&format!("{}\" Section Total", hole_size))];
                cells.resize(CSV_COLUMNS - 1, String::new());
                cells.push(format!("{:.2}", total));
                cells.join(",")
            }
            ExportRow::GrandTotal { total } => {
                let mut cells = vec![csv_field("Grand Total")];
                cells.resize(CSV_COLUMNS - 1, String::new());
                cells.push(format!("{:.2}", total));
                cells.join(",")
            }
        };

        writeln!(writer, "{}", line).with_context(|| format!("Failed to write row {:?}", row))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export an estimate to JSON format
///
/// Pretty-printed [`ExportPayload`]
///
/// # Errors
/// Returns error if serialization or file write fails
pub fn export_estimate_to_json(estimate: &EstimateResult, path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let payload = ExportPayload::from_estimate(estimate);
    let json =
        serde_json::to_string_pretty(&payload).context("Failed to serialize estimate to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

/// Format an amount with thousands separators and two decimals
pub fn fmt_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Export an estimate to a Markdown report
///
/// One table per section, bundle dividers as bold rows, totals after each
/// section and at the end.
pub fn export_estimate_to_markdown(estimate: &EstimateResult, path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create Markdown file: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    let currency = &estimate.currency;

    writeln!(writer, "# Cost Estimate")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "**Generated**: {}",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(writer)?;

    for row in build_export_rows(estimate) {
        match row {
            ExportRow::SectionHeader {
                hole_size,
                package,
                service_name,
            } => {
                writeln!(writer, "## {}\" Hole Section", hole_size)?;
                writeln!(writer)?;
                if let Some(package) = package {
                    writeln!(writer, "- **Package**: {}", package)?;
                }
                if let Some(service) = service_name {
                    writeln!(writer, "- **Service**: {}", service)?;
                }
                writeln!(writer)?;
                writeln!(
                    writer,
                    "| Status | Reference | Specification 1 | Specification 2 | Rental ({c}) | Operating ({c}) | Total ({c}) |",
                    c = currency
                )?;
                writeln!(
                    writer,
                    "|--------|-----------|-----------------|-----------------|-------------|----------------|------------|"
                )?;
            }
            ExportRow::Divider { label } => {
                writeln!(writer, "| **{}** | | | | | | |", md_cell(&label))?;
            }
            ExportRow::Item(item) => {
                writeln!(
                    writer,
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    item.status,
                    md_cell(&item.reference),
                    md_cell(&item.specification_1),
                    md_cell(&item.specification_2),
                    fmt_amount(item.rental_charge),
                    fmt_amount(item.operating_charge),
                    fmt_amount(item.total)
                )
                .with_context(|| format!("Failed to write row for {}", item.specification_1))?;
            }
            ExportRow::SectionTotal { hole_size, total } => {
                writeln!(writer)?;
                writeln!(
                    writer,
                    "**Section Total for {}\" Hole**: {} {}",
                    hole_size,
                    fmt_amount(total),
                    currency
                )?;
                writeln!(writer)?;
            }
            ExportRow::GrandTotal { total } => {
                writeln!(
                    writer,
                    "## Grand Total ({}): {}",
                    currency,
                    fmt_amount(total)
                )?;
            }
        }
    }

    writer.flush().context("Failed to flush Markdown writer")?;

    Ok(())
}
