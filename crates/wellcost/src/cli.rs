//! CLI helpers for estimate, catalog and bundle commands
//!
//! Scope checks and comfy-table formatters over wellcost-core types.

use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Row, Table};
use wellcost_core::export::{fmt_amount, INDIVIDUAL_TOOLS};
use wellcost_core::{
    Catalog, ChargeStatus, EstimateResult, LoadReport, PricingConfig, SectionResult,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    MissingCatalog,
    UnknownPackage {
        package: String,
        suggestions: String,
    },
    UnknownService {
        package: String,
        service: String,
        suggestions: String,
    },
    Core(wellcost_core::CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::MissingCatalog => {
                write!(
                    f,
                    "No catalog given: pass --catalog <FILE> or set WELLCOST_CATALOG"
                )
            }
            CliError::UnknownPackage {
                package,
                suggestions,
            } => {
                write!(
                    f,
                    "Package '{}' not found in catalog. Available:\n{}",
                    package, suggestions
                )
            }
            CliError::UnknownService {
                package,
                service,
                suggestions,
            } => {
                write!(
                    f,
                    "Service '{}' not offered by package '{}'. Available:\n{}",
                    service, package, suggestions
                )
            }
            CliError::Core(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<wellcost_core::CoreError> for CliError {
    fn from(e: wellcost_core::CoreError) -> Self {
        CliError::Core(e)
    }
}

// ============================================================================
// Scope Checks
// ============================================================================

fn bullet_list(values: &[&str]) -> String {
    if values.is_empty() {
        return "  (none)".to_string();
    }
    values
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check that a package (and service within it) exists in the catalog
pub fn check_scope(
    catalog: &Catalog,
    package: Option<&str>,
    service: Option<&str>,
) -> Result<(), CliError> {
    let Some(package) = package else {
        return Ok(());
    };

    let packages = catalog.packages();
    if !packages.contains(&package) {
        return Err(CliError::UnknownPackage {
            package: package.to_string(),
            suggestions: bullet_list(&packages),
        });
    }

    if let Some(service) = service {
        let services = catalog.services(package);
        if !services.contains(&service) {
            return Err(CliError::UnknownService {
                package: package.to_string(),
                service: service.to_string(),
                suggestions: bullet_list(&services),
            });
        }
    }

    Ok(())
}

// ============================================================================
// Formatters
// ============================================================================

fn header(table: &mut Table, columns: &[&str], no_color: bool) {
    if no_color {
        table.set_header(columns.to_vec());
    } else {
        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
}

fn amount_cell(value: f64) -> Cell {
    Cell::new(fmt_amount(value)).set_alignment(CellAlignment::Right)
}

fn status_cell(status: ChargeStatus, no_color: bool) -> Cell {
    let cell = Cell::new(status.label());
    match (no_color, status) {
        (true, _) => cell,
        (false, ChargeStatus::Charged) => cell.fg(Color::Green),
        (false, ChargeStatus::DuplicateNotCharged) => cell.fg(Color::Yellow),
    }
}

fn scope_label(section: &SectionResult) -> String {
    match (&section.package, &section.service_name) {
        (Some(p), Some(s)) => format!("{} / {}", p, s),
        (Some(p), None) => p.clone(),
        (None, Some(s)) => s.clone(),
        (None, None) => "all packages".to_string(),
    }
}

/// Format one priced section as a table, status column first
pub fn format_section_table(section: &SectionResult, currency: &str, no_color: bool) -> String {
    let mut lines = vec![format!(
        "Hole section {}\" ({})",
        section.hole_size,
        scope_label(section)
    )];

    if section.lines.is_empty() {
        lines.push("  No tools priced.".to_string());
        return lines.join("\n");
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(
        &mut table,
        &[
            "Status",
            "Code",
            "Description",
            "Group",
            "Operating",
            "Rental",
            "Total",
        ],
        no_color,
    );

    for line in &section.lines {
        let mut total = amount_cell(line.total);
        if !no_color && line.is_charged() {
            total = total.fg(Color::Green);
        }

        table.add_row(Row::from(vec![
            status_cell(line.status, no_color),
            Cell::new(line.code()),
            Cell::new(truncate(&line.item.description, 40)),
            Cell::new(line.bundle.as_deref().unwrap_or(INDIVIDUAL_TOOLS)),
            amount_cell(line.operating_charge),
            amount_cell(line.rental_charge),
            total,
        ]));
    }

    lines.push(table.to_string());
    lines.push(format!(
        "Section total: {} {}",
        currency,
        fmt_amount(section.section_total)
    ));
    lines.join("\n")
}

/// Format the per-section totals and grand total
pub fn format_estimate_summary(estimate: &EstimateResult, no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(
        &mut table,
        &["Hole Size", "Lines", "Duplicates", "Operating", "Rental", "Total"],
        no_color,
    );

    for section in &estimate.sections {
        table.add_row(Row::from(vec![
            Cell::new(&section.hole_size),
            Cell::new(section.lines.len()),
            Cell::new(section.duplicate_count()),
            amount_cell(section.operating_total()),
            amount_cell(section.rental_total()),
            amount_cell(section.section_total),
        ]));
    }

    let grand = if no_color {
        Cell::new(fmt_amount(estimate.grand_total))
    } else {
        Cell::new(fmt_amount(estimate.grand_total)).fg(Color::Green)
    };
    table.add_row(Row::from(vec![
        Cell::new(format!("Grand Total ({})", estimate.currency)),
        Cell::new(estimate.line_count()),
        Cell::new(estimate.duplicate_line_count()),
        Cell::new(""),
        Cell::new(""),
        grand.set_alignment(CellAlignment::Right),
    ]));

    table.to_string()
}

/// Format the whole estimate (human) or JSON
pub fn format_estimate(estimate: &EstimateResult, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(estimate).unwrap_or_else(|_| "{}".to_string());
    }

    let mut blocks: Vec<String> = estimate
        .sections
        .iter()
        .map(|s| format_section_table(s, &estimate.currency, no_color))
        .collect();
    blocks.push(format_estimate_summary(estimate, no_color));
    blocks.join("\n\n")
}

/// Format what can be picked for a scope
///
/// Without a package: the package list. With a package only: its services.
/// With both: bundles configured for the service first, then catalog codes.
pub fn format_catalog_options(
    catalog: &Catalog,
    config: &PricingConfig,
    package: Option<&str>,
    service: Option<&str>,
    no_color: bool,
) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    match (package, service) {
        (None, _) => {
            header(&mut table, &["Package", "Services", "Rows"], no_color);
            for package in catalog.packages() {
                table.add_row(Row::from(vec![
                    Cell::new(package),
                    Cell::new(catalog.services(package).len()),
                    Cell::new(catalog.view(Some(package), None).rows().len()),
                ]));
            }
        }
        (Some(package), None) => {
            header(&mut table, &["Service", "Tools", "Bundles"], no_color);
            for service in catalog.services(package) {
                table.add_row(Row::from(vec![
                    Cell::new(service),
                    Cell::new(catalog.codes(Some(package), Some(service)).len()),
                    Cell::new(config.bundles_for(Some(service)).len()),
                ]));
            }
        }
        (Some(package), Some(service)) => {
            header(&mut table, &["Kind", "Name", "Description"], no_color);
            for (name, members) in config.bundles_for(Some(service)) {
                table.add_row(Row::from(vec![
                    Cell::new("bundle"),
                    Cell::new(name),
                    Cell::new(format!("{} tools", members.len())),
                ]));
            }
            let view = catalog.view(Some(package), Some(service));
            for code in catalog.codes(Some(package), Some(service)) {
                let description = view
                    .matching(code)
                    .next()
                    .map(|item| truncate(&item.description, 50))
                    .unwrap_or_default();
                let kind = if config.is_unique_tool(code) {
                    "tool (unique)"
                } else {
                    "tool"
                };
                table.add_row(Row::from(vec![
                    Cell::new(kind),
                    Cell::new(code),
                    Cell::new(description),
                ]));
            }
        }
    }

    if table.row_iter().next().is_none() {
        return "Nothing to show.".to_string();
    }
    table.to_string()
}

/// Format configured bundles with their members
pub fn format_bundles(config: &PricingConfig, service: Option<&str>, no_color: bool) -> String {
    let services: Vec<&str> = match service {
        Some(s) => vec![s],
        None => config.bundles.keys().map(String::as_str).collect(),
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    header(&mut table, &["Service", "Bundle", "Members"], no_color);

    for service in services {
        for (name, members) in config.bundles_for(Some(service)) {
            table.add_row(Row::from(vec![
                Cell::new(service),
                Cell::new(name),
                Cell::new(members.join("\n")),
            ]));
        }
    }

    if table.row_iter().next().is_none() {
        return match service {
            Some(s) => format!("No bundles configured for '{}'.", s),
            None => "No bundles configured.".to_string(),
        };
    }
    table.to_string()
}

/// Print load warnings and errors to stderr
pub fn print_report(report: &LoadReport) {
    eprint!("{}", format_report(report));
}

fn format_report(report: &LoadReport) -> String {
    if !report.has_errors() {
        return String::new();
    }

    let (warnings, errors) = report.error_count();
    let mut lines = vec![format!(
        "Loaded with {} warnings and {} errors ({} input values adjusted):",
        warnings, errors, report.values_coerced
    )];
    for error in &report.errors {
        lines.push(format!("  - {}: {}", error.source, error.message));
        if let Some(suggestion) = &error.suggestion {
            lines.push(format!("    {}", suggestion));
        }
    }
    lines.join("\n") + "\n"
}

// ============================================================================
// Utilities
// ============================================================================

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================
