//! wellcost - Well service cost estimate calculator

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use wellcost_core::parsers::{CatalogParser, ConfigParser, EstimateParser};
use wellcost_core::{
    export_estimate_to_csv, export_estimate_to_json, export_estimate_to_markdown, Catalog,
    EstimateResult, Estimator, LoadReport, PricingConfig,
};

#[derive(Parser)]
#[command(
    name = "wellcost",
    version,
    about = "Well service cost estimate calculator",
    long_about = "Prices well logging and wireline services per hole section.\n\
                  \n\
                  Selected tools and bundles are looked up in a rate catalog, charged for\n\
                  operating (flat, depth, survey, hourly) and rental (daily, monthly) costs,\n\
                  and summed per section and for the whole estimate. Globally-unique tools\n\
                  are billed once, in the first section that uses them.\n\
                  \n\
                  Examples:\n\
                    wellcost estimate well.toml --catalog rates.json\n\
                    wellcost estimate well.toml --export out/well.csv\n\
                    wellcost catalog --package Wireline --service \"STANDARD WELLS\"\n\
                    wellcost bundles --service \"STANDARD WELLS\"\n\
                  \n\
                  Environment Variables:\n\
                    WELLCOST_CATALOG                 # Rate catalog file (.json, .yaml, .yml)\n\
                    WELLCOST_CONFIG                  # Pricing config overlay (.toml)\n\
                    WELLCOST_FORMAT                  # Force output format: json|table\n\
                    WELLCOST_NO_COLOR                # Disable ANSI colors (log-friendly)\n\
                    WELLCOST_LOG                     # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Rate catalog file (.json, .yaml, .yml)
    #[arg(long, global = true, env = "WELLCOST_CATALOG")]
    catalog: Option<PathBuf>,

    /// Pricing config file (default: <config dir>/wellcost/config.toml)
    #[arg(long, global = true, env = "WELLCOST_CONFIG")]
    config: Option<PathBuf>,

    /// Force output format (json|table)
    #[arg(long, global = true, env = "WELLCOST_FORMAT", value_parser = ["json", "table"])]
    format: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "WELLCOST_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Price an estimate definition file
    Estimate {
        /// Estimate definition (.toml)
        file: PathBuf,
        /// Write the estimate to a file (.csv, .json, .md)
        #[arg(long, short = 'e')]
        export: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse packages, services and selectable tools
    Catalog {
        /// Package to list services or tools for
        #[arg(long, short = 'p')]
        package: Option<String>,
        /// Service to list bundles and tools for (requires --package)
        #[arg(long, short = 's', requires = "package")]
        service: Option<String>,
    },
    /// List configured bundles and their members
    Bundles {
        /// Only bundles for this service
        #[arg(long, short = 's')]
        service: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WELLCOST_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let json_format = cli.format.as_deref() == Some("json");
    let no_color = cli.no_color;
    let config_path = cli.config.or_else(ConfigParser::default_path);

    match cli.command {
        Command::Estimate { file, export, json } => {
            run_estimate(
                cli.catalog,
                config_path,
                &file,
                export.as_deref(),
                json || json_format,
                no_color,
            )?;
        }
        Command::Catalog { package, service } => {
            run_catalog(
                cli.catalog,
                config_path,
                package.as_deref(),
                service.as_deref(),
                no_color,
            )?;
        }
        Command::Bundles { service } => {
            run_bundles(config_path, service.as_deref(), json_format, no_color)?;
        }
    }

    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

fn load_pricing(config_path: Option<&Path>, report: &mut LoadReport) -> PricingConfig {
    ConfigParser::new().load_graceful(config_path, report)
}

fn load_catalog(catalog_path: Option<PathBuf>, report: &mut LoadReport) -> Result<Catalog> {
    let path = catalog_path.ok_or(cli::CliError::MissingCatalog)?;
    let catalog = CatalogParser::new()
        .parse(&path, report)
        .map_err(cli::CliError::from)?;
    tracing::info!(
        source = %catalog.source,
        rows = catalog.len(),
        packages = catalog.packages().len(),
        "Catalog loaded"
    );
    Ok(catalog)
}

fn export_estimate(estimate: &EstimateResult, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => export_estimate_to_csv(estimate, path),
        Some("json") => export_estimate_to_json(estimate, path),
        Some("md") => export_estimate_to_markdown(estimate, path),
        _ => bail!(
            "Unsupported export format: {} (expected .csv, .json or .md)",
            path.display()
        ),
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

fn run_estimate(
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    file: &Path,
    export: Option<&Path>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let mut report = LoadReport::new();
    let catalog = load_catalog(catalog_path, &mut report)?;
    let pricing = load_pricing(config_path.as_deref(), &mut report);

    let definition = EstimateParser::new()
        .parse(file, &mut report)
        .map_err(cli::CliError::from)
        .with_context(|| format!("Failed to load estimate: {}", file.display()))?;

    for section in &definition.sections {
        cli::check_scope(
            &catalog,
            section.package.as_deref(),
            section.service_name.as_deref(),
        )
        .with_context(|| format!("Hole section {}\"", section.hole_size))?;
    }

    if !json {
        cli::print_report(&report);
    }

    let estimator = Estimator::new(catalog, pricing).with_currency(definition.currency);
    let estimate = estimator.build(&definition.sections);

    println!("{}", cli::format_estimate(&estimate, json, no_color));

    if let Some(path) = export {
        export_estimate(&estimate, path)?;
        if !json {
            eprintln!("\nExported to {}", path.display());
        }
    }

    Ok(())
}

fn run_catalog(
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    package: Option<&str>,
    service: Option<&str>,
    no_color: bool,
) -> Result<()> {
    let mut report = LoadReport::new();
    let catalog = load_catalog(catalog_path, &mut report)?;
    let pricing = load_pricing(config_path.as_deref(), &mut report);

    cli::check_scope(&catalog, package, service)?;
    cli::print_report(&report);

    println!(
        "{}",
        cli::format_catalog_options(&catalog, &pricing, package, service, no_color)
    );
    eprintln!("\n{} rows from {}", catalog.len(), catalog.source);

    Ok(())
}

fn run_bundles(
    config_path: Option<PathBuf>,
    service: Option<&str>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let mut report = LoadReport::new();
    let pricing = load_pricing(config_path.as_deref(), &mut report);

    if json {
        let value = match service {
            Some(s) => serde_json::to_value(pricing.bundles_for(Some(s)))?,
            None => serde_json::to_value(&pricing.bundles)?,
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    cli::print_report(&report);
    println!("{}", cli::format_bundles(&pricing, service, no_color));
    eprintln!(
        "\n{} bundles, unique tools: {}",
        pricing.bundle_count(),
        pricing
            .unique_tools
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
