//! Parsers for wellcost input files

pub mod catalog;
pub mod config;
pub mod estimate;

pub use catalog::{coerce_number, CatalogFormat, CatalogParser, DATA_SHEET};
pub use config::ConfigParser;
pub use estimate::{EstimateDefinition, EstimateParser};
