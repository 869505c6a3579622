//! Data models for wellcost

pub mod catalog;
pub mod charge;
pub mod config;
pub mod line_item;
pub mod section;

pub use catalog::{Catalog, CatalogView};
pub use charge::{ChargeLine, ChargeStatus, EstimateResult, SectionResult, DEFAULT_CURRENCY};
pub use config::{BundleSet, PricingConfig, PricingOverlay};
pub use line_item::{LineItem, DEFAULT_SOURCE};
pub use section::{SectionInput, SectionParams};
