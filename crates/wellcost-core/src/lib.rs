//! wellcost-core - Core library for wellcost
//!
//! Provides the catalog model, the pricing rule engine (bundle expansion,
//! unique-tool tracking, charge calculation), input parsers, the estimate
//! builder and export writers.

pub mod error;
pub mod estimate;
pub mod export;
pub mod models;
pub mod parsers;
pub mod pricing;

pub use error::{CoreError, LoadError, LoadReport};
pub use estimate::{EstimateBuilder, Estimator};
pub use export::{
    build_export_rows, export_estimate_to_csv, export_estimate_to_json,
    export_estimate_to_markdown, ExportRow,
};
pub use models::{
    Catalog, ChargeLine, ChargeStatus, EstimateResult, LineItem, PricingConfig, SectionInput,
    SectionParams, SectionResult,
};
pub use pricing::{aggregate, expand, UniquenessTracker};
