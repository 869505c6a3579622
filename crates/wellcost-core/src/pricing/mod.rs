//! Pricing rule engine
//!
//! Pipeline for one section, run in section order:
//!
//! 1. [`expander::expand`] turns bundle names into their member codes
//! 2. [`lookup::resolve`] picks the catalog rows for those codes
//! 3. [`calculator::compute_section`] prices each row, consulting the
//!    estimate's [`UniquenessTracker`]
//!
//! [`aggregate`] then sums section totals into the grand total.

pub mod calculator;
pub mod embedded;
pub mod expander;
pub mod lookup;
pub mod tracker;

pub use calculator::{compute_section, operating_charge, rental_charge};
pub use embedded::{default_pricing, DEFAULT_PRICING};
pub use expander::{expand, ExpandedCode, Expansion};
pub use lookup::{resolve, ResolvedItem};
pub use tracker::UniquenessTracker;

use crate::models::{
    Catalog, EstimateResult, PricingConfig, SectionInput, SectionResult, DEFAULT_CURRENCY,
};

/// Run the whole pipeline for one section
pub fn price_section(
    input: &SectionInput,
    catalog: &Catalog,
    config: &PricingConfig,
    tracker: &mut UniquenessTracker,
) -> SectionResult {
    let bundles = config.bundles_for(input.service_name.as_deref());
    let expansion = expand(&input.selected_codes, bundles);
    let view = catalog.view(input.package.as_deref(), input.service_name.as_deref());
    let resolved = resolve(&expansion, &view);

    tracing::debug!(
        hole_size = %input.hole_size,
        selected = input.selected_codes.len(),
        expanded = expansion.len(),
        resolved = resolved.len(),
        "Pricing section"
    );

    let mut result = compute_section(&resolved, input, &config.unique_tools, tracker);
    result.used_bundles = expansion.used_bundles.clone();
    result
}

/// Sum section totals into an estimate
pub fn aggregate(sections: Vec<SectionResult>) -> EstimateResult {
    let grand_total = sections.iter().map(|s| s.section_total).sum();
    EstimateResult {
        currency: DEFAULT_CURRENCY.to_string(),
        sections,
        grand_total,
    }
}
