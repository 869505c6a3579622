//! Estimate building
//!
//! [`Estimator`] holds the catalog and pricing rules. Each estimate is built
//! by an [`EstimateBuilder`] that owns its own [`UniquenessTracker`], so two
//! estimates never share billed-tool state. A builder borrows the estimator,
//! which means the catalog cannot be swapped while an estimate is open.

use crate::models::{
    Catalog, EstimateResult, PricingConfig, SectionInput, SectionResult, DEFAULT_CURRENCY,
};
use crate::pricing::{aggregate, price_section, UniquenessTracker};
use tracing::{debug, info};

/// Catalog plus pricing rules, shared by every estimate built from them
#[derive(Debug, Clone)]
pub struct Estimator {
    catalog: Catalog,
    config: PricingConfig,
    currency: String,
}

impl Estimator {
    pub fn new(catalog: Catalog, config: PricingConfig) -> Self {
        Self {
            catalog,
            config,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Replace the catalog
    ///
    /// Returns true when the new catalog comes from a different source. Open
    /// builders cannot outlive this call, so their tracker state is gone
    /// either way.
    pub fn load_catalog(&mut self, catalog: Catalog) -> bool {
        let changed = catalog.source != self.catalog.source;
        if changed {
            info!(
                from = %self.catalog.source,
                to = %catalog.source,
                "Catalog source changed, unique-tool tracking starts over"
            );
        }
        self.catalog = catalog;
        changed
    }

    /// Start a new, empty estimate
    pub fn builder(&self) -> EstimateBuilder<'_> {
        EstimateBuilder {
            estimator: self,
            tracker: UniquenessTracker::new(),
            sections: Vec::new(),
        }
    }

    /// Price `sections` in order as one estimate
    pub fn build(&self, sections: &[SectionInput]) -> EstimateResult {
        let mut builder = self.builder();
        for section in sections {
            builder.price_section(section);
        }
        builder.finish()
    }
}

/// One estimate in progress
#[derive(Debug)]
pub struct EstimateBuilder<'a> {
    estimator: &'a Estimator,
    tracker: UniquenessTracker,
    sections: Vec<SectionResult>,
}

impl<'a> EstimateBuilder<'a> {
    /// Price the next section
    ///
    /// Sections must be fed in presentation order: a unique tool is billed in
    /// the first section that uses it.
    pub fn price_section(&mut self, input: &SectionInput) -> &SectionResult {
        let result = price_section(
            input,
            &self.estimator.catalog,
            &self.estimator.config,
            &mut self.tracker,
        );
        debug!(
            hole_size = %result.hole_size,
            lines = result.lines.len(),
            duplicates = result.duplicate_count(),
            total = result.section_total,
            "Section priced"
        );
        self.sections.push(result);
        &self.sections[self.sections.len() - 1]
    }

    /// Discard the sections priced so far and clear billed unique tools
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.sections.clear();
    }

    pub fn tracker(&self) -> &UniquenessTracker {
        &self.tracker
    }

    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    /// Sum of the sections priced so far
    pub fn running_total(&self) -> f64 {
        self.sections.iter().map(|s| s.section_total).sum()
    }

    pub fn finish(self) -> EstimateResult {
        aggregate(self.sections).with_currency(self.estimator.currency.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChargeStatus, LineItem, SectionParams};
    use crate::pricing::default_pricing;
    use crate::pricing::embedded::SURELOC;

    fn estimator() -> Estimator {
        Estimator::new(
            Catalog::new(
                "rates.json",
                vec![
                    LineItem::new(SURELOC).with_rental_rates(0.0, 1000.0),
                    LineItem::new("GR1: GR_TOTL").with_rental_rates(0.0, 200.0),
                ],
            ),
            default_pricing(),
        )
    }

    fn one_month(hole_size: &str, quantity: u32) -> SectionInput {
        SectionInput::new(
            hole_size,
            SectionParams {
                quantity_of_tools: quantity,
                total_months: 1.0,
                ..SectionParams::zero()
            },
        )
    }

    #[test]
    fn test_unique_tool_billed_in_first_section_only() {
        let estimator = estimator();
        let estimate = estimator.build(&[
            one_month("12.25", 1).with_codes([SURELOC, "GR1: GR_TOTL"]),
            one_month("8.5", 3).with_codes([SURELOC, "GR1: GR_TOTL"]),
        ]);

        let first = estimate.section("12.25").unwrap();
        assert_eq!(first.lines[0].status, ChargeStatus::Charged);
        assert_eq!(first.section_total, 1200.0);

        let second = estimate.section("8.5").unwrap();
        assert_eq!(second.lines[0].status, ChargeStatus::DuplicateNotCharged);
        assert_eq!(second.lines[0].total, 0.0);
        assert_eq!(second.section_total, 600.0);

        assert_eq!(estimate.grand_total, 1800.0);
        assert_eq!(estimate.duplicate_line_count(), 1);
        assert_eq!(estimate.charged_line_count(), 3);
    }

    #[test]
    fn test_section_order_decides_which_occurrence_is_billed() {
        let estimator = estimator();
        let estimate = estimator.build(&[
            one_month("8.5", 3).with_codes([SURELOC]),
            one_month("12.25", 1).with_codes([SURELOC]),
        ]);

        assert_eq!(estimate.sections[0].section_total, 3000.0);
        assert_eq!(estimate.sections[1].section_total, 0.0);
    }

    #[test]
    fn test_separate_estimates_do_not_share_tracker() {
        let estimator = estimator();
        let sections = [one_month("12.25", 1).with_codes([SURELOC])];

        let first = estimator.build(&sections);
        let second = estimator.build(&sections);
        assert_eq!(first.grand_total, 1000.0);
        assert_eq!(second.grand_total, 1000.0);
    }

    #[test]
    fn test_builder_reset_discards_estimate() {
        let estimator = estimator();
        let mut builder = estimator.builder();
        builder.price_section(&one_month("12.25", 1).with_codes([SURELOC]));
        assert!(builder.tracker().consult(SURELOC));

        builder.reset();
        assert!(!builder.tracker().consult(SURELOC));
        assert!(builder.sections().is_empty());

        let section = builder.price_section(&one_month("8.5", 1).with_codes([SURELOC]));
        assert_eq!(section.lines[0].status, ChargeStatus::Charged);
        assert_eq!(builder.running_total(), 1000.0);
    }

    #[test]
    fn test_unresolvable_code_contributes_nothing() {
        let estimator = estimator();
        let estimate =
            estimator.build(&[one_month("12.25", 1).with_codes(["GHOST", "GR1: GR_TOTL"])]);

        assert_eq!(estimate.line_count(), 1);
        assert_eq!(estimate.grand_total, 200.0);
    }

    #[test]
    fn test_load_catalog_reports_source_change() {
        let mut estimator = estimator();
        assert!(!estimator.load_catalog(Catalog::new("rates.json", Vec::new())));
        assert!(estimator.load_catalog(Catalog::new("rates-2026.json", Vec::new())));
        assert_eq!(estimator.catalog().source, "rates-2026.json");
    }

    #[test]
    fn test_currency_carried_to_result() {
        let estimator = estimator().with_currency("USD");
        let estimate = estimator.build(&[]);
        assert_eq!(estimate.currency, "USD");
        assert_eq!(estimate.grand_total, 0.0);
    }
}
