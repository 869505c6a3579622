//! Charge calculation for resolved line items
//!
//! # Formula
//!
//! ```text
//! operating = (depth_rate × depth + survey_rate × survey
//!              + flat × bill_flat + hourly × hours) × (1 − discount)
//! rental    = quantity × (daily × days + monthly × months) × (1 − discount)
//! total     = operating + rental
//! ```
//!
//! Every rate is clamped to a finite non-negative value before use. The flat
//! charge is billed once per occurrence and is not scaled by quantity. Globally-unique tools are billed on their first occurrence in
//! the estimate only; every later occurrence has both charges zeroed.

use super::lookup::ResolvedItem;
use super::tracker::UniquenessTracker;
use crate::models::line_item::sanitize_amount;
use crate::models::{ChargeLine, ChargeStatus, LineItem, SectionInput, SectionParams, SectionResult};
use std::collections::BTreeSet;
use tracing::debug;

/// Operating charge for one occurrence of `item`
pub fn operating_charge(item: &LineItem, params: &SectionParams, bill_flat: bool) -> f64 {
    let flat = if bill_flat {
        sanitize_amount(item.flat_charge)
    } else {
        0.0
    };

    (sanitize_amount(item.depth_charge_per_ft) * params.total_depth
        + sanitize_amount(item.survey_charge_per_ft) * params.total_survey
        + flat
        + sanitize_amount(item.hourly_charge) * params.total_hours)
        * params.discount_factor()
}

/// Rental charge for one occurrence of `item`
pub fn rental_charge(item: &LineItem, params: &SectionParams) -> f64 {
    f64::from(params.quantity_of_tools)
        * (sanitize_amount(item.daily_rate) * params.total_days
            + sanitize_amount(item.monthly_rate) * params.total_months)
        * params.discount_factor()
}

/// Price every resolved item of one section, in order
///
/// Consults and updates `tracker` for codes in `unique_tools`. This is the
/// only side effect.
pub fn compute_section(
    resolved: &[ResolvedItem<'_>],
    input: &SectionInput,
    unique_tools: &BTreeSet<String>,
    tracker: &mut UniquenessTracker,
) -> SectionResult {
    let params = input.params.sanitized();

    let lines: Vec<ChargeLine> = resolved
        .iter()
        .map(|resolved| {
            let item = resolved.item;
            let bill_flat = input.bills_flat_charge(&item.code, item.has_flat_charge());
            let mut operating = operating_charge(item, &params, bill_flat);
            let mut rental = rental_charge(item, &params);
            let mut status = ChargeStatus::Charged;

            if unique_tools.contains(&item.code) {
                if tracker.consult(&item.code) {
                    debug!(
                        code = %item.code,
                        hole_size = %input.hole_size,
                        "Unique tool already billed, zeroing charges"
                    );
                    operating = 0.0;
                    rental = 0.0;
                    status = ChargeStatus::DuplicateNotCharged;
                } else {
                    tracker.mark_billed(&item.code);
                }
            }

            ChargeLine {
                item: item.clone(),
                bundle: resolved.bundle.map(str::to_string),
                bundle_instance: resolved.bundle_instance,
                flat_charge_billed: bill_flat && item.flat_charge > 0.0,
                is_duplicate_unique_tool: status == ChargeStatus::DuplicateNotCharged,
                status,
                operating_charge: operating,
                rental_charge: rental,
                total: operating + rental,
            }
        })
        .collect();

    let section_total = lines.iter().map(|l| l.total).sum();

    SectionResult {
        hole_size: input.hole_size.clone(),
        package: input.package.clone(),
        service_name: input.service_name.clone(),
        params,
        used_bundles: Vec::new(),
        lines,
        section_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn logging_params() -> SectionParams {
        SectionParams {
            quantity_of_tools: 2,
            total_days: 3.0,
            total_months: 0.0,
            total_depth: 1000.0,
            total_survey: 0.0,
            total_hours: 0.0,
            discount: 0.1,
        }
    }

    fn logging_tool() -> LineItem {
        LineItem::new("GR1: GR_TOTL")
            .with_rental_rates(100.0, 0.0)
            .with_depth_charge(2.0)
            .with_flat_charge(500.0)
    }

    fn unique() -> BTreeSet<String> {
        BTreeSet::from(["U".to_string()])
    }

    #[test]
    fn test_charge_formula() {
        let item = logging_tool();
        let params = logging_params();

        // (2 × 1000 + 500) × 0.9
        approx(operating_charge(&item, &params, true), 2250.0);
        // 2 × (100 × 3) × 0.9
        approx(rental_charge(&item, &params), 540.0);
    }

    #[test]
    fn test_section_total_from_formula() {
        let item = logging_tool();
        let input = SectionInput::new("12.25", logging_params());
        let resolved = [ResolvedItem {
            item: &item,
            bundle: None,
            bundle_instance: None,
        }];

        let mut tracker = UniquenessTracker::new();
        let result = compute_section(&resolved, &input, &unique(), &mut tracker);

        assert_eq!(result.lines.len(), 1);
        approx(result.lines[0].total, 2790.0);
        approx(result.section_total, 2790.0);
        assert!(result.lines[0].flat_charge_billed);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_flat_charge_not_scaled_by_quantity() {
        let item = LineItem::new("X").with_flat_charge(500.0);
        let params = SectionParams {
            quantity_of_tools: 10,
            ..SectionParams::zero()
        };
        approx(operating_charge(&item, &params, true), 500.0);
    }

    #[test]
    fn test_flat_charge_override_suppresses_flat() {
        let item = logging_tool();
        let input = SectionInput::new("12.25", logging_params())
            .with_flat_charge_override("GR1: GR_TOTL", false);
        let resolved = [ResolvedItem {
            item: &item,
            bundle: None,
            bundle_instance: None,
        }];

        let result = compute_section(&resolved, &input, &unique(), &mut UniquenessTracker::new());
        // (2 × 1000) × 0.9
        approx(result.lines[0].operating_charge, 1800.0);
        assert!(!result.lines[0].flat_charge_billed);
    }

    #[test]
    fn test_survey_and_hourly_components() {
        let item = LineItem::new("S").with_survey_charge(1.5).with_hourly_charge(40.0);
        let params = SectionParams {
            total_survey: 200.0,
            total_hours: 5.0,
            ..SectionParams::zero()
        };
        approx(operating_charge(&item, &params, false), 500.0);
    }

    #[test]
    fn test_intra_section_duplicate_collapse() {
        let tool = LineItem::new("U").with_rental_rates(0.0, 1000.0);
        let input = SectionInput::new(
            "8.5",
            SectionParams {
                quantity_of_tools: 1,
                total_months: 1.0,
                ..SectionParams::zero()
            },
        );
        let resolved = [
            ResolvedItem {
                item: &tool,
                bundle: Some("Pair"),
                bundle_instance: Some(0),
            },
            ResolvedItem {
                item: &tool,
                bundle: Some("Pair"),
                bundle_instance: Some(0),
            },
        ];

        let mut tracker = UniquenessTracker::new();
        let result = compute_section(&resolved, &input, &unique(), &mut tracker);

        assert_eq!(result.lines[0].status, ChargeStatus::Charged);
        assert_eq!(result.lines[1].status, ChargeStatus::DuplicateNotCharged);
        assert!(result.lines[1].is_duplicate_unique_tool);
        assert_eq!(result.lines[1].total, 0.0);
        approx(result.section_total, 1000.0);
        assert!(tracker.consult("U"));
    }

    #[test]
    fn test_previously_billed_unique_tool_is_free() {
        let tool = LineItem::new("U").with_depth_charge(5.0);
        let input = SectionInput::new("8.5", logging_params());
        let resolved = [ResolvedItem {
            item: &tool,
            bundle: None,
            bundle_instance: None,
        }];

        let mut tracker = UniquenessTracker::new();
        tracker.mark_billed("U");
        let result = compute_section(&resolved, &input, &unique(), &mut tracker);

        assert_eq!(result.lines[0].operating_charge, 0.0);
        assert_eq!(result.lines[0].rental_charge, 0.0);
        assert_eq!(result.section_total, 0.0);
    }

    #[test]
    fn test_non_unique_repeats_all_charged() {
        let tool = LineItem::new("AU2: AUX_PCAL").with_rental_rates(10.0, 0.0);
        let input = SectionInput::new(
            "8.5",
            SectionParams {
                quantity_of_tools: 1,
                total_days: 1.0,
                ..SectionParams::zero()
            },
        );
        let resolved = [
            ResolvedItem {
                item: &tool,
                bundle: None,
                bundle_instance: None,
            },
            ResolvedItem {
                item: &tool,
                bundle: None,
                bundle_instance: None,
            },
        ];

        let result = compute_section(&resolved, &input, &unique(), &mut UniquenessTracker::new());
        assert!(result.lines.iter().all(|l| l.is_charged()));
        approx(result.section_total, 20.0);
    }

    #[test]
    fn test_bad_rates_set_directly_charge_nothing() {
        let mut item = logging_tool();
        item.daily_rate = -100.0;
        item.depth_charge_per_ft = f64::NAN;
        item.flat_charge = -500.0;
        item.hourly_charge = f64::INFINITY;
        let params = SectionParams {
            total_hours: 2.0,
            ..logging_params()
        };

        assert_eq!(operating_charge(&item, &params, true), 0.0);
        assert_eq!(rental_charge(&item, &params), 0.0);
    }

    #[test]
    fn test_full_discount_zeroes_charges() {
        let item = logging_tool();
        let params = SectionParams {
            discount: 1.0,
            ..logging_params()
        };
        assert_eq!(operating_charge(&item, &params, true), 0.0);
        assert_eq!(rental_charge(&item, &params), 0.0);
    }
}
