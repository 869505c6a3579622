//! User input for one hole section

use super::line_item::sanitize_amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operational parameters shared by every line item of a section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    pub quantity_of_tools: u32,
    pub total_days: f64,
    pub total_months: f64,
    /// Feet
    pub total_depth: f64,
    /// Feet
    pub total_survey: f64,
    pub total_hours: f64,
    /// Fraction in [0, 1]
    pub discount: f64,
}

impl Default for SectionParams {
    /// Form defaults: two tools on a one month rental logging 5500 ft
    fn default() -> Self {
        Self {
            quantity_of_tools: 2,
            total_days: 0.0,
            total_months: 1.0,
            total_depth: 5500.0,
            total_survey: 0.0,
            total_hours: 0.0,
            discount: 0.0,
        }
    }
}

impl SectionParams {
    /// Every parameter at zero, no discount
    pub fn zero() -> Self {
        Self {
            quantity_of_tools: 0,
            total_days: 0.0,
            total_months: 0.0,
            total_depth: 0.0,
            total_survey: 0.0,
            total_hours: 0.0,
            discount: 0.0,
        }
    }

    /// Copy with every numeric parameter finite and non-negative, discount in [0, 1]
    pub fn sanitized(&self) -> Self {
        Self {
            quantity_of_tools: self.quantity_of_tools,
            total_days: sanitize_amount(self.total_days),
            total_months: sanitize_amount(self.total_months),
            total_depth: sanitize_amount(self.total_depth),
            total_survey: sanitize_amount(self.total_survey),
            total_hours: sanitize_amount(self.total_hours),
            discount: sanitize_amount(self.discount).min(1.0),
        }
    }

    /// Multiplier applied to both charge components
    pub fn discount_factor(&self) -> f64 {
        1.0 - sanitize_amount(self.discount).min(1.0)
    }
}

/// One hole section: its parameters and the codes/bundles the user picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInput {
    /// Nominal hole size identifier, e.g. "12.25"
    pub hole_size: String,
    pub package: Option<String>,
    pub service_name: Option<String>,
    pub params: SectionParams,
    /// Raw codes and bundle names, in selection order
    pub selected_codes: Vec<String>,
    /// Per-code override of whether the flat charge is billed
    #[serde(default)]
    pub flat_charge_overrides: BTreeMap<String, bool>,
}

impl SectionInput {
    pub fn new(hole_size: impl Into<String>, params: SectionParams) -> Self {
        Self {
            hole_size: hole_size.into(),
            package: None,
            service_name: None,
            params,
            selected_codes: Vec::new(),
            flat_charge_overrides: BTreeMap::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service_name = Some(service.into());
        self
    }

    pub fn with_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_codes.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn with_flat_charge_override(mut self, code: impl Into<String>, billed: bool) -> Self {
        self.flat_charge_overrides.insert(code.into(), billed);
        self
    }

    /// Whether the flat charge of `code` is billed, given its catalog default
    pub fn bills_flat_charge(&self, code: &str, default: bool) -> bool {
        self.flat_charge_overrides
            .get(code)
            .copied()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_form() {
        let params = SectionParams::default();
        assert_eq!(params.quantity_of_tools, 2);
        assert_eq!(params.total_months, 1.0);
        assert_eq!(params.total_depth, 5500.0);
        assert_eq!(params.discount_factor(), 1.0);
    }

    #[test]
    fn test_sanitized_clamps_discount_and_negatives() {
        let params = SectionParams {
            total_days: -4.0,
            total_hours: f64::NAN,
            discount: 1.5,
            ..SectionParams::zero()
        }
        .sanitized();

        assert_eq!(params.total_days, 0.0);
        assert_eq!(params.total_hours, 0.0);
        assert_eq!(params.discount, 1.0);
        assert_eq!(params.discount_factor(), 0.0);
    }

    #[test]
    fn test_flat_charge_override() {
        let input = SectionInput::new("8.5", SectionParams::zero())
            .with_flat_charge_override("GR1: GR_TOTL", false);

        assert!(!input.bills_flat_charge("GR1: GR_TOTL", true));
        assert!(input.bills_flat_charge("RE1: RES_INDU", true));
        assert!(!input.bills_flat_charge("RE1: RES_INDU", false));
    }
}
