//! Priced catalog rows

use serde::{Deserialize, Serialize};

/// Source label used when the catalog has no `Source` column
pub const DEFAULT_SOURCE: &str = "Data";

/// One priced specification row from the catalog
///
/// The catalog parser and the builder setters keep every rate finite and
/// non-negative. Fields are public, so pricing clamps them again before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Specification 1, e.g. "AU14: AUX_SURELOC"
    pub code: String,
    pub reference: String,
    /// Specification 2
    pub description: String,
    pub daily_rate: f64,
    pub monthly_rate: f64,
    pub depth_charge_per_ft: f64,
    pub flat_charge: f64,
    pub survey_charge_per_ft: f64,
    pub hourly_charge: f64,
    pub package: String,
    pub service_name: String,
    pub source: String,
}

impl LineItem {
    /// Create an item with every rate at 0
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reference: String::new(),
            description: String::new(),
            daily_rate: 0.0,
            monthly_rate: 0.0,
            depth_charge_per_ft: 0.0,
            flat_charge: 0.0,
            survey_charge_per_ft: 0.0,
            hourly_charge: 0.0,
            package: String::new(),
            service_name: String::new(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    pub fn with_scope(
        mut self,
        package: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        self.package = package.into();
        self.service_name = service_name.into();
        self
    }

    pub fn with_rental_rates(mut self, daily: f64, monthly: f64) -> Self {
        self.daily_rate = sanitize_amount(daily);
        self.monthly_rate = sanitize_amount(monthly);
        self
    }

    pub fn with_depth_charge(mut self, per_ft: f64) -> Self {
        self.depth_charge_per_ft = sanitize_amount(per_ft);
        self
    }

    pub fn with_flat_charge(mut self, flat: f64) -> Self {
        self.flat_charge = sanitize_amount(flat);
        self
    }

    pub fn with_survey_charge(mut self, per_ft: f64) -> Self {
        self.survey_charge_per_ft = sanitize_amount(per_ft);
        self
    }

    pub fn with_hourly_charge(mut self, hourly: f64) -> Self {
        self.hourly_charge = sanitize_amount(hourly);
        self
    }

    /// Default value of the "bill flat charge" flag for this item
    pub fn has_flat_charge(&self) -> bool {
        self.flat_charge > 0.0
    }
}

/// Clamp a monetary or operational quantity to a finite non-negative value
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
