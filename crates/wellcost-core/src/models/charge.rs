//! Computed charges: per line, per section, per estimate

use super::{LineItem, SectionParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency label used when an estimate does not name one
pub const DEFAULT_CURRENCY: &str = "MYR";

/// Billing outcome of a single resolved line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Charged,
    /// Globally-unique tool already billed earlier in the estimate
    DuplicateNotCharged,
}

impl ChargeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChargeStatus::Charged => "Charged",
            ChargeStatus::DuplicateNotCharged => "Duplicate - Not charged",
        }
    }
}

impl fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Charge computed for one resolved catalog row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub item: LineItem,
    /// Bundle the code was expanded from, `None` when picked directly
    pub bundle: Option<String>,
    /// Which pick of that bundle, so two picks in a row stay separate groups
    #[serde(default)]
    pub bundle_instance: Option<usize>,
    /// Whether the flat charge entered the operating charge
    pub flat_charge_billed: bool,
    pub is_duplicate_unique_tool: bool,
    pub status: ChargeStatus,
    pub operating_charge: f64,
    pub rental_charge: f64,
    pub total: f64,
}

impl ChargeLine {
    pub fn code(&self) -> &str {
        &self.item.code
    }

    pub fn is_charged(&self) -> bool {
        self.status == ChargeStatus::Charged
    }
}

/// Priced hole section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    pub hole_size: String,
    pub package: Option<String>,
    pub service_name: Option<String>,
    /// Sanitized parameters the charges were computed with
    pub params: SectionParams,
    /// Bundle names expanded for this section, in selection order
    pub used_bundles: Vec<String>,
    pub lines: Vec<ChargeLine>,
    pub section_total: f64,
}

impl SectionResult {
    pub fn operating_total(&self) -> f64 {
        self.lines.iter().map(|l| l.operating_charge).sum()
    }

    pub fn rental_total(&self) -> f64 {
        self.lines.iter().map(|l| l.rental_charge).sum()
    }

    pub fn duplicate_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.is_duplicate_unique_tool)
            .count()
    }
}

/// Priced estimate: every section in processing order plus the grand total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub currency: String,
    pub sections: Vec<SectionResult>,
    pub grand_total: f64,
}

impl EstimateResult {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    pub fn charged_line_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| &s.lines)
            .filter(|l| l.is_charged())
            .count()
    }

    pub fn duplicate_line_count(&self) -> usize {
        self.sections.iter().map(|s| s.duplicate_count()).sum()
    }

    pub fn section(&self, hole_size: &str) -> Option<&SectionResult> {
        self.sections.iter().find(|s| s.hole_size == hole_size)
    }
}
