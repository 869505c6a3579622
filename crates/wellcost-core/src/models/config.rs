//! Pricing configuration: bundles and globally-unique tools

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Bundle name -> ordered member codes, for one service
///
/// A member may repeat; each repetition is one more unit of that tool.
pub type BundleSet = BTreeMap<String, Vec<String>>;

static NO_BUNDLES: BundleSet = BTreeMap::new();

/// Typed pricing rules, built once per estimate and never mutated afterwards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Service name -> bundles offered for that service
    #[serde(default)]
    pub bundles: BTreeMap<String, BundleSet>,

    /// Codes billable at most once across a whole estimate
    #[serde(default)]
    pub unique_tools: BTreeSet<String>,
}

impl PricingConfig {
    /// Bundles for `service`, empty when the service has none or is unset
    pub fn bundles_for(&self, service: Option<&str>) -> &BundleSet {
        service
            .and_then(|s| self.bundles.get(s))
            .unwrap_or(&NO_BUNDLES)
    }

    pub fn is_unique_tool(&self, code: &str) -> bool {
        self.unique_tools.contains(code)
    }

    /// Apply a partial override on top of this config
    ///
    /// A service present in the overlay replaces that service's bundles
    /// wholesale. `unique_tools`, when given, replaces the set.
    pub fn overlay(mut self, overlay: PricingOverlay) -> Self {
        if let Some(bundles) = overlay.bundles {
            for (service, set) in bundles {
                self.bundles.insert(service, set);
            }
        }
        if let Some(unique) = overlay.unique_tools {
            self.unique_tools = unique;
        }
        self
    }

    /// Total number of bundles across all services
    pub fn bundle_count(&self) -> usize {
        self.bundles.values().map(|set| set.len()).sum()
    }
}

/// Partial pricing config as written in a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingOverlay {
    #[serde(default)]
    pub bundles: Option<BTreeMap<String, BundleSet>>,

    #[serde(default)]
    pub unique_tools: Option<BTreeSet<String>>,
}
