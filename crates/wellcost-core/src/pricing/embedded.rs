//! Built-in pricing rules
//!
//! Used when no config file is present, and as the base that a config file
//! overlays. Bundles are defined per service name; only "STANDARD WELLS"
//! ships with bundles today.

use crate::models::{BundleSet, PricingConfig};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

/// Depth-correlation tool billed once per estimate
pub const SURELOC: &str = "AU14: AUX_SURELOC";

pub const STANDARD_WELLS: &str = "STANDARD WELLS";
pub const HT_WELLS: &str = "HT WELLS";

fn members(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

/// Default rules shipped with the binary
pub static DEFAULT_PRICING: Lazy<PricingConfig> = Lazy::new(|| {
    let mut standard = BundleSet::new();

    standard.insert(
        "PEX-AIT (150DegC Max)".to_string(),
        members(&[SURELOC, "NE1: NEUT_THER", "DE1: DENS_FULL", "RE1: RES_INDU"]),
    );

    // Caliper (AU2) runs as a pair
    standard.insert(
        "DOBMI (150DegC Max)".to_string(),
        members(&[
            SURELOC,
            "GR1: GR_TOTL",
            "AU3: AUX_INCL",
            "AC3: ACOU_3",
            "AU2: AUX_PCAL",
            "AU2: AUX_PCAL",
            "PP7: PROC_PETR7",
            "PA7: PROC_ACOU6",
            "PA11: PROC_ACOU13",
            "PA12: PROC_ACOU14",
            "IM3: IMAG_SOBM",
            "PI1: PROC_IMAG1",
            "PI2: PROC_IMAG2",
            "PI7: PROC_IMAG7",
            "PI8: PROC_IMAG8",
            "PI9: PROC_IMAG9",
            "PI12: PROC_IMAG12",
            "PI13: PROC_IMAG13",
        ]),
    );

    // Dual sample carriers and dual pumps
    standard.insert(
        "MDT: LFA-QS-XLD-MIFA-Saturn-2MS (150DegC Max)".to_string(),
        members(&[
            SURELOC,
            "FP25: FPS_SCAR",
            "FP25: FPS_SCAR",
            "FP18: FPS_SAMP",
            "FP19: FPS_SPHA",
            "FP23: FPS_TRA",
            "FP24: FPS_TRK",
            "FP28: FPS_FCHA_1",
            "FP33: FPS_FCHA_6",
            "FP34: FPS_FCHA_7",
            "FP14: FPS_PUMP",
            "FP14: FPS_PUMP",
            "FP42: FPS_PROB_LD",
            "FP11: FPS_PROB_FO",
            "FP26: FPS_FCON",
            "DT3: RTDT_PER",
            "PPT12: PROC_PT12",
            "FP7: FPS_SPPT_2",
        ]),
    );

    standard.insert(
        "XL Rock (150DegC Max)".to_string(),
        members(&[SURELOC, "SC2: SC_ADD1", "SC2: SC_ADD2"]),
    );

    standard.insert(
        "XL Rock (150DegC Max) With Core Detection".to_string(),
        members(&[SURELOC, "SC2: SC_ADD1", "SC2: SC_ADD2", "SC4: SC_ADD4"]),
    );

    let mut bundles = BTreeMap::new();
    bundles.insert(STANDARD_WELLS.to_string(), standard);
    bundles.insert(HT_WELLS.to_string(), BundleSet::new());

    PricingConfig {
        bundles,
        unique_tools: BTreeSet::from([SURELOC.to_string()]),
    }
});

/// Owned copy of the default rules
pub fn default_pricing() -> PricingConfig {
    DEFAULT_PRICING.clone()
}
