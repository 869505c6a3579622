//! Pricing config parser
//!
//! A TOML file overlays the built-in rules:
//!
//! ```toml
//! unique_tools = ["AU14: AUX_SURELOC"]
//!
//! [bundles."STANDARD WELLS"]
//! "XL Rock (150DegC Max)" = ["AU14: AUX_SURELOC", "SC2: SC_ADD1", "SC2: SC_ADD2"]
//! ```

use crate::error::{CoreError, LoadError, LoadReport};
use crate::models::{PricingConfig, PricingOverlay};
use crate::pricing::default_pricing;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parser for pricing config files
pub struct ConfigParser;

impl Default for ConfigParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigParser {
    pub fn new() -> Self {
        Self
    }

    /// `<config dir>/wellcost/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wellcost").join("config.toml"))
    }

    /// Parse a single config file
    pub fn parse(&self, path: &Path) -> Result<PricingOverlay, CoreError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_read(path, e))?;
        self.parse_str(&content, path)
    }

    pub fn parse_str(&self, content: &str, path: &Path) -> Result<PricingOverlay, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
            source: e,
        })
    }

    /// Built-in rules overlaid with `path`, degrading to the built-ins on any error
    pub fn load_graceful(&self, path: Option<&Path>, report: &mut LoadReport) -> PricingConfig {
        let base = default_pricing();
        let Some(path) = path else {
            return base;
        };

        match self.parse(path) {
            Ok(overlay) => {
                validate_overlay(&overlay, path, report);
                debug!(?path, "Loaded pricing config");
                base.overlay(overlay)
            }
            Err(CoreError::FileNotFound { .. }) => {
                debug!(?path, "Pricing config not found, using built-in rules");
                base
            }
            Err(e) => {
                warn!(?path, error = %e, "Invalid pricing config, using built-in rules");
                report.add_error(LoadError::from_core_error("config", &e));
                base
            }
        }
    }
}

fn validate_overlay(overlay: &PricingOverlay, path: &Path, report: &mut LoadReport) {
    let source = path.display().to_string();

    if let Some(bundles) = &overlay.bundles {
        for (service, set) in bundles {
            for (name, members) in set {
                if members.is_empty() {
                    report.add_warning(
                        &source,
                        format!("Bundle '{}' of service '{}' has no members", name, service),
                    );
                }
            }
        }
    }

    if let Some(unique) = &overlay.unique_tools {
        if unique.iter().any(|code| code.trim().is_empty()) {
            report.add_warning(&source, "unique_tools contains a blank code");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::embedded::{STANDARD_WELLS, SURELOC};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_overlay() {
        let overlay = ConfigParser::new()
            .parse_str(
                r#"
unique_tools = ["AU14: AUX_SURELOC", "DT3: RTDT_PER"]

[bundles."HT WELLS"]
"HT Triple Combo" = ["GR1: GR_TOTL", "NE1: NEUT_THER", "NE1: NEUT_THER"]
"#,
                Path::new("config.toml"),
            )
            .unwrap();

        let config = default_pricing().overlay(overlay);
        assert!(config.is_unique_tool("DT3: RTDT_PER"));
        let ht = config.bundles_for(Some("HT WELLS"));
        assert_eq!(ht["HT Triple Combo"].len(), 3);
        // Untouched services keep their bundles
        assert_eq!(config.bundles_for(Some(STANDARD_WELLS)).len(), 5);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let mut report = LoadReport::new();
        let config =
            ConfigParser::new().load_graceful(Some(&temp.path().join("config.toml")), &mut report);

        assert_eq!(config, default_pricing());
        assert!(!report.has_errors());
    }

    #[test]
    fn test_invalid_toml_reported_and_defaults_used() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "unique_tools = [unterminated").unwrap();

        let mut report = LoadReport::new();
        let config = ConfigParser::new().load_graceful(Some(&path), &mut report);

        assert!(config.is_unique_tool(SURELOC));
        assert_eq!(report.error_count().1, 1);
    }

    #[test]
    fn test_empty_bundle_warns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[bundles.\"HT WELLS\"]\n\"Empty\" = []\n").unwrap();

        let mut report = LoadReport::new();
        let config = ConfigParser::new().load_graceful(Some(&path), &mut report);

        assert_eq!(report.error_count(), (1, 0));
        assert!(config.bundles_for(Some("HT WELLS")).contains_key("Empty"));
    }

    #[test]
    fn test_no_path_means_defaults() {
        let mut report = LoadReport::new();
        let config = ConfigParser::new().load_graceful(None, &mut report);
        assert_eq!(config, default_pricing());
    }
}
