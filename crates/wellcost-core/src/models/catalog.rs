//! In-memory catalog of priced line items

use super::LineItem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Table of line items loaded once per estimate
///
/// Rows keep the order they had in the source file. The same code may appear
/// on several rows; lookups return every one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Label of the file the rows came from (file name)
    pub source: String,
    items: Vec<LineItem>,
}

impl Catalog {
    pub fn new(source: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            source: source.into(),
            items,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct non-empty package names, in first-seen order
    pub fn packages(&self) -> Vec<&str> {
        distinct(self.items.iter().map(|item| item.package.as_str()))
    }

    /// Distinct service names offered by `package`, in first-seen order
    pub fn services(&self, package: &str) -> Vec<&str> {
        distinct(
            self.items
                .iter()
                .filter(|item| item.package == package)
                .map(|item| item.service_name.as_str()),
        )
    }

    /// Distinct codes within an optional package/service scope
    pub fn codes(&self, package: Option<&str>, service: Option<&str>) -> Vec<&str> {
        distinct(self.view(package, service).rows().iter().map(|item| item.code.as_str()))
    }

    /// Rows restricted to a package and/or service name
    ///
    /// `None` leaves that dimension unfiltered.
    pub fn view(&self, package: Option<&str>, service: Option<&str>) -> CatalogView<'_> {
        let rows = self
            .items
            .iter()
            .filter(|item| package.is_none_or(|p| item.package == p))
            .filter(|item| service.is_none_or(|s| item.service_name == s))
            .collect();
        CatalogView { rows }
    }
}

/// Borrowed, filtered slice of a catalog that section lookups run against
#[derive(Debug, Clone)]
pub struct CatalogView<'a> {
    rows: Vec<&'a LineItem>,
}

impl<'a> CatalogView<'a> {
    pub fn rows(&self) -> &[&'a LineItem] {
        &self.rows
    }

    /// All rows carrying `code`, in catalog order
    pub fn matching<'s>(&'s self, code: &'s str) -> impl Iterator<Item = &'a LineItem> + 's {
        self.rows.iter().copied().filter(move |item| item.code == code)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            "rates.json",
            vec![
                LineItem::new("GR1: GR_TOTL").with_scope("Wireline", "STANDARD WELLS"),
                LineItem::new("AU14: AUX_SURELOC").with_scope("Wireline", "STANDARD WELLS"),
                LineItem::new("GR1: GR_TOTL").with_scope("Wireline", "HT WELLS"),
                LineItem::new("TC1: TCP_GUN").with_scope("Perforation", "TCP"),
            ],
        )
    }

    #[test]
    fn test_packages_first_seen_order() {
        assert_eq!(sample().packages(), vec!["Wireline", "Perforation"]);
    }

    #[test]
    fn test_services_within_package() {
        let catalog = sample();
        assert_eq!(catalog.services("Wireline"), vec!["STANDARD WELLS", "HT WELLS"]);
        assert!(catalog.services("Coiled Tubing").is_empty());
    }

    #[test]
    fn test_codes_deduplicated() {
        let catalog = sample();
        assert_eq!(
            catalog.codes(Some("Wireline"), None),
            vec!["GR1: GR_TOTL", "AU14: AUX_SURELOC"]
        );
        assert_eq!(catalog.codes(None, Some("TCP")), vec!["TC1: TCP_GUN"]);
    }

    #[test]
    fn test_view_matching_keeps_every_row() {
        let catalog = sample();
        let view = catalog.view(Some("Wireline"), None);
        assert_eq!(view.rows().len(), 3);
        assert_eq!(view.matching("GR1: GR_TOTL").count(), 2);
        assert_eq!(view.matching("missing").count(), 0);
    }
}
