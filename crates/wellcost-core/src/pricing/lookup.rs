//! Catalog lookup for expanded codes
//!
//! Resolution follows selection order: each expanded entry yields every
//! catalog row carrying its code (catalog order among those rows). A code
//! listed twice resolves twice. Entries without a matching row are dropped.

use super::expander::Expansion;
use crate::models::{CatalogView, LineItem};
use tracing::debug;

/// A catalog row picked for pricing
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem<'a> {
    pub item: &'a LineItem,
    pub bundle: Option<&'a str>,
    pub bundle_instance: Option<usize>,
}

/// Matched rows plus the codes that matched nothing
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolution<'a> {
    pub matched: Vec<ResolvedItem<'a>>,
    pub unmatched: Vec<&'a str>,
}

pub(crate) fn partition<'a>(expansion: &'a Expansion, view: &CatalogView<'a>) -> Resolution<'a> {
    let mut resolution = Resolution::default();

    for entry in &expansion.entries {
        let before = resolution.matched.len();
        resolution
            .matched
            .extend(view.matching(&entry.code).map(|item| ResolvedItem {
                item,
                bundle: entry.bundle.as_deref(),
                bundle_instance: entry.bundle_instance,
            }));
        if resolution.matched.len() == before {
            resolution.unmatched.push(entry.code.as_str());
        }
    }

    resolution
}

/// Resolve expanded codes against a catalog view
///
/// Unmatched codes contribute nothing and are only logged.
pub fn resolve<'a>(expansion: &'a Expansion, view: &CatalogView<'a>) -> Vec<ResolvedItem<'a>> {
    let resolution = partition(expansion, view);
    if !resolution.unmatched.is_empty() {
        debug!(
            unmatched = ?resolution.unmatched,
            "Selected codes with no catalog row, skipped"
        );
    }
    resolution.matched
}
