//! Bundle expansion
//!
//! Turns a section's selection (raw codes mixed with bundle names) into the
//! flat list of codes to price. Unknown codes pass through untouched; the
//! catalog lookup later drops anything that matches no row.

use crate::models::BundleSet;
use serde::{Deserialize, Serialize};

/// One code to price, with the bundle it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedCode {
    pub code: String,
    pub bundle: Option<String>,
    /// Index into [`Expansion::used_bundles`], so repeated picks of one
    /// bundle stay distinguishable
    pub bundle_instance: Option<usize>,
}

/// Result of expanding a selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    /// Codes in selection order, bundle members inlined in bundle order
    pub entries: Vec<ExpandedCode>,
    /// Bundle names that were expanded, in selection order
    pub used_bundles: Vec<String>,
}

impl Expansion {
    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Expand `selected` against the bundles of one service
///
/// A bundle contributes all of its members, repeats included. Anything else
/// is taken as a literal code.
pub fn expand<S: AsRef<str>>(selected: &[S], bundles: &BundleSet) -> Expansion {
    let mut expansion = Expansion::default();

    for entry in selected {
        let entry = entry.as_ref().trim();
        if entry.is_empty() {
            continue;
        }

        match bundles.get(entry) {
            Some(members) => {
                let instance = expansion.used_bundles.len();
                expansion
                    .entries
                    .extend(members.iter().map(|code| ExpandedCode {
                        code: code.trim().to_string(),
                        bundle: Some(entry.to_string()),
                        bundle_instance: Some(instance),
                    }));
                expansion.used_bundles.push(entry.to_string());
            }
            None => expansion.entries.push(ExpandedCode {
                code: entry.to_string(),
                bundle: None,
                bundle_instance: None,
            }),
        }
    }

    expansion
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundles() -> BundleSet {
        BundleSet::from([
            (
                "Combo".to_string(),
                vec!["A".to_string(), "B".to_string(), "A".to_string()],
            ),
            ("Pair".to_string(), vec!["C".to_string(), "C".to_string()]),
        ])
    }

    #[test]
    fn test_bundle_keeps_multiplicity_and_order() {
        let expansion = expand(&["Combo"], &bundles());
        assert_eq!(expansion.codes(), vec!["A", "B", "A"]);
        assert_eq!(expansion.used_bundles, vec!["Combo"]);
        assert!(expansion
            .entries
            .iter()
            .all(|e| e.bundle.as_deref() == Some("Combo")));
    }

    #[test]
    fn test_mixed_selection_preserves_selection_order() {
        let expansion = expand(&["X", "Pair", "Y", "Combo"], &bundles());
        assert_eq!(
            expansion.codes(),
            vec!["X", "C", "C", "Y", "A", "B", "A"]
        );
        assert_eq!(expansion.used_bundles, vec!["Pair", "Combo"]);
        assert_eq!(expansion.entries[0].bundle, None);
    }

    #[test]
    fn test_unknown_codes_pass_through() {
        let expansion = expand(&["NOT_IN_CATALOG"], &BundleSet::new());
        assert_eq!(expansion.codes(), vec!["NOT_IN_CATALOG"]);
        assert!(expansion.used_bundles.is_empty());
    }

    #[test]
    fn test_blank_entries_skipped_and_trimmed() {
        let expansion = expand(&["  ", " X "], &BundleSet::new());
        assert_eq!(expansion.codes(), vec!["X"]);
    }

    #[test]
    fn test_bundle_selected_twice_expands_twice() {
        let expansion = expand(&["Pair", "Pair"], &bundles());
        assert_eq!(expansion.len(), 4);
        assert_eq!(expansion.used_bundles, vec!["Pair", "Pair"]);

        let instances: Vec<_> = expansion.entries.iter().map(|e| e.bundle_instance).collect();
        assert_eq!(instances, vec![Some(0), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_bundle_instance_indexes_used_bundles() {
        let expansion = expand(&["Pair", "X", "Combo"], &bundles());
        assert_eq!(expansion.entries[2].bundle_instance, None);
        for entry in expansion.entries.iter().filter(|e| e.bundle.is_some()) {
            let index = entry.bundle_instance.unwrap();
            assert_eq!(entry.bundle.as_deref(), Some(expansion.used_bundles[index].as_str()));
        }
    }
}
