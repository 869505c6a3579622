//! Uniqueness tracking across the sections of one estimate

use std::collections::HashSet;
use tracing::debug;

/// Globally-unique tool codes already billed in the current estimate
///
/// Owned by exactly one estimate. Sections must be priced against it in
/// presentation order: the first occurrence of a code is the one billed.
#[derive(Debug, Clone, Default)]
pub struct UniquenessTracker {
    billed: HashSet<String>,
}

impl UniquenessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every billed code
    pub fn reset(&mut self) {
        if !self.billed.is_empty() {
            debug!(cleared = self.billed.len(), "Unique-tool tracker reset");
        }
        self.billed.clear();
    }

    /// Whether `code` has already been billed
    pub fn consult(&self, code: &str) -> bool {
        self.billed.contains(code)
    }

    /// Record `code` as billed. Returns false if it was already recorded.
    pub fn mark_billed(&mut self, code: &str) -> bool {
        if self.billed.contains(code) {
            return false;
        }
        self.billed.insert(code.to_string())
    }

    pub fn len(&self) -> usize {
        self.billed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.billed.is_empty()
    }

    /// Billed codes, sorted
    pub fn billed_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.billed.iter().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_then_consult() {
        let mut tracker = UniquenessTracker::new();
        assert!(!tracker.consult("U"));
        assert!(tracker.mark_billed("U"));
        assert!(tracker.consult("U"));
    }

    #[test]
    fn test_mark_billed_idempotent() {
        let mut tracker = UniquenessTracker::new();
        assert!(tracker.mark_billed("U"));
        assert!(!tracker.mark_billed("U"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut tracker = UniquenessTracker::new();
        tracker.mark_billed("U");
        tracker.mark_billed("V");
        tracker.reset();
        assert!(!tracker.consult("U"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_billed_codes_sorted() {
        let mut tracker = UniquenessTracker::new();
        tracker.mark_billed("Z");
        tracker.mark_billed("A");
        assert_eq!(tracker.billed_codes(), vec!["A", "Z"]);
    }
}
