//! Destination matching against compiled panel rules.
//!
//! # Design Decisions
//! - Rules keep the order the panel declared them in
//! - Matching is unanchored regex search, as the panel authors write patterns
//! - Callers decide whether the first or last match wins; `is_blocked` uses the first

use crate::panel::rules::DestinationRule;

/// Ordered rules compiled from one fetch.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<DestinationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<DestinationRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestinationRule> {
        self.rules.iter()
    }

    /// All rules matching `destination`, in declaration order.
    pub fn matches<'a>(&'a self, destination: &'a str) -> impl Iterator<Item = &'a DestinationRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.pattern.is_match(destination))
    }

    /// Route id of the first rule matching `destination`.
    pub fn is_blocked(&self, destination: &str) -> Option<i64> {
        self.matches(destination).next().map(|rule| rule.id)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a DestinationRule;
    type IntoIter = std::slice::Iter<'a, DestinationRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
