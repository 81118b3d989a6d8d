//! Literal, case-insensitive substring matching.
//!
//! The user term is escaped before compilation so regex metacharacters match themselves.
//! `find_iter` yields leftmost, non-overlapping byte ranges scanning left to right, which is
//! exactly the highlight overlap policy: touching matches stay distinct, overlapping
//! candidates lose to the earlier one.

use regex::{Regex, RegexBuilder};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    pub fn new(term: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()?;
        Ok(Self { regex })
    }

    pub fn find_iter<'h>(&'h self, haystack: &'h str) -> impl Iterator<Item = Range<usize>> + 'h {
        self.regex.find_iter(haystack).map(|m| m.range())
    }

    pub fn count(&self, haystack: &str) -> usize {
        self.regex.find_iter(haystack).count()
    }
}
