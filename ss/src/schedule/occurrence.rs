//! Occurrence generator
//!
//! Walks business days forward from the semester start and yields every date
//! that satisfies a [`RecurrenceRule`], up to and including the end boundary
//! `start + semester_weeks` weeks. Weekends are skipped outright, and the walk
//! never goes past the last week slot the rule lists.

use std::iter::FusedIterator;

use chrono::NaiveDate;

use super::rule::{RecurrenceRule, next_business_day};

/// One concrete date produced by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub date: NaiveDate,
    /// Zero-based position within the generated sequence
    pub ordinal: usize,
}

/// Lazy, finite sequence of occurrences for one rule and start date
///
/// Once exhausted it keeps returning `None`; build a fresh generator with
/// [`RecurrenceRule::occurrences`] (or clone one) to restart.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
    cursor: Option<NaiveDate>,
    ordinal: usize,
}

impl<'a> Occurrences<'a> {
    pub(crate) fn new(rule: &'a RecurrenceRule, start: NaiveDate) -> Self {
        Self {
            rule,
            start,
            end: rule.horizon(start),
            cursor: rule.has_business_weekday().then_some(start),
            ordinal: 0,
        }
    }

    /// Inclusive end boundary of this sequence
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let mut candidate = self.cursor.take()?;
        loop {
            if candidate > self.end {
                return None;
            }
            if self.rule.matches(self.start, candidate) {
                self.cursor = next_business_day(candidate);
                let occurrence = Occurrence {
                    date: candidate,
                    ordinal: self.ordinal,
                };
                self.ordinal += 1;
                return Some(occurrence);
            }
            candidate = next_business_day(candidate)?;
        }
    }
}

impl FusedIterator for Occurrences<'_> {}
