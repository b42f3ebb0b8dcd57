//! Recurrence rules and week-set shorthand
//!
//! Weekdays are indexed 0-6 starting at Sunday. Week indices count whole
//! Sunday-started calendar weeks since the semester start, so the week that
//! contains the start date is week 0.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ScheduleError;
use super::occurrence::Occurrences;

/// Highest weekday index (Saturday)
pub const MAX_WEEKDAY: u8 = 6;

/// Number of addressable week slots (indices 0-9)
pub const WEEK_SLOTS: u8 = 10;

/// Week-parity set, either symbolic or explicit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekSpec {
    /// Every week slot, 0-9
    All,
    /// Odd weeks only, 1 3 5 7 9
    Odd,
    /// Explicit week indices
    Weeks(BTreeSet<u8>),
}

impl WeekSpec {
    /// Expand symbolic forms into concrete week indices
    pub fn expand(&self) -> BTreeSet<u8> {
        match self {
            Self::All => (0..WEEK_SLOTS).collect(),
            Self::Odd => (0..WEEK_SLOTS).filter(|w| w % 2 == 1).collect(),
            Self::Weeks(weeks) => weeks.clone(),
        }
    }
}

impl std::str::FromStr for WeekSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "odd" => Ok(Self::Odd),
            "" => Err("week set is empty".to_string()),
            digits => digits
                .chars()
                .map(|c| match c.to_digit(10) {
                    Some(d) => Ok(d as u8),
                    None => Err(format!("'{}' is not a week digit", c)),
                })
                .collect::<Result<BTreeSet<u8>, String>>()
                .map(Self::Weeks),
        }
    }
}

/// A validated recurrence: which weekdays, in which weeks, over how long
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    weekdays: BTreeSet<u8>,
    weeks: BTreeSet<u8>,
    semester_weeks: u32,
}

impl RecurrenceRule {
    /// Build a rule from already-expanded weekday and week sets
    pub fn new(weekdays: BTreeSet<u8>, weeks: BTreeSet<u8>, semester_weeks: u32) -> Result<Self, ScheduleError> {
        if weekdays.is_empty() {
            return Err(ScheduleError::malformed("weekday set is empty"));
        }
        if let Some(day) = weekdays.iter().find(|d| **d > MAX_WEEKDAY) {
            return Err(ScheduleError::malformed(format!("weekday index {} is out of range 0-6", day)));
        }
        if weeks.is_empty() {
            return Err(ScheduleError::malformed("week set is empty"));
        }
        if let Some(week) = weeks.iter().find(|w| **w >= WEEK_SLOTS) {
            return Err(ScheduleError::malformed(format!("week index {} is out of range 0-9", week)));
        }
        Ok(Self {
            weekdays,
            weeks,
            semester_weeks,
        })
    }

    pub fn weekdays(&self) -> &BTreeSet<u8> {
        &self.weekdays
    }

    pub fn weeks(&self) -> &BTreeSet<u8> {
        &self.weeks
    }

    pub fn semester_weeks(&self) -> u32 {
        self.semester_weeks
    }

    /// Last date (inclusive) an occurrence may fall on
    pub fn end_date(&self, start: NaiveDate) -> NaiveDate {
        start
            .checked_add_days(Days::new(u64::from(self.semester_weeks) * 7))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Last date an occurrence can fall on: the window end, or the Saturday
    /// closing the highest listed week if that comes first
    pub fn horizon(&self, start: NaiveDate) -> NaiveDate {
        let last_week = u64::from(self.weeks.last().copied().unwrap_or(0));
        let last_week_end = week_start(start)
            .checked_add_days(Days::new(last_week * 7 + 6))
            .unwrap_or(NaiveDate::MAX);
        self.end_date(start).min(last_week_end)
    }

    /// Whether any listed weekday is Monday through Friday
    pub fn has_business_weekday(&self) -> bool {
        self.weekdays.iter().any(|d| (1..=5).contains(d))
    }

    /// Whether `date` satisfies the weekday and week predicates for a
    /// semester starting on `start`. Weekends never match.
    pub fn matches(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if !is_business_day(date) {
            return false;
        }
        let weekday = date.weekday().num_days_from_sunday() as u8;
        if !self.weekdays.contains(&weekday) {
            return false;
        }
        u8::try_from(week_index(start, date)).is_ok_and(|week| self.weeks.contains(&week))
    }

    /// Fresh occurrence generator for a semester starting on `start`
    pub fn occurrences(&self, start: NaiveDate) -> Occurrences<'_> {
        Occurrences::new(self, start)
    }
}

/// Monday through Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() < 5
}

/// First business day strictly after `date`
pub fn next_business_day(date: NaiveDate) -> Option<NaiveDate> {
    let mut next = date.succ_opt()?;
    while !is_business_day(next) {
        next = next.succ_opt()?;
    }
    Some(next)
}

/// Whole Sunday-started calendar weeks from `start`'s week to `date`'s week
pub fn week_index(start: NaiveDate, date: NaiveDate) -> i64 {
    (week_start(date) - week_start(start)).num_days().div_euclid(7)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}
