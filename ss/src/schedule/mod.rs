//! Recurring schedule generation
//!
//! Rules turn into occurrence dates, descriptors turn into work items.

mod error;
mod expander;
mod occurrence;
mod rule;
mod shorthand;

pub use error::ScheduleError;
pub use expander::{Descriptor, Expansion, Semester, expand, expand_all};
pub use occurrence::{Occurrence, Occurrences};
pub use rule::{MAX_WEEKDAY, RecurrenceRule, WEEK_SLOTS, WeekSpec, is_business_day, next_business_day, week_index};
pub use shorthand::{parse_descriptor, parse_time, parse_weekdays};
