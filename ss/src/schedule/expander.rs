//! Schedule expander
//!
//! Turns a recurrence descriptor into the ordered list of work items for one
//! semester. Pure: no I/O, no clock reads.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ScheduleError;
use super::rule::RecurrenceRule;
use crate::domain::{AssignmentOccurrence, ExternalId, MeetingOccurrence, WorkItem, WorkKind};

/// The semester window every descriptor is expanded over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub start: NaiveDate,
    pub weeks: u32,
}

impl Semester {
    pub fn new(start: NaiveDate, weeks: u32) -> Self {
        Self { start, weeks }
    }
}

/// A structured recurrence descriptor with expanded weekday/week sets
///
/// Meetings need both `start_time` and `end_time`; assignments use
/// `start_time` as the due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub kind: WorkKind,
    pub weekdays: BTreeSet<u8>,
    pub weeks: BTreeSet<u8>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub mandatory: bool,
    pub label: Option<String>,
    pub parent: Option<ExternalId>,
}

impl Descriptor {
    /// Attach the parent course record
    pub fn with_parent(mut self, parent: ExternalId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Prefix the title label, e.g. with the course name
    pub fn with_title_prefix(mut self, prefix: &str) -> Self {
        let label = self.label.take().unwrap_or_else(|| self.kind.display_name().to_string());
        self.label = Some(format!("{} {}", prefix.trim(), label.trim()).trim().to_string());
        self
    }
}

/// Result of expanding many descriptors: items in descriptor order plus the
/// descriptors that failed, by index
#[derive(Debug, Default)]
pub struct Expansion {
    pub items: Vec<WorkItem>,
    pub failures: Vec<(usize, ScheduleError)>,
}

/// Expand one descriptor over a semester
pub fn expand(descriptor: &Descriptor, semester: &Semester) -> Result<Vec<WorkItem>, ScheduleError> {
    debug!(kind = %descriptor.kind, ?semester, "expand: called");

    let label = descriptor
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ScheduleError::malformed("label is missing"))?;

    let parent = descriptor
        .parent
        .as_ref()
        .filter(|p| !p.is_blank())
        .ok_or_else(|| ScheduleError::malformed("parent reference is missing"))?;

    let start_time = descriptor
        .start_time
        .ok_or_else(|| ScheduleError::malformed(format!("{} is missing its start time", descriptor.kind)))?;

    let end_time = if descriptor.kind.is_meeting() {
        let end = descriptor
            .end_time
            .ok_or_else(|| ScheduleError::malformed(format!("{} is missing its end time", descriptor.kind)))?;
        if end <= start_time {
            return Err(ScheduleError::malformed(format!(
                "{} ends at {} which is not after its start {}",
                descriptor.kind, end, start_time
            )));
        }
        Some(end)
    } else {
        None
    };

    let rule = RecurrenceRule::new(descriptor.weekdays.clone(), descriptor.weeks.clone(), semester.weeks)?;

    let items: Vec<WorkItem> = rule
        .occurrences(semester.start)
        .map(|occ| {
            let title = format!("{} {}", label, occ.ordinal + 1);
            let start = occ.date.and_time(start_time);
            match end_time {
                Some(end) => WorkItem::Meeting(MeetingOccurrence {
                    title,
                    kind: descriptor.kind,
                    start,
                    end: occ.date.and_time(end),
                    parent: parent.clone(),
                    mandatory: descriptor.mandatory,
                }),
                None => WorkItem::Assignment(AssignmentOccurrence {
                    title,
                    kind: descriptor.kind,
                    due: start,
                    parent: parent.clone(),
                    mandatory: descriptor.mandatory,
                }),
            }
        })
        .collect();

    debug!(count = items.len(), "expand: generated items");
    Ok(items)
}

/// Expand every descriptor; a malformed one is recorded and skipped
pub fn expand_all(descriptors: &[Descriptor], semester: &Semester) -> Expansion {
    debug!(count = descriptors.len(), "expand_all: called");
    let mut expansion = Expansion::default();
    for (index, descriptor) in descriptors.iter().enumerate() {
        match expand(descriptor, semester) {
            Ok(items) => expansion.items.extend(items),
            Err(e) => {
                debug!(index, error = %e, "expand_all: descriptor failed");
                expansion.failures.push((index, e));
            }
        }
    }
    expansion
}
