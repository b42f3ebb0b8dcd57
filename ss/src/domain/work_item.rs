//! Fully expanded, ready-to-submit units of scheduled work

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ExternalId, WorkKind};

/// One dated class meeting (lecture, discussion, lab)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingOccurrence {
    pub title: String,
    pub kind: WorkKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub parent: ExternalId,
    pub mandatory: bool,
}

/// One dated assignment; `due` is its only timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOccurrence {
    pub title: String,
    pub kind: WorkKind,
    pub due: NaiveDateTime,
    pub parent: ExternalId,
    pub mandatory: bool,
}

/// A work item awaiting submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum WorkItem {
    Meeting(MeetingOccurrence),
    Assignment(AssignmentOccurrence),
}

impl WorkItem {
    pub fn title(&self) -> &str {
        match self {
            Self::Meeting(m) => &m.title,
            Self::Assignment(a) => &a.title,
        }
    }

    pub fn kind(&self) -> WorkKind {
        match self {
            Self::Meeting(m) => m.kind,
            Self::Assignment(a) => a.kind,
        }
    }

    /// Meeting start, or assignment due time
    pub fn start(&self) -> NaiveDateTime {
        match self {
            Self::Meeting(m) => m.start,
            Self::Assignment(a) => a.due,
        }
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Meeting(m) => Some(m.end),
            Self::Assignment(_) => None,
        }
    }

    pub fn parent(&self) -> &ExternalId {
        match self {
            Self::Meeting(m) => &m.parent,
            Self::Assignment(a) => &a.parent,
        }
    }

    pub fn mandatory(&self) -> bool {
        match self {
            Self::Meeting(m) => m.mandatory,
            Self::Assignment(a) => a.mandatory,
        }
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Meeting(m) => write!(
                f,
                "{} ({}) {} - {}",
                m.title,
                m.kind,
                m.start.format("%a %Y-%m-%d %H:%M"),
                m.end.format("%H:%M")
            ),
            Self::Assignment(a) => write!(f, "{} ({}) due {}", a.title, a.kind, a.due.format("%a %Y-%m-%d %H:%M")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_accessors_dispatch_by_variant() {
        let meeting = WorkItem::Meeting(MeetingOccurrence {
            title: "CS 101 Lecture 1".to_string(),
            kind: WorkKind::Lecture,
            start: at(10, 0),
            end: at(10, 50),
            parent: ExternalId::new("course-1"),
            mandatory: true,
        });
        assert_eq!(meeting.title(), "CS 101 Lecture 1");
        assert_eq!(meeting.kind(), WorkKind::Lecture);
        assert_eq!(meeting.start(), at(10, 0));
        assert_eq!(meeting.end(), Some(at(10, 50)));
        assert!(meeting.mandatory());

        let assignment = WorkItem::Assignment(AssignmentOccurrence {
            title: "CS 101 Homework 3".to_string(),
            kind: WorkKind::Homework,
            due: at(23, 59),
            parent: ExternalId::new("course-1"),
            mandatory: false,
        });
        assert_eq!(assignment.start(), at(23, 59));
        assert_eq!(assignment.end(), None);
        assert_eq!(assignment.parent().as_str(), "course-1");
        assert!(!assignment.mandatory());
    }

    #[test]
    fn test_display() {
        let item = WorkItem::Assignment(AssignmentOccurrence {
            title: "Homework 1".to_string(),
            kind: WorkKind::Homework,
            due: at(23, 59),
            parent: ExternalId::new("p"),
            mandatory: true,
        });
        assert_eq!(item.to_string(), "Homework 1 (Homework) due Mon 2024-01-08 23:59");
    }

    #[test]
    fn test_serde_tags_variant() {
        let item = WorkItem::Meeting(MeetingOccurrence {
            title: "Lab 2".to_string(),
            kind: WorkKind::Lab,
            start: at(14, 0),
            end: at(16, 0),
            parent: ExternalId::new("p"),
            mandatory: false,
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["variant"], "meeting");
        assert_eq!(json["kind"], "lab");
    }
}
