//! Domain types for semsync
//!
//! Courses, the work items generated for them, and the opaque ids the
//! external system hands back.

mod course;
mod id;
mod kind;
mod work_item;

pub use course::{Course, CourseStatus};
pub use id::ExternalId;
pub use kind::WorkKind;
pub use work_item::{AssignmentOccurrence, MeetingOccurrence, WorkItem};
