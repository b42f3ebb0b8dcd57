//! semsync - course schedules to dated tasks
//!
//! semsync turns a compact description of a course's recurring schedule into
//! one dated work item per meeting or assignment, then pushes those items to
//! an external task system under a global rate limit, retrying failures.
//!
//! # Modules
//!
//! - [`schedule`] - Recurrence rules, occurrence generation and descriptor expansion
//! - [`dispatch`] - Dispatch queue, rate limiter and retrying dispatcher
//! - [`submit`] - Submitter trait plus Notion and dry-run implementations
//! - [`domain`] - Courses, work items and external ids
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod prompt;
pub mod schedule;
pub mod submit;

// Re-export commonly used types
pub use config::{Config, NotionConfig};
pub use dispatch::{
    DispatchConfig, DispatchPhase, DispatchQueue, DispatchReport, DispatchStats, Dispatcher, EmptyQueue, QueuedItem,
    RateLimiter, RetryPolicy,
};
pub use domain::{AssignmentOccurrence, Course, CourseStatus, ExternalId, MeetingOccurrence, WorkItem, WorkKind};
pub use schedule::{
    Descriptor, Expansion, Occurrence, Occurrences, RecurrenceRule, ScheduleError, Semester, WeekSpec, expand,
    expand_all, parse_descriptor,
};
pub use submit::{DryRunSubmitter, NotionClient, SubmitError, Submitter};
