//! Submission of work items to the external system
//!
//! [`Submitter`] is the seam the dispatcher calls through. [`NotionClient`]
//! talks to the Notion API; [`DryRunSubmitter`] only logs.

pub mod client;
mod dry_run;
mod error;
mod notion;

pub use client::Submitter;
pub use dry_run::DryRunSubmitter;
pub use error::SubmitError;
pub use notion::NotionClient;
