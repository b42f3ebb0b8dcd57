//! Dry-run submitter: logs instead of calling the API

use async_trait::async_trait;
use tracing::info;

use super::{SubmitError, Submitter};
use crate::domain::{Course, ExternalId, WorkItem};

/// Accepts everything and fabricates ids
#[derive(Debug, Default)]
pub struct DryRunSubmitter;

impl DryRunSubmitter {
    pub fn new() -> Self {
        Self
    }

    /// Stand-in for course creation
    pub fn create_course(&self, course: &Course) -> ExternalId {
        let id = ExternalId::generate();
        info!(name = %course.name, %id, "dry run: would create course");
        id
    }
}

#[async_trait]
impl Submitter for DryRunSubmitter {
    async fn submit(&self, item: &WorkItem) -> Result<ExternalId, SubmitError> {
        let id = ExternalId::generate();
        info!(title = %item.title(), %id, "dry run: would create page");
        Ok(id)
    }
}
