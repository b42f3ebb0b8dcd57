//! Submitter trait definition

use async_trait::async_trait;

use super::SubmitError;
use crate::domain::{ExternalId, WorkItem};

/// Capability that creates one external record per work item
///
/// Called concurrently from many tasks. Implementations must report every
/// failure as a [`SubmitError`] and must not panic.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Create the record for `item`, returning its external id
    async fn submit(&self, item: &WorkItem) -> Result<ExternalId, SubmitError>;
}
