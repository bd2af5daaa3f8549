pub mod backlog;
pub mod error;
pub mod transport;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::model::bug::{Bug, Buglist, PendingBug};
use error::SyncError;

/// One remote bug-tracking service the local list can be kept in sync with.
///
/// The host framework owns diffing, merging, and rendering; a backend only
/// translates between representations and replays pending changes.
#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> &str;

    /// Normalize a user-entered project URL into the canonical API form.
    fn base_url(&self, raw: &str) -> String;

    /// Fetch the full remote issue list. The hint is accepted for interface
    /// compatibility; backends currently always fetch everything.
    async fn fetch_buglist(
        &self,
        project_url: &str,
        last_update: Option<DateTime<Utc>>,
    ) -> Result<Buglist, SyncError>;

    /// Replay a batch of pending local changes against the remote service,
    /// returning the records as the server now reports them. Deleted bugs do
    /// not reappear in the result.
    async fn send_buglist(
        &self,
        project_url: &str,
        batch: &[PendingBug],
    ) -> Result<Vec<Bug>, SyncError>;
}


pub fn create_backends(config: &AppConfig) -> Vec<Box<dyn Backend>> {
    let mut backends: Vec<Box<dyn Backend>> = Vec::new();

    if let Some(cfg) = &config.backlog {
        backends.push(Box::new(backlog::BacklogBackend::new(cfg)));
    }

    backends
}
