use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Two-valued status tag derived from the remote service's display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BugStatus {
    Open,
    Closed,
}

/// The host framework's normalized in-memory representation of one issue.
///
/// Constructed fresh from a remote response on every fetch or reconciliation;
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bug {
    /// Remote issue key. `None` exactly when the bug does not exist on the
    /// remote service yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: BugStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Display name of whoever created the issue remotely. Informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// A titled, ordered collection of bugs plus the project URL it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buglist {
    pub title: String,
    pub url: String,
    pub bugs: Vec<Bug>,
}

/// A bug as submitted by the host for reconciliation: the record itself plus
/// a delete marker the host may overlay. A bug without an id is created
/// remotely; one with an id is deleted when marked, updated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingBug {
    #[serde(flatten)]
    pub bug: Bug,
    #[serde(default)]
    pub delete: bool,
}
