use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::error::SyncError;
use super::transport::{HttpTransport, Transport, TransportResponse};
use super::Backend;
use crate::config::BacklogConfig;
use crate::model::bug::{Bug, BugStatus, Buglist, PendingBug};
use crate::util::date::parse_remote_timestamp;

/// Display labels the service uses for its terminal status, in the locale the
/// project is configured with. Matching is exact string equality against this
/// table — interoperability depends on reproducing the service's own strings,
/// not on pattern inference.
const CLOSED_STATUS_LABELS: &[&str] = &["完了"];

pub struct BacklogBackend {
    transport: Arc<dyn Transport>,
    /// Numeric project ids, keyed by project base URL. Write-once per URL,
    /// never expired within a session.
    project_ids: RwLock<HashMap<String, u64>>,
}

impl BacklogBackend {
    pub fn new(config: &BacklogConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(config.api_key.clone())))
    }

    /// Build a backend over a caller-supplied transport. Tests run against a
    /// scripted transport instead of the network.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            project_ids: RwLock::new(HashMap::new()),
        }
    }

    /// One-time lookup of the numeric project id via the service root. Some
    /// deployments need it for endpoint construction; resolving it up front
    /// also confirms the service is reachable before any mutation.
    async fn resolve_project_id(&self, base_url: &str) -> Result<u64, SyncError> {
        if let Ok(ids) = self.project_ids.read() {
            if let Some(id) = ids.get(base_url) {
                return Ok(*id);
            }
        }

        let url = format!("{base_url}.json");
        let response = self.transport.request(Method::GET, &url, None).await?;
        if response.status != 200 {
            return Err(SyncError::RemoteUnreachable {
                url,
                status: response.status,
            });
        }

        let envelope: ProjectEnvelope = decode(response.json, &url)?;
        debug!(
            project = project_name(base_url),
            id = envelope.project.id,
            "resolved project id"
        );
        if let Ok(mut ids) = self.project_ids.write() {
            ids.insert(base_url.to_string(), envelope.project.id);
        }
        Ok(envelope.project.id)
    }

    async fn fetch(&self, base_url: &str) -> Result<Buglist, SyncError> {
        let url = format!("{base_url}/issues");
        let response = self.transport.request(Method::GET, &url, None).await?;
        if response.status != 200 {
            return Err(SyncError::RemoteUnreachable {
                url,
                status: response.status,
            });
        }

        let issues: Vec<RemoteIssue> = decode(response.json, &url)?;
        let bugs: Vec<Bug> = issues.into_iter().map(to_bug).collect();
        debug!(count = bugs.len(), "fetched remote issues");

        Ok(Buglist {
            title: format!("Issues of {}", project_name(base_url)),
            url: base_url.to_string(),
            bugs,
        })
    }

    async fn send(&self, base_url: &str, batch: &[PendingBug]) -> Result<Vec<Bug>, SyncError> {
        self.resolve_project_id(base_url).await?;

        let root = root_url(base_url);
        let mut bugs = Vec::new();

        for pending in batch {
            // Classification order matters: a record with no id is always a
            // create, even if the host left a stray delete marker on it.
            match (&pending.bug.id, pending.delete) {
                (None, _) => bugs.push(self.create_issue(base_url, &pending.bug).await?),
                (Some(id), true) => self.delete_issue(&root, id).await?,
                (Some(id), false) => bugs.push(self.update_issue(&root, id, &pending.bug).await?),
            }
        }

        Ok(bugs)
    }

    async fn create_issue(&self, base_url: &str, bug: &Bug) -> Result<Bug, SyncError> {
        let url = format!("{base_url}/issues.json");
        info!(title = %bug.title, "creating remote issue");

        let response = self
            .transport
            .request(Method::POST, &url, Some(issue_payload(bug)))
            .await?;
        if response.status != 201 {
            return Err(SyncError::CreateFailed {
                title: bug.title.clone(),
                status: response.status,
            });
        }
        decode_issue(response, &url)
    }

    async fn delete_issue(&self, root: &str, id: &str) -> Result<(), SyncError> {
        let url = format!("{root}/issues/{id}.json");
        info!(id, "deleting remote issue");

        let response = self.transport.request(Method::DELETE, &url, None).await?;
        // 404 counts as success: the issue being gone is the requested outcome.
        match response.status {
            204 | 404 => Ok(()),
            status => Err(SyncError::DeleteFailed {
                id: id.to_string(),
                status,
            }),
        }
    }

    async fn update_issue(&self, root: &str, id: &str, bug: &Bug) -> Result<Bug, SyncError> {
        let url = format!("{root}/issues/{id}.json");
        info!(id, "updating remote issue");

        let response = self
            .transport
            .request(Method::PUT, &url, Some(issue_payload(bug)))
            .await?;
        if response.status != 200 {
            return Err(SyncError::UpdateFailed {
                id: id.to_string(),
                status: response.status,
            });
        }

        // The update response is not guaranteed to carry the full issue, so
        // read it back before reporting the authoritative record.
        let response = self.transport.request(Method::GET, &url, None).await?;
        if response.status != 200 {
            return Err(SyncError::UpdateFailed {
                id: id.to_string(),
                status: response.status,
            });
        }
        decode_issue(response, &url)
    }
}

#[async_trait]
impl Backend for BacklogBackend {
    fn name(&self) -> &str {
        "Backlog"
    }

    fn base_url(&self, raw: &str) -> String {
        normalize_base_url(raw)
    }

    async fn fetch_buglist(
        &self,
        project_url: &str,
        _last_update: Option<DateTime<Utc>>,
    ) -> Result<Buglist, SyncError> {
        self.fetch(project_url).await
    }

    async fn send_buglist(
        &self,
        project_url: &str,
        batch: &[PendingBug],
    ) -> Result<Vec<Bug>, SyncError> {
        self.send(project_url, batch).await
    }
}

#[derive(Debug, Deserialize)]
struct RemoteIssue {
    #[serde(rename = "issueKey")]
    issue_key: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    status: Option<NamedField>,
    priority: Option<NamedField>,
    #[serde(rename = "createdUser")]
    created_user: Option<RemoteUser>,
    created: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedField {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProjectEnvelope {
    project: ProjectMeta,
}

#[derive(Debug, Deserialize)]
struct ProjectMeta {
    id: u64,
}

fn to_bug(issue: RemoteIssue) -> Bug {
    let status = match &issue.status {
        Some(field) if CLOSED_STATUS_LABELS.contains(&field.name.as_str()) => BugStatus::Closed,
        _ => BugStatus::Open,
    };

    Bug {
        id: issue.issue_key,
        title: issue.summary.unwrap_or_default(),
        description: issue.description.unwrap_or_default(),
        status,
        priority: issue.priority.map(|p| p.name),
        author: issue.created_user.map(|u| u.name),
        created_at: issue.created.as_deref().and_then(parse_remote_timestamp),
        modified_at: issue.updated.as_deref().and_then(parse_remote_timestamp),
    }
}

/// Minimal payload the API accepts for create and update. Fields that are not
/// sent are left unchanged on update and defaulted on create.
fn issue_payload(bug: &Bug) -> Value {
    json!({
        "issue": {
            "subject": bug.title,
            "description": bug.description,
        }
    })
}

fn decode<T: DeserializeOwned>(json: Option<Value>, url: &str) -> Result<T, SyncError> {
    json.and_then(|value| serde_json::from_value(value).ok())
        .ok_or_else(|| SyncError::MalformedResponse {
            url: url.to_string(),
        })
}

/// Pull the nested `issue` object out of a create/update/get response and
/// translate it.
fn decode_issue(response: TransportResponse, url: &str) -> Result<Bug, SyncError> {
    let issue: RemoteIssue = decode(
        response.json.and_then(|mut value| {
            value.get_mut("issue").map(Value::take)
        }),
        url,
    )?;
    Ok(to_bug(issue))
}

/// Canonical API form of a user-entered project URL: scheme made explicit,
/// path rooted at `/api/v2`, no trailing slash.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let Some(scheme_end) = with_scheme.find("://") else {
        return with_scheme;
    };
    let authority_start = scheme_end + 3;
    match with_scheme[authority_start..].find('/') {
        Some(idx) => {
            let origin = &with_scheme[..authority_start + idx];
            let path = &with_scheme[authority_start + idx..];
            if path.starts_with("/api/v2") {
                with_scheme.clone()
            } else {
                format!("{origin}/api/v2{path}")
            }
        }
        None => format!("{with_scheme}/api/v2"),
    }
}

/// Service root for item-level endpoints: the project base URL with its
/// trailing `/projects/<name>` stripped.
fn root_url(base_url: &str) -> String {
    match base_url.rfind("/projects/") {
        Some(idx) => base_url[..idx].to_string(),
        None => base_url.to_string(),
    }
}

fn project_name(base_url: &str) -> &str {
    base_url.rsplit('/').next().unwrap_or(base_url)
}
