use thiserror::Error;

/// Failures surfaced to the host framework.
///
/// The transport reports status codes without interpreting them; the variants
/// here are raised by the layers that know what a given status means for
/// their operation. The first failure aborts the enclosing batch; remote
/// mutations already applied stay applied.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote service unreachable: {url} returned status {status}")]
    RemoteUnreachable { url: String, status: u16 },

    #[error("failed to create issue \"{title}\" (status {status})")]
    CreateFailed { title: String, status: u16 },

    #[error("failed to update issue {id} (status {status})")]
    UpdateFailed { id: String, status: u16 },

    #[error("failed to delete issue {id} (status {status})")]
    DeleteFailed { id: String, status: u16 },

    #[error("malformed response from {url}")]
    MalformedResponse { url: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}
