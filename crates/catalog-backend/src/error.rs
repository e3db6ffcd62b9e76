use thiserror::Error;

/// Failures raised by the remote collaborators (identity provider and
/// document database). Never retried here; callers surface them as-is.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("undecodable backend response: {0}")]
    Decode(String),
    #[error("not signed in")]
    NotAuthenticated,
}
