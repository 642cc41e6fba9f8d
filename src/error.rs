//! Public error types.

use thiserror::Error;

/// Errors surfaced by the session lifecycle API. Precondition failures are
/// rejected synchronously at `start()` without mutating any state.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already running")]
    AlreadyRunning,

    #[error("camera is not ready")]
    CameraNotReady,

    #[error("detection models are not loaded")]
    ModelsNotLoaded,

    #[error("reporting backend error: {0}")]
    Backend(#[from] ReportError),

    #[error(transparent)]
    Detection(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Errors from the reporting backend boundary.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
