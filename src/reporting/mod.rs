//! Session store boundary.
//!
//! The backend owns persistence and assigns session ids; the core only carries
//! the id between `start_session` and the calls that reference it. Sample
//! submission is best-effort: the detection loop fires it without awaiting and
//! never retries.

mod http;
mod memory;

pub use http::{HttpBackend, HttpBackendConfig};
pub use memory::InMemoryBackend;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportResult;
use crate::models::EmotionSample;

/// Opaque session identifier assigned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionId(Value);

impl SessionId {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The raw backend value, played back verbatim on later calls.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend session store consumed by the core.
#[async_trait]
pub trait ReportingBackend: Send + Sync {
    async fn start_session(&self, subject: &str) -> ReportResult<SessionId>;

    async fn end_session(&self, session: &SessionId) -> ReportResult<()>;

    /// Mirrors one validated sample. At-most-once; callers treat failures as
    /// log-only.
    async fn submit_sample(&self, session: &SessionId, sample: &EmotionSample)
        -> ReportResult<()>;
}
