//! In-process session store used by tests and the demo runner.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{ReportError, ReportResult};
use crate::models::EmotionSample;

use super::{ReportingBackend, SessionId};

#[derive(Default)]
struct InMemoryState {
    active: Option<SessionId>,
    sessions_started: u64,
    sessions_ended: u64,
    samples: Vec<(SessionId, EmotionSample)>,
}

/// Reporting backend that keeps everything in process memory.
#[derive(Default)]
pub struct InMemoryBackend {
    state: Mutex<InMemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sample_count(&self) -> usize {
        self.state.lock().await.samples.len()
    }

    pub async fn samples(&self) -> Vec<EmotionSample> {
        self.state
            .lock()
            .await
            .samples
            .iter()
            .map(|(_, sample)| sample.clone())
            .collect()
    }

    pub async fn sessions_started(&self) -> u64 {
        self.state.lock().await.sessions_started
    }

    pub async fn sessions_ended(&self) -> u64 {
        self.state.lock().await.sessions_ended
    }
}

#[async_trait]
impl ReportingBackend for InMemoryBackend {
    async fn start_session(&self, _subject: &str) -> ReportResult<SessionId> {
        let id = SessionId::new(Value::String(Uuid::new_v4().to_string()));
        let mut state = self.state.lock().await;
        state.active = Some(id.clone());
        state.sessions_started += 1;
        Ok(id)
    }

    async fn end_session(&self, session: &SessionId) -> ReportResult<()> {
        let mut state = self.state.lock().await;
        if state.active.as_ref() != Some(session) {
            return Err(ReportError::RequestFailed(format!(
                "unknown session {session}"
            )));
        }
        state.active = None;
        state.sessions_ended += 1;
        Ok(())
    }

    async fn submit_sample(
        &self,
        session: &SessionId,
        sample: &EmotionSample,
    ) -> ReportResult<()> {
        let mut state = self.state.lock().await;
        state.samples.push((session.clone(), sample.clone()));
        Ok(())
    }
}
