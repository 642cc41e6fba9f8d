//! Session lifecycle: preconditions, backend session creation, loop arming.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{broadcast, watch, Mutex};

use crate::config::DetectionConfig;
use crate::detection::{
    DetectionController, DetectionDeps, SessionAggregator, SessionStats,
};
use crate::error::SessionError;
use crate::reporting::{ReportingBackend, SessionId};
use crate::vision::{EmotionClassifier, FaceLocator, FrameSource};

use super::events::SessionEvent;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Model pair attached once loading completes.
#[derive(Clone)]
pub struct ModelSet {
    pub locator: Arc<dyn FaceLocator>,
    pub classifier: Arc<dyn EmotionClassifier>,
}

/// Drives one learning session at a time: checks the start preconditions,
/// opens the backend session, arms the detection loop and tears everything
/// down again on stop.
///
/// Constructed per session scope; all shared state lives behind `Arc` so the
/// controller can be cloned into UI handlers.
#[derive(Clone)]
pub struct SessionController {
    camera: Arc<dyn FrameSource>,
    backend: Arc<dyn ReportingBackend>,
    config: DetectionConfig,
    models: Arc<Mutex<Option<ModelSet>>>,
    detection: Arc<Mutex<DetectionController>>,
    aggregator: Arc<Mutex<SessionAggregator>>,
    session_id: Arc<Mutex<Option<SessionId>>>,
    events: broadcast::Sender<SessionEvent>,
    pause_tx: Arc<watch::Sender<bool>>,
    pause_rx: watch::Receiver<bool>,
}

impl SessionController {
    pub fn new(
        camera: Arc<dyn FrameSource>,
        backend: Arc<dyn ReportingBackend>,
        config: DetectionConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (pause_tx, pause_rx) = watch::channel(false);

        Self {
            camera,
            backend,
            config,
            models: Arc::new(Mutex::new(None)),
            detection: Arc::new(Mutex::new(DetectionController::new())),
            aggregator: Arc::new(Mutex::new(SessionAggregator::new())),
            session_id: Arc::new(Mutex::new(None)),
            events,
            pause_tx: Arc::new(pause_tx),
            pause_rx,
        }
    }

    /// Attaches the loaded model pair. Until this is called, `start` refuses
    /// to run.
    pub async fn attach_models(
        &self,
        locator: Arc<dyn FaceLocator>,
        classifier: Arc<dyn EmotionClassifier>,
    ) {
        *self.models.lock().await = Some(ModelSet {
            locator,
            classifier,
        });
    }

    pub async fn models_loaded(&self) -> bool {
        self.models.lock().await.is_some()
    }

    /// Event stream for the UI layer.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn is_running(&self) -> bool {
        self.detection.lock().await.is_running()
    }

    /// Live statistics snapshot.
    pub async fn stats(&self) -> SessionStats {
        self.aggregator.lock().await.snapshot()
    }

    /// Starts a session: precondition checks, backend session creation,
    /// counter reset, loop arming. Rejections leave existing state untouched.
    pub async fn start(&self, subject: &str) -> Result<SessionId, SessionError> {
        let mut detection = self.detection.lock().await;

        if detection.is_running() {
            warn!("session start rejected: already running");
            return Err(SessionError::AlreadyRunning);
        }
        if !self.camera.is_ready() {
            warn!("session start rejected: camera not ready");
            return Err(SessionError::CameraNotReady);
        }
        let Some(models) = self.models.lock().await.clone() else {
            warn!("session start rejected: models not loaded");
            return Err(SessionError::ModelsNotLoaded);
        };

        let session_id = self.backend.start_session(subject).await?;
        info!("session {session_id} started for subject {subject}");

        self.aggregator.lock().await.reset();
        // A fresh session never starts paused.
        let _ = self.pause_tx.send(false);

        let deps = DetectionDeps {
            camera: Arc::clone(&self.camera),
            locator: models.locator,
            classifier: models.classifier,
            backend: Arc::clone(&self.backend),
            session_id: session_id.clone(),
            aggregator: Arc::clone(&self.aggregator),
            events: self.events.clone(),
            config: self.config.clone(),
        };
        detection
            .start(deps, self.pause_rx.clone())
            .map_err(SessionError::Detection)?;

        *self.session_id.lock().await = Some(session_id.clone());
        Ok(session_id)
    }

    /// Stops the loop and closes the backend session. Safe to call when idle.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.detection
            .lock()
            .await
            .stop()
            .await
            .map_err(SessionError::Detection)?;

        if let Some(session_id) = self.session_id.lock().await.take() {
            self.backend.end_session(&session_id).await?;
            info!("session {session_id} ended");
        }
        Ok(())
    }

    /// Pauses or resumes tick processing without touching any counter.
    pub fn set_paused(&self, paused: bool) {
        let _ = self.pause_tx.send(paused);
    }

    pub fn is_paused(&self) -> bool {
        *self.pause_rx.borrow()
    }
}
