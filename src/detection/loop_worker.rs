//! The detection loop: one classification cycle per fixed time quantum.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::DetectionConfig;
use crate::models::{Classification, EmotionSample};
use crate::reporting::{ReportingBackend, SessionId};
use crate::session::SessionEvent;
use crate::vision::{EmotionClassifier, FaceLocator, FrameSource};

use super::aggregator::SessionAggregator;
use super::warning::{Warning, WarningKind, WarningPolicy};

/// Everything one detection session needs, bundled for the spawned loop task.
#[derive(Clone)]
pub struct DetectionDeps {
    pub camera: Arc<dyn FrameSource>,
    pub locator: Arc<dyn FaceLocator>,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub backend: Arc<dyn ReportingBackend>,
    pub session_id: SessionId,
    pub aggregator: Arc<Mutex<SessionAggregator>>,
    pub events: broadcast::Sender<SessionEvent>,
    pub config: DetectionConfig,
}

/// How a single tick resolved. Exactly one per processed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame available yet; tick skipped without counting.
    NoFrame,
    NoFace,
    MultipleFaces,
    /// Classifier ran but found no confident emotion; nothing recorded.
    NoEmotion,
    /// A sample was recorded and dispatched to the backend.
    Valid,
    /// The session stopped while the tick's model calls were in flight; the
    /// result was discarded.
    Cancelled,
}

/// Ticks at the configured cadence until cancelled. Ticks are fully
/// serialized: the next tick cannot start before the previous one resolved,
/// so two ticks' results can never interleave into the shared counters.
pub async fn detection_loop(
    deps: DetectionDeps,
    cancel_token: CancellationToken,
    paused_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(deps.config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut policy = WarningPolicy::new(&deps.config);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Pause skips the cycle entirely: no tick count, no counter
                // resets.
                if *paused_rx.borrow() {
                    continue;
                }

                let timestamp = Utc::now();
                let fut = run_detection_tick(&deps, &mut policy, &cancel_token, timestamp);

                match tokio::time::timeout(deps.config.tick_timeout, fut).await {
                    Ok(Ok(TickOutcome::NoFrame)) => {
                        info!("no frame available for session {}, skipping tick", deps.session_id);
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(err)) => {
                        error!("detection tick failed for session {}: {err:?}", deps.session_id);
                        emit_warning(&deps, WarningKind::DetectionError);
                    }
                    Err(_) => {
                        warn!(
                            "detection tick timeout (> {:?}) session {}",
                            deps.config.tick_timeout, deps.session_id
                        );
                        emit_warning(&deps, WarningKind::DetectionError);
                    }
                }
            }
            _ = cancel_token.cancelled() => {
                info!("detection loop shutting down");
                break;
            }
        }
    }
}

/// Runs one classification cycle and resolves it to a single outcome.
pub(crate) async fn run_detection_tick(
    deps: &DetectionDeps,
    policy: &mut WarningPolicy,
    cancel_token: &CancellationToken,
    timestamp: DateTime<Utc>,
) -> Result<TickOutcome> {
    let Some(frame) = deps.camera.current_frame() else {
        return Ok(TickOutcome::NoFrame);
    };

    deps.aggregator.lock().await.record_tick();

    let faces = deps
        .locator
        .locate(&frame)
        .await
        .context("face localization failed")?;

    if faces.is_empty() {
        if policy.observe_no_face() {
            emit_warning(deps, WarningKind::NoFace);
        }
        return Ok(TickOutcome::NoFace);
    }

    if faces.len() > 1 {
        if policy.observe_multiple_faces() {
            emit_warning(deps, WarningKind::MultipleFaces);
        }
        return Ok(TickOutcome::MultipleFaces);
    }

    policy.observe_single_face();

    let region = faces[0]
        .clamped(deps.config.min_face_extent)
        .to_pixel_rect(frame.width, frame.height);
    let Classification { label, confidence } = deps
        .classifier
        .classify(&frame, region)
        .await
        .context("emotion classification failed")?;

    // The session may have stopped while the model calls were in flight; a
    // late tick must not touch the counters or the backend.
    if cancel_token.is_cancelled() {
        return Ok(TickOutcome::Cancelled);
    }

    emit_event(deps, SessionEvent::Emotion { label, confidence });

    if label.is_no_emotion() {
        deps.aggregator.lock().await.record_label(label);
        emit_warning(deps, WarningKind::NoEmotion);
        return Ok(TickOutcome::NoEmotion);
    }

    let sample = EmotionSample::new(timestamp, label, confidence);

    let stats = {
        let mut aggregator = deps.aggregator.lock().await;
        aggregator.record_valid_sample(sample.clone());
        aggregator.snapshot()
    };

    emit_event(
        deps,
        SessionEvent::Attention {
            level: sample.attention_level,
        },
    );
    emit_event(deps, SessionEvent::Stats(stats));

    // Mirror the sample to the backend without holding up the next tick.
    let backend = Arc::clone(&deps.backend);
    let session_id = deps.session_id.clone();
    let submitted = sample;
    tokio::spawn(async move {
        if let Err(err) = backend.submit_sample(&session_id, &submitted).await {
            warn!("failed to submit emotion sample for session {session_id}: {err}");
        }
    });

    Ok(TickOutcome::Valid)
}

fn emit_warning(deps: &DetectionDeps, kind: WarningKind) {
    emit_event(deps, SessionEvent::Warning(Warning::new(kind, &deps.config)));
}

fn emit_event(deps: &DetectionDeps, event: SessionEvent) {
    // Nobody listening is fine; the UI subscribes when it cares.
    let _ = deps.events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmotionLabel, FaceBox, PixelRect};
    use crate::reporting::InMemoryBackend;
    use crate::testutil::{
        face, ErrorLocator, RecordingClassifier, ScriptedClassifier, ScriptedLocator, StaticCamera,
    };
    use std::time::Duration;

    struct TickHarness {
        deps: DetectionDeps,
        events: broadcast::Receiver<SessionEvent>,
        backend: Arc<InMemoryBackend>,
        policy: WarningPolicy,
        cancel_token: CancellationToken,
    }

    async fn harness(
        locator: Arc<dyn FaceLocator>,
        classifier: Arc<dyn EmotionClassifier>,
    ) -> TickHarness {
        let config = DetectionConfig::default();
        let backend = Arc::new(InMemoryBackend::new());
        let session_id = backend.start_session("math").await.unwrap();
        let (events_tx, events_rx) = broadcast::channel(64);

        let deps = DetectionDeps {
            camera: Arc::new(StaticCamera::ready()),
            locator,
            classifier,
            backend: backend.clone(),
            session_id,
            aggregator: Arc::new(Mutex::new(SessionAggregator::new())),
            events: events_tx,
            config: config.clone(),
        };
        TickHarness {
            policy: WarningPolicy::new(&config),
            cancel_token: CancellationToken::new(),
            deps,
            events: events_rx,
            backend,
        }
    }

    impl TickHarness {
        async fn tick(&mut self) -> TickOutcome {
            run_detection_tick(&self.deps, &mut self.policy, &self.cancel_token, Utc::now())
                .await
                .unwrap()
        }

        fn drain_warnings(&mut self) -> Vec<WarningKind> {
            let mut kinds = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                if let SessionEvent::Warning(warning) = event {
                    kinds.push(warning.kind);
                }
            }
            kinds
        }

        async fn wait_for_submissions(&self, expected: usize) {
            for _ in 0..50 {
                if self.backend.sample_count().await == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            panic!("backend never received {expected} samples");
        }
    }

    #[tokio::test]
    async fn test_no_face_warning_then_valid_sample() {
        let locator = ScriptedLocator::new(vec![vec![], vec![], vec![face()]]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::Happy, 0.9);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;

        assert_eq!(harness.tick().await, TickOutcome::NoFace);
        assert_eq!(harness.drain_warnings(), vec![]);

        assert_eq!(harness.tick().await, TickOutcome::NoFace);
        assert_eq!(harness.drain_warnings(), vec![WarningKind::NoFace]);

        assert_eq!(harness.tick().await, TickOutcome::Valid);
        assert_eq!(harness.policy.no_face_run(), 0);

        let stats = harness.deps.aggregator.lock().await.snapshot();
        assert_eq!(stats.tick_count, 3);
        assert_eq!(stats.valid_sample_count, 1);
        assert_eq!(stats.average_attention_percent, 67);

        harness.wait_for_submissions(1).await;
        let submitted = harness.backend.samples().await;
        assert_eq!(submitted[0].label, EmotionLabel::Happy);
        assert_eq!(submitted[0].attention_level, 2);
    }

    #[tokio::test]
    async fn test_three_neutral_ticks_average_to_full_attention() {
        let locator = ScriptedLocator::constant(vec![face()]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::Neutral, 0.8);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;

        for _ in 0..3 {
            assert_eq!(harness.tick().await, TickOutcome::Valid);
        }

        let stats = harness.deps.aggregator.lock().await.snapshot();
        assert_eq!(stats.valid_sample_count, 3);
        assert_eq!(stats.average_attention_percent, 100);
        harness.wait_for_submissions(3).await;
    }

    #[tokio::test]
    async fn test_multi_face_warning_fires_once_at_third_tick() {
        let locator = ScriptedLocator::constant(vec![face(), face()]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::Neutral, 0.8);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;

        assert_eq!(harness.tick().await, TickOutcome::MultipleFaces);
        assert_eq!(harness.tick().await, TickOutcome::MultipleFaces);
        assert_eq!(harness.drain_warnings(), vec![]);

        assert_eq!(harness.tick().await, TickOutcome::MultipleFaces);
        assert_eq!(harness.drain_warnings(), vec![WarningKind::MultipleFaces]);

        let stats = harness.deps.aggregator.lock().await.snapshot();
        assert_eq!(stats.tick_count, 3);
        assert_eq!(stats.valid_sample_count, 0);
        assert_eq!(harness.backend.sample_count().await, 0);
    }

    #[tokio::test]
    async fn test_no_emotion_is_warned_but_never_recorded() {
        let locator = ScriptedLocator::constant(vec![face()]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::NoEmotion, 0.3);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;

        assert_eq!(harness.tick().await, TickOutcome::NoEmotion);

        let mut saw_emotion_event = false;
        let mut warnings = Vec::new();
        while let Ok(event) = harness.events.try_recv() {
            match event {
                SessionEvent::Emotion { label, .. } => {
                    saw_emotion_event = true;
                    assert!(label.is_no_emotion());
                }
                SessionEvent::Warning(warning) => warnings.push(warning),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert!(saw_emotion_event);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::NoEmotion);
        assert_eq!(warnings[0].display_ms, 3000);

        let stats = harness.deps.aggregator.lock().await.snapshot();
        assert_eq!(stats.valid_sample_count, 0);
        assert_eq!(stats.label_counts[&EmotionLabel::NoEmotion], 1);
        // Give any stray submission a chance to land before asserting.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(harness.backend.sample_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_frame_skips_without_counting() {
        let locator = ScriptedLocator::constant(vec![face()]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::Happy, 0.9);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;
        harness.deps.camera = Arc::new(StaticCamera::unready());

        assert_eq!(harness.tick().await, TickOutcome::NoFrame);
        assert_eq!(harness.deps.aggregator.lock().await.tick_count(), 0);
    }

    #[tokio::test]
    async fn test_locator_failure_still_counts_the_tick() {
        let classifier = ScriptedClassifier::constant(EmotionLabel::Happy, 0.9);
        let mut harness = harness(Arc::new(ErrorLocator), Arc::new(classifier)).await;

        let result = run_detection_tick(
            &harness.deps,
            &mut harness.policy,
            &harness.cancel_token,
            Utc::now(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(harness.deps.aggregator.lock().await.tick_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_tick_discards_its_result() {
        let locator = ScriptedLocator::constant(vec![face()]);
        let classifier = ScriptedClassifier::constant(EmotionLabel::Happy, 0.9);
        let mut harness = harness(Arc::new(locator), Arc::new(classifier)).await;

        harness.cancel_token.cancel();
        assert_eq!(harness.tick().await, TickOutcome::Cancelled);

        let stats = harness.deps.aggregator.lock().await.snapshot();
        assert_eq!(stats.valid_sample_count, 0);
        assert_eq!(harness.backend.sample_count().await, 0);
    }

    #[tokio::test]
    async fn test_face_crop_is_clamped_before_classification() {
        let locator = ScriptedLocator::constant(vec![FaceBox {
            x: 0.9,
            y: 0.9,
            width: 0.5,
            height: 0.5,
        }]);
        let classifier = Arc::new(RecordingClassifier::new(EmotionLabel::Happy, 0.9));
        let mut harness = harness(Arc::new(locator), classifier.clone()).await;

        assert_eq!(harness.tick().await, TickOutcome::Valid);

        // StaticCamera frames are 16x16; the oversized box is pulled back to
        // the bottom-right half of the frame.
        assert_eq!(
            classifier.last_region(),
            Some(PixelRect {
                x: 8,
                y: 8,
                width: 8,
                height: 8
            })
        );
    }
}
