//! Demo runner: drives a short session against synthetic camera and model
//! adapters so the whole pipeline can be watched from a terminal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use emosense::config::DetectionConfig;
use emosense::models::{Classification, EmotionLabel, FaceBox, Frame, PixelRect};
use emosense::reporting::InMemoryBackend;
use emosense::session::SessionController;
use emosense::vision::{EmotionClassifier, FaceLocator, FrameSource};

/// Camera producing a flat gray frame on every tick.
struct SyntheticCamera;

impl FrameSource for SyntheticCamera {
    fn is_ready(&self) -> bool {
        true
    }

    fn current_frame(&self) -> Option<Frame> {
        Some(Frame::new(vec![128; 640 * 480 * 3], 640, 480))
    }
}

/// Locator that loses the face for the first two ticks, then finds one.
#[derive(Default)]
struct ScriptedLocator {
    ticks: AtomicUsize,
}

#[async_trait]
impl FaceLocator for ScriptedLocator {
    async fn locate(&self, _frame: &Frame) -> Result<Vec<FaceBox>> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        if tick < 2 {
            return Ok(Vec::new());
        }
        Ok(vec![FaceBox {
            x: 0.3,
            y: 0.2,
            width: 0.25,
            height: 0.3,
        }])
    }
}

/// Classifier cycling through a fixed emotion script.
#[derive(Default)]
struct CyclingClassifier {
    calls: AtomicUsize,
}

#[async_trait]
impl EmotionClassifier for CyclingClassifier {
    async fn classify(&self, _frame: &Frame, _region: PixelRect) -> Result<Classification> {
        const SCRIPT: [(EmotionLabel, f32); 4] = [
            (EmotionLabel::Happy, 0.91),
            (EmotionLabel::Neutral, 0.84),
            (EmotionLabel::NoEmotion, 0.30),
            (EmotionLabel::Surprise, 0.77),
        ];
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let (label, confidence) = SCRIPT[call % SCRIPT.len()];
        Ok(Classification { label, confidence })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("emosense demo starting up...");

    let config = DetectionConfig {
        tick_interval: Duration::from_millis(250),
        ..DetectionConfig::default()
    };

    let backend = Arc::new(InMemoryBackend::new());
    let controller = SessionController::new(Arc::new(SyntheticCamera), backend.clone(), config);
    controller
        .attach_models(
            Arc::new(ScriptedLocator::default()),
            Arc::new(CyclingClassifier::default()),
        )
        .await;

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => log::info!("event: {line}"),
                Err(err) => log::warn!("unserializable event: {err}"),
            }
        }
    });

    controller.start("math").await?;
    tokio::time::sleep(Duration::from_secs(3)).await;
    controller.stop().await?;

    let stats = controller.stats().await;
    log::info!(
        "session finished: {} ticks, {} valid samples, average attention {}%",
        stats.tick_count,
        stats.valid_sample_count,
        stats.average_attention_percent
    );
    log::info!("backend stored {} samples", backend.sample_count().await);

    printer.abort();
    Ok(())
}
