//! Scripted fakes for the camera and model boundaries, shared across tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Classification, EmotionLabel, FaceBox, Frame, PixelRect};
use crate::vision::{EmotionClassifier, FaceLocator, FrameSource};

pub(crate) fn face() -> FaceBox {
    FaceBox {
        x: 0.4,
        y: 0.3,
        width: 0.2,
        height: 0.25,
    }
}

/// Camera that is either always ready with a 16x16 frame or never ready.
pub(crate) struct StaticCamera {
    ready: bool,
}

impl StaticCamera {
    pub(crate) fn ready() -> Self {
        Self { ready: true }
    }

    pub(crate) fn unready() -> Self {
        Self { ready: false }
    }
}

impl FrameSource for StaticCamera {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_frame(&self) -> Option<Frame> {
        self.ready
            .then(|| Frame::new(vec![0u8; 16 * 16 * 3], 16, 16))
    }
}

/// Locator that plays back a scripted face list per tick, then a fallback.
pub(crate) struct ScriptedLocator {
    script: Mutex<VecDeque<Vec<FaceBox>>>,
    fallback: Vec<FaceBox>,
}

impl ScriptedLocator {
    pub(crate) fn new(script: Vec<Vec<FaceBox>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Vec::new(),
        }
    }

    pub(crate) fn constant(faces: Vec<FaceBox>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: faces,
        }
    }
}

#[async_trait]
impl FaceLocator for ScriptedLocator {
    async fn locate(&self, _frame: &Frame) -> Result<Vec<FaceBox>> {
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Locator whose model always fails.
pub(crate) struct ErrorLocator;

#[async_trait]
impl FaceLocator for ErrorLocator {
    async fn locate(&self, _frame: &Frame) -> Result<Vec<FaceBox>> {
        Err(anyhow!("face model exploded"))
    }
}

/// Classifier that always yields the same classification.
pub(crate) struct ScriptedClassifier {
    result: Classification,
}

impl ScriptedClassifier {
    pub(crate) fn constant(label: EmotionLabel, confidence: f32) -> Self {
        Self {
            result: Classification { label, confidence },
        }
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self, _frame: &Frame, _region: PixelRect) -> Result<Classification> {
        Ok(self.result)
    }
}

/// Classifier that remembers the crop region it was last handed.
pub(crate) struct RecordingClassifier {
    result: Classification,
    last_region: Mutex<Option<PixelRect>>,
}

impl RecordingClassifier {
    pub(crate) fn new(label: EmotionLabel, confidence: f32) -> Self {
        Self {
            result: Classification { label, confidence },
            last_region: Mutex::new(None),
        }
    }

    pub(crate) fn last_region(&self) -> Option<PixelRect> {
        *self.last_region.lock().unwrap()
    }
}

#[async_trait]
impl EmotionClassifier for RecordingClassifier {
    async fn classify(&self, _frame: &Frame, region: PixelRect) -> Result<Classification> {
        *self.last_region.lock().unwrap() = Some(region);
        Ok(self.result)
    }
}
