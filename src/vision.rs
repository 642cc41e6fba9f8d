//! Capability seams for the external camera and model collaborators.
//!
//! The core never talks to a concrete model library; adapters implement these
//! narrow traits and own whatever shape the underlying runtime has (callback
//! APIs may cache their last result and return it from `locate`).

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Classification, FaceBox, Frame, PixelRect};

/// Live camera feed. `current_frame` may be empty before the camera finished
/// its permission/startup handshake.
pub trait FrameSource: Send + Sync {
    fn is_ready(&self) -> bool;
    fn current_frame(&self) -> Option<Frame>;
}

/// Face localization model.
#[async_trait]
pub trait FaceLocator: Send + Sync {
    /// Returns every face found in the frame as a normalized bounding box.
    async fn locate(&self, frame: &Frame) -> Result<Vec<FaceBox>>;
}

/// Emotion classification model, invoked on one face crop per tick.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, frame: &Frame, region: PixelRect) -> Result<Classification>;
}
