use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One camera frame. Pixel bytes are shared behind an `Arc` so a frame can be
/// handed to the model adapters without copying; frames are ephemeral and never
/// retained past the tick that captured them.
#[derive(Clone)]
pub struct Frame {
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Normalized face bounding box, all coordinates relative to the frame
/// dimensions (`[0, 1]`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FaceBox {
    /// Clamps the box into the unit square and enforces `min_extent` so a
    /// degenerate detection cannot produce an empty crop. The extent is fixed
    /// first; the origin is then pulled back so the box stays inside the frame.
    pub fn clamped(self, min_extent: f32) -> FaceBox {
        let width = self.width.clamp(min_extent, 1.0);
        let height = self.height.clamp(min_extent, 1.0);
        let x = self.x.clamp(0.0, 1.0 - width);
        let y = self.y.clamp(0.0, 1.0 - height);
        FaceBox {
            x,
            y,
            width,
            height,
        }
    }

    /// Converts to pixel coordinates for a frame of the given dimensions.
    /// The crop is never smaller than one pixel on either axis.
    pub fn to_pixel_rect(self, frame_width: u32, frame_height: u32) -> PixelRect {
        PixelRect {
            x: (self.x * frame_width as f32) as u32,
            y: (self.y * frame_height as f32) as u32,
            width: ((self.width * frame_width as f32) as u32).max(1),
            height: ((self.height * frame_height as f32) as u32).max(1),
        }
    }
}

/// Pixel-space crop rectangle derived from a normalized [`FaceBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
