//! Real-time emotion and attention tracking for learning sessions.
//!
//! The core is a fixed-cadence detection loop: each tick captures a frame from
//! a [`vision::FrameSource`], locates faces, classifies the dominant emotion
//! of a single user and derives an attention level from it. Transient
//! anomalies (no face, several faces, no confident emotion) are debounced by a
//! run-length warning policy instead of polluting the session statistics;
//! valid samples are aggregated in memory and mirrored to a
//! [`reporting::ReportingBackend`] fire-and-forget.
//!
//! [`session::SessionController`] is the public entry point: it owns the
//! preconditions, the backend session lifecycle and the event stream consumed
//! by the UI layer.

pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod reporting;
pub mod session;
pub mod vision;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::DetectionConfig;
pub use error::{ReportError, SessionError};
pub use models::{
    attention_for_name, Classification, EmotionLabel, EmotionSample, FaceBox, Frame, PixelRect,
};
pub use session::{SessionController, SessionEvent};
