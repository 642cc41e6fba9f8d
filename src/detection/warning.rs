//! Run-length hysteresis over transient detection anomalies.

use serde::Serialize;

use crate::config::DetectionConfig;

/// Warning categories surfaced to the UI layer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    NoFace,
    MultipleFaces,
    NoEmotion,
    DetectionError,
}

impl WarningKind {
    /// Deterministic user-facing message for the kind.
    pub fn message(self) -> &'static str {
        match self {
            WarningKind::NoFace => "No face detected, please face the camera",
            WarningKind::MultipleFaces => "Multiple people detected, please study alone",
            WarningKind::NoEmotion => "No emotion detected, please stay in front of the camera",
            WarningKind::DetectionError => "Detection error, please try again",
        }
    }
}

/// One warning signal: what happened, the message to show, and how long the UI
/// should keep it on screen. Display itself is the UI's concern.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    pub display_ms: u64,
}

impl Warning {
    pub fn new(kind: WarningKind, config: &DetectionConfig) -> Self {
        let display_ms = match kind {
            WarningKind::NoEmotion => config.no_emotion_warning_ms,
            _ => config.warning_display_ms,
        };
        Self {
            kind,
            message: kind.message().to_string(),
            display_ms,
        }
    }
}

/// Debounce state machine over the two face-count anomalies.
///
/// Counters only move on processed ticks: anomalous ticks increment them, a
/// single-face tick resets both unconditionally. A warning fires exactly once
/// per anomaly run, on the tick where the run-length reaches the threshold.
#[derive(Debug)]
pub struct WarningPolicy {
    no_face_run: u32,
    multi_face_run: u32,
    no_face_warn_after: u32,
    multi_face_warn_after: u32,
}

impl WarningPolicy {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            no_face_run: 0,
            multi_face_run: 0,
            no_face_warn_after: config.no_face_warn_after,
            multi_face_warn_after: config.multi_face_warn_after,
        }
    }

    /// Records a zero-face tick. Returns true when the no-face warning fires.
    pub fn observe_no_face(&mut self) -> bool {
        self.no_face_run += 1;
        self.no_face_run == self.no_face_warn_after
    }

    /// Records a multi-face tick. Returns true when the multi-face warning fires.
    pub fn observe_multiple_faces(&mut self) -> bool {
        self.multi_face_run += 1;
        self.multi_face_run == self.multi_face_warn_after
    }

    /// A single-face tick clears both runs.
    pub fn observe_single_face(&mut self) {
        self.no_face_run = 0;
        self.multi_face_run = 0;
    }

    pub fn no_face_run(&self) -> u32 {
        self.no_face_run
    }

    pub fn multi_face_run(&self) -> u32 {
        self.multi_face_run
    }
}
