use std::time::Duration;

/// Tunable timings and thresholds for a detection session.
///
/// Every literal the loop depends on lives here so tests can shrink the
/// cadence and exercise the warning policy without waiting on wall-clock
/// seconds.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Fixed cadence of the detection loop
    pub tick_interval: Duration,

    /// Upper bound for one tick's model calls before the tick is abandoned
    pub tick_timeout: Duration,

    /// Consecutive no-face ticks before the "no face" warning fires
    pub no_face_warn_after: u32,

    /// Consecutive multi-face ticks before the "multiple people" warning fires
    pub multi_face_warn_after: u32,

    /// Suggested display duration for the no-emotion warning
    pub no_emotion_warning_ms: u64,

    /// Suggested display duration for every other warning
    pub warning_display_ms: u64,

    /// Minimum normalized extent of a face crop on either axis
    pub min_face_extent: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            tick_timeout: Duration::from_secs(10),
            no_face_warn_after: 2,
            multi_face_warn_after: 3,
            no_emotion_warning_ms: 3000,
            warning_display_ms: 5000,
            min_face_extent: 0.01,
        }
    }
}
