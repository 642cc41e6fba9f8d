//! Events produced to the surrounding UI layer.

use serde::Serialize;

use crate::detection::{SessionStats, Warning};
use crate::models::EmotionLabel;

/// UI-facing signal stream for one session, delivered over a broadcast
/// channel. Consumers that only care about one variant filter locally.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Transient warning with a suggested display duration.
    Warning(Warning),
    /// Latest classified emotion, including the no-emotion sentinel.
    Emotion { label: EmotionLabel, confidence: f32 },
    /// Attention level derived from the latest valid sample.
    Attention { level: u8 },
    /// Updated aggregate statistics after a valid sample.
    Stats(SessionStats),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectionConfig;
    use crate::detection::WarningKind;

    #[test]
    fn test_events_are_tagged_for_the_ui() {
        let warning = Warning::new(WarningKind::NoFace, &DetectionConfig::default());
        let value = serde_json::to_value(SessionEvent::Warning(warning)).unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["kind"], "noFace");
        assert_eq!(value["displayMs"], 5000);

        let value = serde_json::to_value(SessionEvent::Attention { level: 3 }).unwrap();
        assert_eq!(value["type"], "attention");
        assert_eq!(value["level"], 3);
    }
}
