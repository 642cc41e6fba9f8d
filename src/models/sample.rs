use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::emotion::EmotionLabel;

/// One validated emotion observation. Created only for ticks that saw exactly
/// one face and a non-sentinel label; immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub timestamp: DateTime<Utc>,
    pub label: EmotionLabel,
    pub attention_level: u8,
    pub confidence: f32,
}

impl EmotionSample {
    /// Builds a sample, deriving the attention level from the label.
    pub fn new(timestamp: DateTime<Utc>, label: EmotionLabel, confidence: f32) -> Self {
        Self {
            timestamp,
            label,
            attention_level: label.attention_level(),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_derives_attention_from_label() {
        let sample = EmotionSample::new(Utc::now(), EmotionLabel::Happy, 0.9);
        assert_eq!(sample.attention_level, 2);

        let sample = EmotionSample::new(Utc::now(), EmotionLabel::Neutral, 0.8);
        assert_eq!(sample.attention_level, 3);
    }

    #[test]
    fn test_sample_serializes_camel_case() {
        let sample = EmotionSample::new(Utc::now(), EmotionLabel::Sad, 0.5);
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["label"], "sad");
        assert_eq!(value["attentionLevel"], 1);
        assert!(value["timestamp"].is_string());
    }
}
