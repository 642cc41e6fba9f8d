use serde::{Deserialize, Serialize};
use std::fmt;

/// Attention level used when a label string from a model adapter does not map
/// onto the closed label set.
pub const DEFAULT_ATTENTION_LEVEL: u8 = 2;

/// The closed emotion label set produced by the classifier boundary.
///
/// `NoEmotion` is a sentinel meaning "the classifier ran but found no confident
/// emotion" and is distinct from "no face detected".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Anger,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
    NoEmotion,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 8] = [
        EmotionLabel::Anger,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Surprise,
        EmotionLabel::NoEmotion,
    ];

    /// Wire name, matching the backend contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Anger => "anger",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Sad => "sad",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::NoEmotion => "no_emotion",
        }
    }

    pub fn from_name(name: &str) -> Option<EmotionLabel> {
        EmotionLabel::ALL.into_iter().find(|label| label.as_str() == name)
    }

    /// Maps the label onto the 0-3 engagement scale used by the session
    /// statistics. Pure and total.
    pub fn attention_level(self) -> u8 {
        match self {
            EmotionLabel::Anger
            | EmotionLabel::Disgust
            | EmotionLabel::Fear
            | EmotionLabel::Sad => 1,
            EmotionLabel::Happy | EmotionLabel::Surprise => 2,
            EmotionLabel::Neutral => 3,
            EmotionLabel::NoEmotion => 0,
        }
    }

    pub fn is_no_emotion(self) -> bool {
        matches!(self, EmotionLabel::NoEmotion)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attention level for a raw label name as produced by a model adapter.
/// Unrecognized names fall back to [`DEFAULT_ATTENTION_LEVEL`].
pub fn attention_for_name(name: &str) -> u8 {
    EmotionLabel::from_name(name)
        .map(EmotionLabel::attention_level)
        .unwrap_or(DEFAULT_ATTENTION_LEVEL)
}

/// Raw classifier output for one face crop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: EmotionLabel,
    pub confidence: f32,
}
