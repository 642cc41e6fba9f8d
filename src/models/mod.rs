mod emotion;
mod frame;
mod sample;

pub use emotion::{attention_for_name, Classification, EmotionLabel, DEFAULT_ATTENTION_LEVEL};
pub use frame::{FaceBox, Frame, PixelRect};
pub use sample::EmotionSample;
