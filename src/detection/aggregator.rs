//! Per-session aggregate statistics.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{EmotionLabel, EmotionSample};

/// Live statistics snapshot handed to the UI layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub tick_count: u64,
    pub valid_sample_count: u64,
    pub attention_sum: u64,
    pub average_attention_percent: u8,
    pub label_counts: HashMap<EmotionLabel, u64>,
}

/// Accumulates per-tick outcomes for one session.
///
/// Samples keep insertion order; the average and any chronological export walk
/// the same sequence.
#[derive(Debug)]
pub struct SessionAggregator {
    tick_count: u64,
    attention_sum: u64,
    samples: Vec<EmotionSample>,
    label_counts: HashMap<EmotionLabel, u64>,
}

impl SessionAggregator {
    pub fn new() -> Self {
        let label_counts = EmotionLabel::ALL.into_iter().map(|label| (label, 0)).collect();
        Self {
            tick_count: 0,
            attention_sum: 0,
            samples: Vec::new(),
            label_counts,
        }
    }

    /// Counts one processed tick, whatever its outcome.
    pub fn record_tick(&mut self) {
        self.tick_count += 1;
    }

    /// Counts a classified label without creating a sample. Used for the
    /// sentinel `no_emotion` outcome, which the UI still displays.
    pub fn record_label(&mut self, label: EmotionLabel) {
        *self.label_counts.entry(label).or_insert(0) += 1;
    }

    /// Appends a validated sample and folds it into the running counters.
    pub fn record_valid_sample(&mut self, sample: EmotionSample) {
        self.record_label(sample.label);
        self.attention_sum += u64::from(sample.attention_level);
        self.samples.push(sample);
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn valid_sample_count(&self) -> u64 {
        self.samples.len() as u64
    }

    pub fn samples(&self) -> &[EmotionSample] {
        &self.samples
    }

    /// Mean attention over all samples, scaled onto 0-100 where 100 is the
    /// maximum attention level of 3. Returns 0 when no sample exists yet.
    pub fn average_attention_percent(&self) -> u8 {
        if self.samples.is_empty() {
            return 0;
        }
        let mean = self.attention_sum as f64 / self.samples.len() as f64;
        (mean * 100.0 / 3.0).round() as u8
    }

    pub fn snapshot(&self) -> SessionStats {
        SessionStats {
            tick_count: self.tick_count,
            valid_sample_count: self.valid_sample_count(),
            attention_sum: self.attention_sum,
            average_attention_percent: self.average_attention_percent(),
            label_counts: self.label_counts.clone(),
        }
    }

    /// Drops every counter back to zero. Called once at session start.
    pub fn reset(&mut self) {
        *self = SessionAggregator::new();
    }
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new()
    }
}
