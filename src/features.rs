//! Feature extraction
//!
//! Aggregates a window of interaction records into a fixed twelve-feature
//! vector consumed by the prediction, pattern and recommendation components.

use crate::config::FeatureConfig;
use crate::types::InteractionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Number of features in a [`FeatureVector`]
pub const FEATURE_COUNT: usize = 12;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "avg_duration",
    "avg_completion_rate",
    "avg_focus_level",
    "session_frequency",
    "content_variety",
    "performance_score",
    "emotional_stability",
    "learning_pace",
    "interaction_count",
    "pause_frequency",
    "revisit_rate",
    "hint_usage",
];

/// Emotional stability of a vector with no evidence
pub(crate) const NEUTRAL_EMOTIONAL_STABILITY: f64 = 0.5;

/// Aggregate summary of an interaction window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean duration in seconds
    pub avg_duration: f64,
    /// Mean completion rate (0-100)
    pub avg_completion_rate: f64,
    /// Mean focus level (1-10)
    pub avg_focus_level: f64,
    /// Distinct study days per week (0-10)
    pub session_frequency: f64,
    /// Number of distinct content items
    pub content_variety: f64,
    /// Mean performance score (0-100)
    pub performance_score: f64,
    /// One minus the spread of emotional states (higher = steadier)
    pub emotional_stability: f64,
    /// Completions per hour of total study time
    pub learning_pace: f64,
    pub interaction_count: f64,
    pub pause_frequency: f64,
    /// Mean revisit count
    pub revisit_rate: f64,
    /// Mean hints per interaction
    pub hint_usage: f64,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            avg_duration: 0.0,
            avg_completion_rate: 0.0,
            avg_focus_level: 0.0,
            session_frequency: 0.0,
            content_variety: 0.0,
            performance_score: 0.0,
            emotional_stability: NEUTRAL_EMOTIONAL_STABILITY,
            learning_pace: 0.0,
            interaction_count: 0.0,
            pause_frequency: 0.0,
            revisit_rate: 0.0,
            hint_usage: 0.0,
        }
    }
}

impl FeatureVector {
    /// Feature values in [`FEATURE_NAMES`] order
    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        [
            self.avg_duration,
            self.avg_completion_rate,
            self.avg_focus_level,
            self.session_frequency,
            self.content_variety,
            self.performance_score,
            self.emotional_stability,
            self.learning_pace,
            self.interaction_count,
            self.pause_frequency,
            self.revisit_rate,
            self.hint_usage,
        ]
    }

    /// Look a feature up by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.values()[idx])
    }

    /// (name, value) pairs in vector order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }
}

/// Feature extractor for interaction histories
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract the feature vector from an ordered interaction history
    pub fn extract(&self, records: &[InteractionRecord]) -> FeatureVector {
        if records.is_empty() {
            return FeatureVector {
                emotional_stability: self.config.neutral_emotional_stability,
                ..FeatureVector::default()
            };
        }

        let features = FeatureVector {
            avg_duration: mean_of(records, |r| r.duration),
            avg_completion_rate: mean_of(records, |r| r.completion_rate),
            avg_focus_level: mean_of(records, |r| r.focus_level),
            session_frequency: self.session_frequency(records),
            content_variety: count_distinct_content(records) as f64,
            performance_score: mean_of(records, |r| r.performance.score),
            emotional_stability: compute_emotional_stability(records),
            learning_pace: compute_learning_pace(records),
            interaction_count: records.len() as f64,
            pause_frequency: mean_of(records, |r| r.behavior.pause_frequency),
            revisit_rate: mean_of(records, |r| r.behavior.revisit_count as f64),
            hint_usage: mean_of(records, |r| r.performance.hints as f64),
        };

        debug!(
            records = records.len(),
            performance = features.performance_score,
            focus = features.avg_focus_level,
            "extracted features"
        );
        features
    }

    /// Rescale each feature by its configured ceiling and clamp to [0, 1]
    pub fn normalize(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (slot, (value, ceiling)) in out
            .iter_mut()
            .zip(features.values().into_iter().zip(self.config.ceilings))
        {
            let scaled = value / ceiling;
            *slot = if scaled.is_nan() {
                0.0
            } else {
                scaled.clamp(0.0, 1.0)
            };
        }
        out
    }

    /// Distinct study days per week across the span of the history
    ///
    /// Formula: `distinct_days / max(span_days, 1) * 7`, capped
    fn session_frequency(&self, records: &[InteractionRecord]) -> f64 {
        let parsed: Vec<_> = records.iter().filter_map(|r| r.timestamp_utc()).collect();

        let dropped = records.iter().filter(|r| r.timestamp.is_some()).count() - parsed.len();
        if dropped > 0 {
            warn!(dropped, "ignoring unparseable interaction timestamps");
        }

        let default = self.config.default_session_frequency;
        if parsed.len() < 2 {
            return default;
        }

        let (Some(earliest), Some(latest)) = (parsed.iter().min(), parsed.iter().max()) else {
            return default;
        };
        let span_days = (*latest - *earliest).num_days().max(1) as f64;
        let distinct_days: HashSet<NaiveDate> = parsed.iter().map(|ts| ts.date_naive()).collect();

        (distinct_days.len() as f64 / span_days * 7.0).min(self.config.max_session_frequency)
    }
}

/// Normalize with the default ceilings
pub fn normalize(features: &FeatureVector) -> [f64; FEATURE_COUNT] {
    FeatureExtractor::default().normalize(features)
}

/// Arithmetic mean of a per-record value (records are never skipped)
fn mean_of(records: &[InteractionRecord], value: impl Fn(&InteractionRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(value).sum::<f64>() / records.len() as f64
}

/// Count distinct content identifiers (records without one share a bucket)
fn count_distinct_content(records: &[InteractionRecord]) -> usize {
    records
        .iter()
        .map(|r| r.content_id.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Emotional stability: `1 - population_std(emotion_scores)`
fn compute_emotional_stability(records: &[InteractionRecord]) -> f64 {
    let scores: Vec<f64> = records.iter().map(|r| r.emotional_state.score()).collect();
    1.0 - std_dev(&scores)
}

/// Completions per hour, measured against all time invested (not only the
/// time spent on completed items)
fn compute_learning_pace(records: &[InteractionRecord]) -> f64 {
    let completed = records.iter().filter(|r| r.is_complete()).count();
    if completed == 0 {
        return 0.0;
    }

    let total_hours = records.iter().map(|r| r.duration).sum::<f64>() / 3600.0;
    if total_hours <= 0.0 {
        return 0.0;
    }
    completed as f64 / total_hours
}

/// Population standard deviation
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Population variance (0 for fewer than two values)
pub(crate) fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n
}
