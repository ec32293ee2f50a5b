//! Engine configuration
//!
//! Every threshold, weight and fallback the scoring components use lives in
//! this table. `EngineConfig::default()` reproduces the reference rule set;
//! partial JSON documents override only the keys they name.

use crate::error::ComputeError;
use crate::features::{FEATURE_COUNT, NEUTRAL_EMOTIONAL_STABILITY};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single "value crosses threshold, add weight" rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub threshold: f64,
    pub weight: f64,
}

impl ThresholdRule {
    pub const fn new(threshold: f64, weight: f64) -> Self {
        Self { threshold, weight }
    }

    /// Weight contributed when `value` is strictly above the threshold
    pub fn above(&self, value: f64) -> f64 {
        if value > self.threshold {
            self.weight
        } else {
            0.0
        }
    }

    /// Weight contributed when `value` is strictly below the threshold
    pub fn below(&self, value: f64) -> f64 {
        if value < self.threshold {
            self.weight
        } else {
            0.0
        }
    }
}

/// Feature extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Per-feature normalization ceilings, in feature vector order.
    ///
    /// - avg_duration: 3600 s (one hour)
    /// - avg_completion_rate: 100 %
    /// - avg_focus_level: 10
    /// - session_frequency: 10 sessions/week
    /// - content_variety: 50 distinct items
    /// - performance_score: 100
    /// - emotional_stability: 1
    /// - learning_pace: 1 completion/hour
    /// - interaction_count: 1000
    /// - pause_frequency: 20
    /// - revisit_rate: 10
    /// - hint_usage: 20
    pub ceilings: [f64; FEATURE_COUNT],
    /// Cap on distinct study days per week
    pub max_session_frequency: f64,
    /// Session frequency reported when fewer than two timestamps are usable
    pub default_session_frequency: f64,
    /// Emotional stability reported for an empty history
    pub neutral_emotional_stability: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ceilings: [
                3600.0, 100.0, 10.0, 10.0, 50.0, 100.0, 1.0, 1.0, 1000.0, 20.0, 10.0, 20.0,
            ],
            max_session_frequency: 10.0,
            default_session_frequency: 1.0,
            neutral_emotional_stability: NEUTRAL_EMOTIONAL_STABILITY,
        }
    }
}

/// Performance prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Minimum history length before a trend is labelled
    pub min_trend_points: usize,
    /// Number of most recent scores forming the "recent" mean
    pub recent_window: usize,
    /// Focus level treated as neutral for the score adjustment
    pub focus_pivot: f64,
    pub focus_weight: f64,
    /// Completion rate treated as neutral for the score adjustment
    pub completion_pivot: f64,
    pub completion_divisor: f64,
    pub base_confidence: f64,
    pub confidence_span: f64,
    /// History length at which the data-quantity confidence saturates
    pub full_confidence_points: usize,
    pub max_confidence: f64,
    pub variance_scale: f64,
    pub max_variance_penalty: f64,
    /// Prediction returned when there is no history at all
    pub empty_history_score: f64,
    pub low_score: f64,
    pub high_score: f64,
    pub low_focus: f64,
    pub low_completion: f64,
    pub max_recommendations: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_trend_points: 3,
            recent_window: 3,
            focus_pivot: 5.0,
            focus_weight: 2.0,
            completion_pivot: 50.0,
            completion_divisor: 5.0,
            base_confidence: 0.3,
            confidence_span: 0.5,
            full_confidence_points: 20,
            max_confidence: 0.95,
            variance_scale: 1000.0,
            max_variance_penalty: 0.5,
            empty_history_score: 70.0,
            low_score: 60.0,
            high_score: 85.0,
            low_focus: 5.0,
            low_completion: 50.0,
            max_recommendations: 4,
        }
    }
}

/// Real-time struggle detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StruggleConfig {
    pub pause_frequency: ThresholdRule,
    pub rewinds: ThresholdRule,
    pub help_requests: ThresholdRule,
    pub errors: ThresholdRule,
    /// Fires when focus is below the threshold
    pub low_focus: ThresholdRule,
    /// Threshold is the multiple of expected duration
    pub overtime: ThresholdRule,
    /// Threshold is the fraction of the historical mean score
    pub below_average: ThresholdRule,
    /// Expected session length in seconds when the session does not say
    pub default_expected_duration: f64,
    pub struggle_threshold: f64,
    pub high_severity: f64,
    pub moderate_severity: f64,
    /// More indicators than this raise confidence
    pub confident_indicator_count: usize,
    pub high_confidence: f64,
    pub low_confidence: f64,
}

impl Default for StruggleConfig {
    fn default() -> Self {
        Self {
            pause_frequency: ThresholdRule::new(5.0, 0.2),
            rewinds: ThresholdRule::new(3.0, 0.2),
            help_requests: ThresholdRule::new(2.0, 0.25),
            errors: ThresholdRule::new(3.0, 0.25),
            low_focus: ThresholdRule::new(4.0, 0.15),
            overtime: ThresholdRule::new(1.5, 0.15),
            below_average: ThresholdRule::new(0.7, 0.2),
            default_expected_duration: 600.0,
            struggle_threshold: 0.6,
            high_severity: 0.7,
            moderate_severity: 0.4,
            confident_indicator_count: 2,
            high_confidence: 0.8,
            low_confidence: 0.5,
        }
    }
}

/// Break timing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Cap on the duration-overage contribution
    pub overage_cap: f64,
    /// Samples averaged at each end of the focus timeline
    pub focus_window: usize,
    pub focus_decline_weight: f64,
    /// Idle seconds
    pub idle: ThresholdRule,
    pub errors: ThresholdRule,
    pub fatigue_threshold: f64,
    pub high_urgency: f64,
    /// Minutes
    pub long_break: u32,
    /// Minutes
    pub short_break: u32,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            overage_cap: 0.4,
            focus_window: 3,
            focus_decline_weight: 0.3,
            idle: ThresholdRule::new(60.0, 0.2),
            errors: ThresholdRule::new(2.0, 0.15),
            fatigue_threshold: 0.7,
            high_urgency: 0.85,
            long_break: 10,
            short_break: 5,
        }
    }
}

/// Behavioral pattern matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Below this history length nothing is scored
    pub min_history: usize,
    /// Below this history length results carry "needs more data"
    pub confident_history: usize,
    pub detection_threshold: f64,

    pub tab_switches: ThresholdRule,
    pub low_focus: ThresholdRule,
    pub low_completion: ThresholdRule,
    /// Attention span (minutes) under which a session counts as short
    pub short_attention_span: f64,
    /// Attention span assumed for sessions that did not record one
    pub default_attention_span: f64,
    /// Threshold is the share of short-attention sessions
    pub short_attention_share: ThresholdRule,

    pub rewinds: ThresholdRule,
    pub slow_playback: ThresholdRule,
    /// Completion rate under which a text session counts as a struggle
    pub text_struggle_completion: f64,
    pub text_struggle_share: ThresholdRule,

    /// Threshold is the population variance of session start hours (UTC)
    pub hour_spread: ThresholdRule,
    pub revisit_limit: u32,
    pub revisit_share: ThresholdRule,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_history: 5,
            confident_history: 10,
            detection_threshold: 0.5,
            tab_switches: ThresholdRule::new(3.0, 0.3),
            low_focus: ThresholdRule::new(5.0, 0.3),
            low_completion: ThresholdRule::new(60.0, 0.2),
            short_attention_span: 15.0,
            default_attention_span: 20.0,
            short_attention_share: ThresholdRule::new(0.6, 0.2),
            rewinds: ThresholdRule::new(4.0, 0.3),
            slow_playback: ThresholdRule::new(0.9, 0.3),
            text_struggle_completion: 50.0,
            text_struggle_share: ThresholdRule::new(0.5, 0.4),
            hour_spread: ThresholdRule::new(2.0, 0.3),
            revisit_limit: 2,
            revisit_share: ThresholdRule::new(0.4, 0.3),
        }
    }
}

/// Skill mastery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    /// Exponential smoothing rate applied to each new score
    pub smoothing_rate: f64,
    pub low_mastery: f64,
    pub mastery_threshold: f64,
    pub refresher_after_days: i64,
    pub max_recommendations: usize,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            smoothing_rate: 0.3,
            low_mastery: 0.5,
            mastery_threshold: 0.75,
            refresher_after_days: 7,
            max_recommendations: 10,
        }
    }
}

/// Weights of the engagement score components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementWeights {
    pub completion: f64,
    pub focus: f64,
    pub frequency: f64,
    pub emotional_stability: f64,
    pub performance: f64,
    /// Sessions per week counted as full frequency
    pub full_frequency: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            completion: 0.3,
            focus: 0.2,
            frequency: 0.2,
            emotional_stability: 0.15,
            performance: 0.15,
            full_frequency: 7.0,
        }
    }
}

/// Content engagement prediction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementPredictionConfig {
    pub base: f64,
    /// Added when the content format suits the learning style
    pub format_match_bonus: f64,
    pub exact_level_bonus: f64,
    /// Added when content is one level away from the learner
    pub adjacent_level_bonus: f64,
    pub high_above: f64,
    pub medium_above: f64,
}

impl Default for EngagementPredictionConfig {
    fn default() -> Self {
        Self {
            base: 0.5,
            format_match_bonus: 0.2,
            exact_level_bonus: 0.2,
            adjacent_level_bonus: 0.1,
            high_above: 0.7,
            medium_above: 0.4,
        }
    }
}

/// Content recommendation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub intermediate_from: f64,
    pub advanced_from: f64,
    pub low_focus: f64,
    pub high_focus: f64,
    /// Break intervals in minutes
    pub short_break_interval: u32,
    pub standard_break_interval: u32,
    pub long_break_interval: u32,
    pub attention_deficit_break_cap: u32,
    pub max_formats: usize,
    pub engagement: EngagementWeights,
    pub difficulty_match_points: u32,
    pub completion_fit_points: u32,
    pub variety_points: u32,
    pub engagement_points: u32,
    pub high_completion: f64,
    pub low_completion: f64,
    pub low_variety: f64,
    pub high_engagement: f64,
    pub default_limit: usize,

    /// Mean recent score for an advanced recommendation
    pub strong_score: f64,
    pub good_score: f64,
    /// Share of completed lessons (0-1) for an advanced recommendation
    pub strong_completion: f64,
    pub good_completion: f64,
    pub advanced_confidence: f64,
    pub intermediate_confidence: f64,
    pub beginner_confidence: f64,
    /// Assumed when there are no recent outcomes
    pub default_recent_score: f64,
    pub default_recent_completion: f64,

    /// Engagement below which the daily target is shortened
    pub short_day_engagement: f64,
    /// Daily targets in minutes
    pub short_daily_minutes: u32,
    pub standard_daily_minutes: u32,
    /// Engagement floors of the motivational message bands, highest first
    pub message_bands: [f64; 3],

    pub engagement_prediction: EngagementPredictionConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            intermediate_from: 50.0,
            advanced_from: 75.0,
            low_focus: 5.0,
            high_focus: 7.0,
            short_break_interval: 15,
            standard_break_interval: 25,
            long_break_interval: 30,
            attention_deficit_break_cap: 20,
            max_formats: 3,
            engagement: EngagementWeights::default(),
            difficulty_match_points: 40,
            completion_fit_points: 30,
            variety_points: 20,
            engagement_points: 10,
            high_completion: 80.0,
            low_completion: 50.0,
            low_variety: 5.0,
            high_engagement: 70.0,
            default_limit: 5,
            strong_score: 85.0,
            good_score: 70.0,
            strong_completion: 0.8,
            good_completion: 0.6,
            advanced_confidence: 0.9,
            intermediate_confidence: 0.8,
            beginner_confidence: 0.7,
            default_recent_score: 50.0,
            default_recent_completion: 0.5,
            short_day_engagement: 50.0,
            short_daily_minutes: 30,
            standard_daily_minutes: 45,
            message_bands: [80.0, 60.0, 40.0],
            engagement_prediction: EngagementPredictionConfig::default(),
        }
    }
}

/// Interface and gamification preference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceConfig {
    /// Zooms per session above which a larger font is suggested
    pub frequent_zoom: f64,
    /// Minutes
    pub long_session: f64,
    /// Words per minute
    pub slow_reading: f64,
    pub default_reading_speed: f64,
    /// Tab switches per hour
    pub distracted_tab_switches: f64,
    /// Event counts above which a learner responds to an element
    pub badge_response: usize,
    pub points_response: usize,
    pub leaderboard_response: usize,
    /// Event count treated as full gamification engagement
    pub full_engagement_events: f64,
    pub low_engagement: f64,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            frequent_zoom: 3.0,
            long_session: 30.0,
            slow_reading: 150.0,
            default_reading_speed: 200.0,
            distracted_tab_switches: 5.0,
            badge_response: 2,
            points_response: 2,
            leaderboard_response: 1,
            full_engagement_events: 10.0,
            low_engagement: 0.3,
        }
    }
}

/// Learning insight settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// History length before session length insights are given
    pub min_sessions: usize,
    /// Mean session minutes above which focus is praised
    pub focused_minutes: f64,
    pub short_minutes: f64,
    /// Completed lessons above which consistency is praised
    pub consistent_lessons: usize,
    /// History length before activity is assessed
    pub pace_min_interactions: usize,
    /// Most recent records inspected for activity
    pub pace_window: usize,
    /// At most this many distinct days in the window counts as a burst
    pub active_days: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_sessions: 5,
            focused_minutes: 45.0,
            short_minutes: 15.0,
            consistent_lessons: 10,
            pace_min_interactions: 10,
            pace_window: 10,
            active_days: 7,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: FeatureConfig,
    pub trend: TrendConfig,
    pub struggle: StruggleConfig,
    pub fatigue: FatigueConfig,
    pub patterns: PatternConfig,
    pub mastery: MasteryConfig,
    pub recommender: RecommenderConfig,
    pub preferences: PreferenceConfig,
    pub insights: InsightConfig,
}

impl EngineConfig {
    /// Load configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Reject configurations that would break the documented score bounds
    pub fn validate(&self) -> Result<(), ComputeError> {
        let rules = [
            ("struggle.pause_frequency", self.struggle.pause_frequency),
            ("struggle.rewinds", self.struggle.rewinds),
            ("struggle.help_requests", self.struggle.help_requests),
            ("struggle.errors", self.struggle.errors),
            ("struggle.low_focus", self.struggle.low_focus),
            ("struggle.overtime", self.struggle.overtime),
            ("struggle.below_average", self.struggle.below_average),
            ("fatigue.idle", self.fatigue.idle),
            ("fatigue.errors", self.fatigue.errors),
            ("patterns.tab_switches", self.patterns.tab_switches),
            ("patterns.low_focus", self.patterns.low_focus),
            ("patterns.low_completion", self.patterns.low_completion),
            ("patterns.short_attention_share", self.patterns.short_attention_share),
            ("patterns.rewinds", self.patterns.rewinds),
            ("patterns.slow_playback", self.patterns.slow_playback),
            ("patterns.text_struggle_share", self.patterns.text_struggle_share),
            ("patterns.hour_spread", self.patterns.hour_spread),
            ("patterns.revisit_share", self.patterns.revisit_share),
        ];
        for (name, rule) in rules {
            if !rule.threshold.is_finite() || !rule.weight.is_finite() {
                return Err(ComputeError::InvalidConfig(format!("{name} must be finite")));
            }
            if rule.weight < 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name}.weight must not be negative"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.mastery.smoothing_rate) {
            return Err(ComputeError::InvalidConfig(
                "mastery.smoothing_rate must be within [0, 1]".to_string(),
            ));
        }
        if self.struggle.moderate_severity > self.struggle.high_severity {
            return Err(ComputeError::InvalidConfig(
                "struggle.moderate_severity must not exceed struggle.high_severity".to_string(),
            ));
        }
        if self.fatigue.fatigue_threshold > self.fatigue.high_urgency {
            return Err(ComputeError::InvalidConfig(
                "fatigue.fatigue_threshold must not exceed fatigue.high_urgency".to_string(),
            ));
        }
        if self.recommender.intermediate_from > self.recommender.advanced_from {
            return Err(ComputeError::InvalidConfig(
                "recommender.intermediate_from must not exceed recommender.advanced_from"
                    .to_string(),
            ));
        }
        if let Some(idx) = self
            .features
            .ceilings
            .iter()
            .position(|c| !c.is_finite() || *c <= 0.0)
        {
            return Err(ComputeError::InvalidConfig(format!(
                "features.ceilings[{idx}] must be positive and finite"
            )));
        }
        if self.trend.recent_window == 0 || self.fatigue.focus_window == 0 {
            return Err(ComputeError::InvalidConfig(
                "averaging windows must hold at least one sample".to_string(),
            ));
        }
        Ok(())
    }
}
