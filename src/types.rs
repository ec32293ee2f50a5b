//! Core types for the learnflux engine
//!
//! This module defines the data structures that flow into and out of the
//! scoring components: raw interaction records, live session snapshots, and
//! the assessments each component produces.
//!
//! Input records accept both the snake_case field names used throughout this
//! crate and the camelCase names used by the interaction store. A field that is
//! null or holds the wrong JSON type decodes to its default.

use crate::lenient;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of logged learning event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    #[default]
    View,
    Complete,
    Pause,
    Resume,
    Skip,
    Review,
    Bookmark,
    Feedback,
    #[serde(other)]
    Other,
}

/// Self-reported or inferred emotional state during an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Confident,
    Engaged,
    #[default]
    Neutral,
    Confused,
    Frustrated,
    #[serde(other)]
    Unknown,
}

impl EmotionalState {
    /// Position of the state on a 0-1 positivity scale
    pub fn score(&self) -> f64 {
        match self {
            EmotionalState::Confident => 1.0,
            EmotionalState::Engaged => 0.8,
            EmotionalState::Neutral => 0.5,
            EmotionalState::Confused => 0.3,
            EmotionalState::Frustrated => 0.1,
            EmotionalState::Unknown => 0.5,
        }
    }
}

/// Behavioral pattern category inferred from aggregate statistics.
///
/// These are behavioral clusters used to adapt the interface, not clinical
/// diagnoses. The aliases accept the tags stored on user profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    #[serde(alias = "adhd")]
    AttentionDeficit,
    #[serde(alias = "dyslexia")]
    ReadingDifficulty,
    #[serde(alias = "autism")]
    RoutinePreference,
}

impl PatternCategory {
    pub const ALL: [PatternCategory; 3] = [
        PatternCategory::AttentionDeficit,
        PatternCategory::ReadingDifficulty,
        PatternCategory::RoutinePreference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternCategory::AttentionDeficit => "attention_deficit",
            PatternCategory::ReadingDifficulty => "reading_difficulty",
            PatternCategory::RoutinePreference => "routine_preference",
        }
    }
}

/// Content difficulty band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

/// Content delivery format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    Text,
    Video,
    Audio,
    Visual,
    Interactive,
    Game,
}

/// Preferred learning style from the user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    #[serde(rename = "reading-writing", alias = "reading_writing", alias = "reading")]
    ReadingWriting,
    #[default]
    Mixed,
    #[serde(other)]
    Other,
}

// ============================================================================
// Interaction records
// ============================================================================

/// Performance outcome of an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Score (0-100)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub score: f64,
    /// Number of attempts
    #[serde(default, deserialize_with = "lenient::count")]
    pub attempts: u32,
    /// Number of hints requested
    #[serde(default, deserialize_with = "lenient::count")]
    pub hints: u32,
    /// Time spent on the assessed part, in seconds
    #[serde(default, alias = "timeSpent", deserialize_with = "lenient::or_default")]
    pub time_spent: f64,
}

/// Pause and revisit behavior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSignals {
    #[serde(default, alias = "pauseFrequency", deserialize_with = "lenient::or_default")]
    pub pause_frequency: f64,
    #[serde(default, alias = "revisitCount", deserialize_with = "lenient::count")]
    pub revisit_count: u32,
}

/// Browser-level activity during an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorMetrics {
    #[serde(default, alias = "tabSwitches", deserialize_with = "lenient::count")]
    pub tab_switches: u32,
    /// Seconds of inactivity
    #[serde(default, alias = "idleTime", deserialize_with = "lenient::or_default")]
    pub idle_time: f64,
}

/// Error and help counters for an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    #[serde(default, alias = "errorCount", deserialize_with = "lenient::count")]
    pub error_count: u32,
    #[serde(default, alias = "helpRequestCount", deserialize_with = "lenient::count")]
    pub help_request_count: u32,
}

/// Video/audio playback behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetrics {
    #[serde(default, alias = "rewindCount", deserialize_with = "lenient::count")]
    pub rewind_count: u32,
    #[serde(
        default = "default_playback_speed",
        alias = "averagePlaybackSpeed",
        deserialize_with = "lenient_playback_speed"
    )]
    pub average_playback_speed: f64,
}

impl Default for MediaMetrics {
    fn default() -> Self {
        Self {
            rewind_count: 0,
            average_playback_speed: default_playback_speed(),
        }
    }
}

fn default_playback_speed() -> f64 {
    1.0
}

fn lenient_playback_speed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::number(deserializer)?.unwrap_or_else(default_playback_speed))
}

/// A focus level sample taken during a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSample {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub timestamp: Option<String>,
    /// Focus level (1-10)
    #[serde(default = "default_focus_level", deserialize_with = "lenient_focus_level")]
    pub level: f64,
}

/// Attention signals for an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionMetrics {
    /// Attention span in minutes; absent means "unknown"
    #[serde(default, alias = "attentionSpan", deserialize_with = "lenient::number")]
    pub attention_span: Option<f64>,
    /// Focus levels over the session, in time order
    #[serde(default, alias = "focusLevelTimeline", deserialize_with = "lenient::list")]
    pub focus_level_timeline: Vec<FocusSample>,
}

/// One logged learning event.
///
/// Every field is optional on the wire. Missing, null or mistyped fields decode
/// to their documented defaults so that aggregations never skip a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(
        default,
        alias = "userId",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
    #[serde(
        default,
        alias = "sessionId",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,
    #[serde(
        default,
        alias = "contentId",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_id: Option<String>,
    /// Free-form content type label (e.g. "text", "video")
    #[serde(
        default,
        alias = "contentType",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(default, alias = "interactionType", deserialize_with = "lenient::or_default")]
    pub interaction_type: InteractionType,
    /// ISO8601 timestamp; unparseable values are ignored by time-based features
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub duration: f64,
    /// Completion rate (0-100)
    #[serde(default, alias = "completionRate", deserialize_with = "lenient::or_default")]
    pub completion_rate: f64,
    /// Focus level (1-10)
    #[serde(
        default = "default_focus_level",
        alias = "focusLevel",
        deserialize_with = "lenient_focus_level"
    )]
    pub focus_level: f64,
    #[serde(default, alias = "emotionalState", deserialize_with = "lenient::or_default")]
    pub emotional_state: EmotionalState,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub performance: PerformanceMetrics,
    #[serde(default, alias = "features", deserialize_with = "lenient::or_default")]
    pub behavior: BehaviorSignals,
    #[serde(
        default,
        alias = "behaviorMetrics",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub behavior_metrics: Option<BehaviorMetrics>,
    #[serde(
        default,
        alias = "sessionMetrics",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_metrics: Option<SessionMetrics>,
    #[serde(
        default,
        alias = "mediaMetrics",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub media: Option<MediaMetrics>,
    #[serde(
        default,
        alias = "attentionMetrics",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub attention: Option<AttentionMetrics>,
    /// Skill tags practiced by this interaction
    #[serde(default, deserialize_with = "lenient::list")]
    pub skills: Vec<String>,
}

pub(crate) fn default_focus_level() -> f64 {
    5.0
}

fn lenient_focus_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::number(deserializer)?.unwrap_or_else(default_focus_level))
}

impl Default for InteractionRecord {
    fn default() -> Self {
        Self {
            user_id: None,
            session_id: None,
            content_id: None,
            content_type: None,
            interaction_type: InteractionType::default(),
            timestamp: None,
            duration: 0.0,
            completion_rate: 0.0,
            focus_level: default_focus_level(),
            emotional_state: EmotionalState::default(),
            performance: PerformanceMetrics::default(),
            behavior: BehaviorSignals::default(),
            behavior_metrics: None,
            session_metrics: None,
            media: None,
            attention: None,
            skills: Vec::new(),
        }
    }
}

impl InteractionRecord {
    /// Parsed timestamp, if present and well formed
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }

    pub fn is_complete(&self) -> bool {
        self.interaction_type == InteractionType::Complete
    }

    pub fn tab_switches(&self) -> u32 {
        self.behavior_metrics.as_ref().map_or(0, |m| m.tab_switches)
    }

    pub fn rewind_count(&self) -> u32 {
        self.media.as_ref().map_or(0, |m| m.rewind_count)
    }

    pub fn playback_speed(&self) -> f64 {
        self.media
            .as_ref()
            .map_or_else(default_playback_speed, |m| m.average_playback_speed)
    }

    pub fn attention_span(&self) -> Option<f64> {
        self.attention.as_ref().and_then(|a| a.attention_span)
    }
}

/// Parse an ISO8601 timestamp.
///
/// Accepts RFC3339 with an offset, a naive date-time (taken as UTC), or a bare
/// calendar date (taken as midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

// ============================================================================
// Live session inputs
// ============================================================================

/// One historical point used for performance prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub score: f64,
    #[serde(default, alias = "completionRate", deserialize_with = "lenient::or_default")]
    pub completion_rate: f64,
    #[serde(
        default = "default_focus_level",
        alias = "focusLevel",
        deserialize_with = "lenient_focus_level"
    )]
    pub focus_level: f64,
}

impl From<&InteractionRecord> for ScorePoint {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            score: record.performance.score,
            completion_rate: record.completion_rate,
            focus_level: record.focus_level,
        }
    }
}

/// Metrics of the session currently in progress, used for struggle detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSession {
    #[serde(default, alias = "pauseFrequency", deserialize_with = "lenient::or_default")]
    pub pause_frequency: f64,
    #[serde(default, alias = "rewindCount", deserialize_with = "lenient::count")]
    pub rewind_count: u32,
    #[serde(default, alias = "helpRequestCount", deserialize_with = "lenient::count")]
    pub help_request_count: u32,
    #[serde(default, alias = "errorCount", deserialize_with = "lenient::count")]
    pub error_count: u32,
    #[serde(
        default = "default_focus_level",
        alias = "focusLevel",
        deserialize_with = "lenient_focus_level"
    )]
    pub focus_level: f64,
    /// Elapsed time in seconds
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub duration: f64,
    /// Expected time in seconds; the configured default applies when absent
    #[serde(default, alias = "expectedDuration", deserialize_with = "lenient::number")]
    pub expected_duration: Option<f64>,
    /// Current score (0-100)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub score: f64,
}

impl Default for LiveSession {
    fn default() -> Self {
        Self {
            pause_frequency: 0.0,
            rewind_count: 0,
            help_request_count: 0,
            error_count: 0,
            focus_level: default_focus_level(),
            duration: 0.0,
            expected_duration: None,
            score: 0.0,
        }
    }
}

impl From<&InteractionRecord> for LiveSession {
    fn from(record: &InteractionRecord) -> Self {
        let session = record.session_metrics.clone().unwrap_or_default();
        Self {
            pause_frequency: record.behavior.pause_frequency,
            rewind_count: record.rewind_count(),
            help_request_count: session.help_request_count,
            error_count: session.error_count,
            focus_level: record.focus_level,
            duration: record.duration,
            expected_duration: None,
            score: record.performance.score,
        }
    }
}

/// Session state used for fatigue estimation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Elapsed time in seconds
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub duration: f64,
    #[serde(default, alias = "focusLevelTimeline", deserialize_with = "lenient::list")]
    pub focus_timeline: Vec<FocusSample>,
    /// Seconds of inactivity
    #[serde(default, alias = "idleTime", deserialize_with = "lenient::or_default")]
    pub idle_time: f64,
    #[serde(default, alias = "errorCount", deserialize_with = "lenient::count")]
    pub error_count: u32,
}

/// A learner's usual study rhythm, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserRhythm {
    #[serde(
        default = "default_attention_span",
        alias = "averageAttentionSpan",
        deserialize_with = "lenient_attention_span"
    )]
    pub average_attention_span: f64,
    #[serde(
        default = "default_break_interval",
        alias = "preferredBreakInterval",
        deserialize_with = "lenient_break_interval"
    )]
    pub preferred_break_interval: f64,
}

impl Default for UserRhythm {
    fn default() -> Self {
        Self {
            average_attention_span: default_attention_span(),
            preferred_break_interval: default_break_interval(),
        }
    }
}

fn default_attention_span() -> f64 {
    20.0
}

fn default_break_interval() -> f64 {
    25.0
}

fn lenient_attention_span<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::number(deserializer)?.unwrap_or_else(default_attention_span))
}

fn lenient_break_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::number(deserializer)?.unwrap_or_else(default_break_interval))
}

/// User profile fields relevant to personalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "neurodiversityType", deserialize_with = "lenient::list")]
    pub neurodiversity_type: Vec<PatternCategory>,
    #[serde(default, alias = "learningStyle", deserialize_with = "lenient::or_default")]
    pub learning_style: LearningStyle,
}

impl UserProfile {
    pub fn has_tag(&self, category: PatternCategory) -> bool {
        self.neurodiversity_type.contains(&category)
    }
}

/// A content item available for recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentCandidate {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<DifficultyLevel>,
    #[serde(
        default,
        alias = "contentType",
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
}

// ============================================================================
// Assessments
// ============================================================================

/// Direction of the recent score trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Forward-looking performance estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted next score (0-100)
    pub predicted_score: f64,
    /// Confidence in the prediction (0-0.95)
    pub confidence: f64,
    pub trend: TrendDirection,
    /// Recent mean relative to overall mean, in percent
    pub improvement_rate: f64,
    /// Mean of all historical scores
    pub current_average: f64,
    pub data_points: usize,
    pub recommendations: Vec<String>,
}

/// Severity band of a struggle score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StruggleLevel {
    Low,
    Moderate,
    High,
}

/// Threshold crossed during struggle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StruggleIndicator {
    HighPauseFrequency,
    MultipleRewinds,
    FrequentHelpRequests,
    HighErrorRate,
    LowFocus,
    ExcessiveTime,
    BelowAveragePerformance,
}

/// Real-time struggle assessment for a live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StruggleAssessment {
    pub is_struggling: bool,
    pub level: StruggleLevel,
    /// Composite struggle score (0-1)
    pub score: f64,
    pub indicators: Vec<StruggleIndicator>,
    pub interventions: Vec<String>,
    pub confidence: f64,
}

/// How soon a break should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakUrgency {
    Low,
    Medium,
    High,
}

/// Break recommendation derived from fatigue signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAssessment {
    pub needs_break: bool,
    /// Composite fatigue score (0-1)
    pub fatigue_score: f64,
    pub urgency: BreakUrgency,
    /// Suggested break length in minutes
    pub suggested_duration: u32,
    pub message: String,
    /// Minutes until the next recommended break (0 when a break is due)
    pub minutes_until_next_break: u32,
    /// Whole minutes elapsed in the current session
    pub current_session_minutes: u32,
}

/// Kind of adaptation suggested for a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationKind {
    ContentFormat,
    ContentStructure,
    UiAdjustment,
}

/// An adaptive-UI or content recommendation with its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRecommendation {
    pub kind: AdaptationKind,
    pub recommendation: String,
    pub reason: String,
}

/// Pattern confidence scores across a user's full history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAssessment {
    /// Per-category confidence (0-1); empty when there is too little history
    pub scores: BTreeMap<PatternCategory, f64>,
    /// Categories at or above the detection threshold
    pub detected: Vec<PatternCategory>,
    /// Mean of all category scores
    pub confidence: f64,
    pub needs_more_data: bool,
    pub recommendations: Vec<AdaptiveRecommendation>,
}

impl PatternAssessment {
    /// Result shape returned when history is too short to score
    pub fn insufficient() -> Self {
        Self {
            scores: BTreeMap::new(),
            detected: Vec::new(),
            confidence: 0.0,
            needs_more_data: true,
            recommendations: Vec::new(),
        }
    }
}

/// Smoothed proficiency state for one skill
///
/// Stored state decodes leniently: a missing or malformed field takes its zero
/// value, and `last_practiced` accepts any timestamp [`parse_timestamp`]
/// understands, falling back to the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillMastery {
    /// Mastery level (0-1)
    #[serde(default, alias = "masteryLevel", deserialize_with = "lenient::or_default")]
    pub mastery_level: f64,
    #[serde(default, alias = "practiceCount", deserialize_with = "lenient::count")]
    pub practice_count: u32,
    /// Cumulative mean of normalized scores (0-1)
    #[serde(default, alias = "averageScore", deserialize_with = "lenient::or_default")]
    pub average_score: f64,
    #[serde(default, alias = "lastPracticed", deserialize_with = "lenient::timestamp")]
    pub last_practiced: DateTime<Utc>,
}

/// Per-skill mastery state, owned and persisted by the caller
pub type MasteryMap = BTreeMap<String, SkillMastery>;

/// An interaction as seen by the mastery tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillInteraction {
    #[serde(default, deserialize_with = "lenient::list")]
    pub skills: Vec<String>,
    /// Score (0-100)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub score: f64,
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
}

impl From<&InteractionRecord> for SkillInteraction {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            skills: record.skills.clone(),
            score: record.performance.score,
            timestamp: record.timestamp.clone(),
        }
    }
}

/// Practice priority for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticePriority {
    Low,
    Medium,
    High,
}

/// A skill the learner should practice next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecommendation {
    pub skill: String,
    pub mastery_level: f64,
    pub priority: PracticePriority,
    pub reason: String,
    pub days_since_practice: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_record_defaults_from_empty_object() {
        let record: InteractionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.duration, 0.0);
        assert_eq!(record.focus_level, 5.0);
        assert_eq!(record.emotional_state, EmotionalState::Neutral);
        assert_eq!(record.interaction_type, InteractionType::View);
        assert_eq!(record.performance.score, 0.0);
        assert_eq!(record.playback_speed(), 1.0);
        assert!(record.attention_span().is_none());
    }

    #[test]
    fn test_record_accepts_camel_case_store_format() {
        let json = r#"{
            "userId": "u1",
            "contentId": "c1",
            "interactionType": "complete",
            "duration": 600,
            "completionRate": 95,
            "focusLevel": 8,
            "emotionalState": "engaged",
            "performance": { "score": 85, "hints": 2, "timeSpent": 540 },
            "features": { "pauseFrequency": 3, "revisitCount": 1 },
            "behaviorMetrics": { "tabSwitches": 4, "idleTime": 30 },
            "mediaMetrics": { "rewindCount": 2, "averagePlaybackSpeed": 0.75 },
            "attentionMetrics": { "attentionSpan": 12 },
            "timestamp": "2024-01-15T14:00:00Z"
        }"#;

        let record: InteractionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content_id.as_deref(), Some("c1"));
        assert!(record.is_complete());
        assert_eq!(record.completion_rate, 95.0);
        assert_eq!(record.performance.hints, 2);
        assert_eq!(record.behavior.revisit_count, 1);
        assert_eq!(record.tab_switches(), 4);
        assert_eq!(record.rewind_count(), 2);
        assert_eq!(record.playback_speed(), 0.75);
        assert_eq!(record.attention_span(), Some(12.0));
    }

    #[test]
    fn test_unknown_labels_decode_to_fallbacks() {
        let record: InteractionRecord =
            serde_json::from_str(r#"{"emotionalState": "bored", "interactionType": "share"}"#)
                .unwrap();
        assert_eq!(record.emotional_state, EmotionalState::Unknown);
        assert_eq!(record.emotional_state.score(), 0.5);
        assert_eq!(record.interaction_type, InteractionType::Other);
    }

    #[test]
    fn test_pattern_category_profile_aliases() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"neurodiversityType": ["adhd", "dyslexia"], "learningStyle": "visual"}"#)
                .unwrap();
        assert!(profile.has_tag(PatternCategory::AttentionDeficit));
        assert!(profile.has_tag(PatternCategory::ReadingDifficulty));
        assert!(!profile.has_tag(PatternCategory::RoutinePreference));
        assert_eq!(profile.learning_style, LearningStyle::Visual);

        let json = serde_json::to_string(&PatternCategory::AttentionDeficit).unwrap();
        assert_eq!(json, "\"attention_deficit\"");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let rfc = parse_timestamp("2024-01-15T14:05:00Z").unwrap();
        assert_eq!(rfc.hour(), 14);

        let offset = parse_timestamp("2024-01-15T14:05:00+02:00").unwrap();
        assert_eq!(offset.hour(), 12);

        let naive = parse_timestamp("2024-01-15T14:05:00.123").unwrap();
        assert_eq!(naive.minute(), 5);

        let date = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(date.day(), 15);
        assert_eq!(date.hour(), 0);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_null_and_float_fields_decode_to_defaults() {
        let json = r#"{
            "duration": null,
            "focusLevel": "high",
            "contentId": 42,
            "emotionalState": null,
            "performance": { "score": 80, "hints": 1.0, "attempts": null },
            "features": { "revisitCount": 2.4 },
            "mediaMetrics": { "averagePlaybackSpeed": null },
            "attentionMetrics": { "focusLevelTimeline": [{ "level": 6 }, { "level": null }, 3] },
            "skills": ["algebra", 7]
        }"#;

        let record: InteractionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.duration, 0.0);
        assert_eq!(record.focus_level, 5.0);
        assert!(record.content_id.is_none());
        assert_eq!(record.emotional_state, EmotionalState::Neutral);
        assert_eq!(record.performance.score, 80.0);
        assert_eq!(record.performance.hints, 1);
        assert_eq!(record.performance.attempts, 0);
        assert_eq!(record.behavior.revisit_count, 2);
        assert_eq!(record.playback_speed(), 1.0);
        let timeline = &record.attention.as_ref().unwrap().focus_level_timeline;
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[1].level, 5.0);
        assert_eq!(record.skills, vec!["algebra".to_string()]);
    }

    #[test]
    fn test_skill_mastery_accepts_stored_format() {
        let mastery: SkillMastery = serde_json::from_str(
            r#"{"masteryLevel": 0.4, "lastPracticed": "2024-01-15T14:00:00.123456"}"#,
        )
        .unwrap();
        assert_eq!(mastery.mastery_level, 0.4);
        assert_eq!(mastery.practice_count, 0);
        assert_eq!(mastery.average_score, 0.0);
        assert_eq!(mastery.last_practiced.hour(), 14);
        assert_eq!(mastery.last_practiced.timestamp_subsec_micros(), 123_456);

        let bare: SkillMastery = serde_json::from_str(r#"{"lastPracticed": null}"#).unwrap();
        assert_eq!(bare.last_practiced, DateTime::<Utc>::default());
    }

    #[test]
    fn test_struggle_indicator_serialization() {
        let json = serde_json::to_string(&StruggleIndicator::BelowAveragePerformance).unwrap();
        assert_eq!(json, "\"below_average_performance\"");
    }
}
