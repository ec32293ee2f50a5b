//! Content recommendation
//!
//! Threshold and lookup functions that turn aggregated features and a user
//! profile into difficulty, format, pacing and ranking decisions.

use crate::config::RecommenderConfig;
use crate::features::FeatureVector;
use crate::lenient;
use crate::types::{
    ContentCandidate, ContentFormat, DifficultyLevel, LearningStyle, PatternCategory, UserProfile,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// One recent lesson outcome used for difficulty adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LessonOutcome {
    /// Score (0-100)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub completed: bool,
}

/// Learner attributes used for engagement prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerFeatures {
    #[serde(default, alias = "learningStyle", deserialize_with = "lenient::or_default")]
    pub learning_style: LearningStyle,
    /// Learner level on the 1 (beginner) to 3 (advanced) scale
    #[serde(
        default = "default_learner_level",
        alias = "currentLevel",
        deserialize_with = "lenient_learner_level"
    )]
    pub current_level: f64,
}

impl Default for LearnerFeatures {
    fn default() -> Self {
        Self {
            learning_style: LearningStyle::default(),
            current_level: default_learner_level(),
        }
    }
}

fn default_learner_level() -> f64 {
    1.0
}

fn lenient_learner_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(lenient::number(deserializer)?.unwrap_or_else(default_learner_level))
}

/// Content attributes used for engagement prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFeatures {
    /// Free-form format label (e.g. "video", "article")
    #[serde(default = "default_content_format", deserialize_with = "lenient_content_format")]
    pub format: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub difficulty: DifficultyLevel,
}

impl Default for ContentFeatures {
    fn default() -> Self {
        Self {
            format: default_content_format(),
            difficulty: DifficultyLevel::default(),
        }
    }
}

fn default_content_format() -> String {
    "text".to_string()
}

fn lenient_content_format<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let format: Option<String> = lenient::or_default(deserializer)?;
    Ok(format.unwrap_or_else(default_content_format))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

/// Expected engagement of one learner with one content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementPrediction {
    /// Predicted engagement (0-1)
    pub engagement_score: f64,
    pub level: EngagementLevel,
    pub format_match: bool,
    /// Content is within one level of the learner
    pub difficulty_match: bool,
    pub learning_style: LearningStyle,
    pub content_format: String,
}

/// Result of adaptive difficulty adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAdjustment {
    pub recommended: DifficultyLevel,
    pub confidence: f64,
    pub average_score: f64,
    /// Share of completed lessons, in percent
    pub completion_rate: f64,
    pub reasoning: String,
}

/// A content candidate with its ranking points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContent {
    #[serde(flatten)]
    pub content: ContentCandidate,
    pub score: u32,
}

/// Personalized learning plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub difficulty: DifficultyLevel,
    pub formats: Vec<ContentFormat>,
    /// Minutes between breaks
    pub break_frequency: u32,
    /// Engagement score (0-100)
    pub engagement_score: f64,
    pub daily_minutes: u32,
    pub motivational_message: String,
}

/// Recommends difficulty, formats, pacing and content order
#[derive(Debug, Clone, Default)]
pub struct ContentRecommender {
    config: RecommenderConfig,
}

impl ContentRecommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Difficulty band for `score * focus / 10`
    pub fn recommend_difficulty(&self, score: f64, focus_level: f64) -> DifficultyLevel {
        let adjusted = score * (focus_level / 10.0);
        if adjusted >= self.config.advanced_from {
            DifficultyLevel::Advanced
        } else if adjusted >= self.config.intermediate_from {
            DifficultyLevel::Intermediate
        } else {
            DifficultyLevel::Beginner
        }
    }

    /// Preferred formats, most preferred first, at most three
    pub fn recommend_content_formats(&self, profile: &UserProfile) -> Vec<ContentFormat> {
        use crate::types::ContentFormat::*;

        let mut formats: Vec<ContentFormat> = match profile.learning_style {
            LearningStyle::Visual => vec![Video, Visual, Interactive],
            LearningStyle::Auditory => vec![Audio, Video],
            LearningStyle::Kinesthetic => vec![Interactive, Game],
            LearningStyle::ReadingWriting => vec![Text],
            LearningStyle::Mixed => vec![Text, Video, Interactive],
            LearningStyle::Other => vec![Text],
        };

        if profile.has_tag(PatternCategory::ReadingDifficulty) {
            formats.retain(|f| *f != Text);
            formats = prepend(&[Audio, Video], formats);
        }
        if profile.has_tag(PatternCategory::AttentionDeficit) {
            formats = prepend(&[Interactive, Game, Video], formats);
        }
        if profile.has_tag(PatternCategory::RoutinePreference) {
            formats = prepend(&[Visual, Interactive], formats);
        }

        let mut unique = Vec::with_capacity(formats.len());
        for format in formats {
            if !unique.contains(&format) {
                unique.push(format);
            }
        }
        unique.truncate(self.config.max_formats);
        unique
    }

    /// Minutes between breaks for the given focus level
    pub fn recommend_break_frequency(&self, focus_level: f64, profile: &UserProfile) -> u32 {
        let cfg = &self.config;
        let interval = if focus_level < cfg.low_focus {
            cfg.short_break_interval
        } else if focus_level > cfg.high_focus {
            cfg.long_break_interval
        } else {
            cfg.standard_break_interval
        };

        if profile.has_tag(PatternCategory::AttentionDeficit) {
            interval.min(cfg.attention_deficit_break_cap)
        } else {
            interval
        }
    }

    /// Weighted engagement score (0-100)
    pub fn engagement_score(&self, features: &FeatureVector) -> f64 {
        let w = &self.config.engagement;
        let frequency = if w.full_frequency > 0.0 {
            (features.session_frequency / w.full_frequency).min(1.0)
        } else {
            1.0
        };

        let score = features.avg_completion_rate / 100.0 * w.completion
            + features.avg_focus_level / 10.0 * w.focus
            + frequency * w.frequency
            + features.emotional_stability * w.emotional_stability
            + features.performance_score / 100.0 * w.performance;

        (score * 100.0).min(100.0)
    }

    /// Rank candidates by points and keep the best `limit` (ties keep input order)
    pub fn rank_content(
        &self,
        candidates: &[ContentCandidate],
        features: &FeatureVector,
        limit: Option<usize>,
    ) -> Vec<RankedContent> {
        let cfg = &self.config;
        let recommended =
            self.recommend_difficulty(features.performance_score, features.avg_focus_level);
        let engagement = self.engagement_score(features);

        let mut ranked: Vec<RankedContent> = candidates
            .iter()
            .map(|candidate| {
                let mut score = 0;
                if candidate.difficulty == Some(recommended) {
                    score += cfg.difficulty_match_points;
                }

                let beginner = candidate.difficulty == Some(DifficultyLevel::Beginner);
                let stretches = features.avg_completion_rate > cfg.high_completion && !beginner;
                let eases = features.avg_completion_rate < cfg.low_completion && beginner;
                if stretches || eases {
                    score += cfg.completion_fit_points;
                }

                if features.content_variety < cfg.low_variety {
                    score += cfg.variety_points;
                }
                if engagement > cfg.high_engagement {
                    score += cfg.engagement_points;
                }

                RankedContent {
                    content: candidate.clone(),
                    score,
                }
            })
            .collect();

        // sort_by is stable, so equal scores keep candidate order
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(limit.unwrap_or(cfg.default_limit));

        debug!(
            candidates = candidates.len(),
            returned = ranked.len(),
            difficulty = recommended.as_str(),
            "ranked content"
        );
        ranked
    }

    /// Suggest the next difficulty level from recent lesson outcomes
    pub fn adjust_difficulty(
        &self,
        recent: &[LessonOutcome],
        current: DifficultyLevel,
    ) -> DifficultyAdjustment {
        let cfg = &self.config;
        let (average_score, completion) = if recent.is_empty() {
            (cfg.default_recent_score, cfg.default_recent_completion)
        } else {
            let n = recent.len() as f64;
            let average = recent.iter().map(|o| o.score).sum::<f64>() / n;
            let completed = recent.iter().filter(|o| o.completed).count() as f64 / n;
            (average, completed)
        };

        let (mut recommended, confidence) =
            if average_score >= cfg.strong_score && completion >= cfg.strong_completion {
                (DifficultyLevel::Advanced, cfg.advanced_confidence)
            } else if average_score >= cfg.good_score && completion >= cfg.good_completion {
                (DifficultyLevel::Intermediate, cfg.intermediate_confidence)
            } else {
                (DifficultyLevel::Beginner, cfg.beginner_confidence)
            };

        // Never drop straight from advanced to beginner
        if current == DifficultyLevel::Advanced && recommended == DifficultyLevel::Beginner {
            recommended = DifficultyLevel::Intermediate;
        }

        let completion_rate = completion * 100.0;
        let score_reason = if average_score >= cfg.strong_score {
            format!("Your average score of {average_score:.0}% shows strong mastery")
        } else if average_score >= cfg.good_score {
            format!("Your score of {average_score:.0}% indicates good understanding")
        } else {
            format!("Your score of {average_score:.0}% suggests more practice needed")
        };
        let completion_reason = if completion >= cfg.strong_completion {
            format!("You complete {completion_rate:.0}% of lessons")
        } else if completion >= cfg.good_completion {
            format!("Completion rate of {completion_rate:.0}% shows commitment")
        } else {
            format!("Try to improve your {completion_rate:.0}% completion rate")
        };

        DifficultyAdjustment {
            recommended,
            confidence,
            average_score,
            completion_rate,
            reasoning: format!("{score_reason} | {completion_reason}"),
        }
    }

    /// Assemble a learning plan from features and profile
    pub fn learning_path(&self, features: &FeatureVector, profile: &UserProfile) -> LearningPath {
        let cfg = &self.config;
        let engagement_score = self.engagement_score(features);
        let daily_minutes = if engagement_score < cfg.short_day_engagement {
            cfg.short_daily_minutes
        } else {
            cfg.standard_daily_minutes
        };

        LearningPath {
            difficulty: self
                .recommend_difficulty(features.performance_score, features.avg_focus_level),
            formats: self.recommend_content_formats(profile),
            break_frequency: self.recommend_break_frequency(features.avg_focus_level, profile),
            engagement_score,
            daily_minutes,
            motivational_message: self.motivational_message(engagement_score).to_string(),
        }
    }

    /// Predict how engaging a content item will be for a learner.
    ///
    /// Starts from a neutral base, adds a bonus when the content format suits
    /// the learning style and another when the content level is close to the
    /// learner's level.
    pub fn predict_engagement(
        &self,
        learner: &LearnerFeatures,
        content: &ContentFeatures,
    ) -> EngagementPrediction {
        let cfg = &self.config.engagement_prediction;
        let format = content.format.to_lowercase();
        let format_match = style_formats(learner.learning_style).contains(&format.as_str());

        let level_gap = (learner.current_level - level_rank(content.difficulty)).abs();

        let mut score = cfg.base;
        if format_match {
            score += cfg.format_match_bonus;
        }
        if level_gap == 0.0 {
            score += cfg.exact_level_bonus;
        } else if level_gap == 1.0 {
            score += cfg.adjacent_level_bonus;
        }
        let engagement_score = score.clamp(0.0, 1.0);

        let level = if engagement_score > cfg.high_above {
            EngagementLevel::High
        } else if engagement_score > cfg.medium_above {
            EngagementLevel::Medium
        } else {
            EngagementLevel::Low
        };

        debug!(
            score = engagement_score,
            format_match,
            level_gap,
            "predicted engagement"
        );
        EngagementPrediction {
            engagement_score,
            level,
            format_match,
            difficulty_match: level_gap <= 1.0,
            learning_style: learner.learning_style,
            content_format: content.format.clone(),
        }
    }

    fn motivational_message(&self, engagement: f64) -> &'static str {
        let [high, medium, low] = self.config.message_bands;
        if engagement >= high {
            "You're doing amazing! Keep up the excellent work!"
        } else if engagement >= medium {
            "Great progress! You're on the right track!"
        } else if engagement >= low {
            "Good effort! Let's build momentum together!"
        } else {
            "Let's take it one step at a time. You've got this!"
        }
    }
}

fn prepend(front: &[ContentFormat], rest: Vec<ContentFormat>) -> Vec<ContentFormat> {
    front.iter().copied().chain(rest).collect()
}

/// Format labels that suit a learning style
fn style_formats(style: LearningStyle) -> &'static [&'static str] {
    match style {
        LearningStyle::Visual => &["video", "interactive"],
        LearningStyle::Auditory => &["audio", "video"],
        LearningStyle::Kinesthetic => &["interactive", "exercise"],
        LearningStyle::ReadingWriting => &["text", "article"],
        LearningStyle::Mixed | LearningStyle::Other => &[],
    }
}

fn level_rank(level: DifficultyLevel) -> f64 {
    match level {
        DifficultyLevel::Beginner => 1.0,
        DifficultyLevel::Intermediate => 2.0,
        DifficultyLevel::Advanced => 3.0,
    }
}
