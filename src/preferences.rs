//! Interface and gamification preferences
//!
//! Suggests accessibility settings from observed behavior and summarizes how a
//! learner responds to gamification elements. Suggestions are advisory only.

use crate::config::PreferenceConfig;
use crate::lenient;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
    #[serde(alias = "high-contrast")]
    HighContrast,
}

/// Aggregated interface behavior of a learner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiBehavior {
    #[serde(default, alias = "zoomFrequency", deserialize_with = "lenient::or_default")]
    pub zoom_frequency: f64,
    /// Minutes
    #[serde(
        default,
        alias = "averageSessionDuration",
        deserialize_with = "lenient::or_default"
    )]
    pub average_session_duration: f64,
    /// Words per minute; absent means the population default
    #[serde(default, alias = "averageReadingSpeed", deserialize_with = "lenient::number")]
    pub average_reading_speed: Option<f64>,
    /// Tab switches per hour
    #[serde(default, alias = "tabSwitchFrequency", deserialize_with = "lenient::or_default")]
    pub tab_switch_frequency: f64,
}

/// Accessibility settings currently in effect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    #[serde(default, alias = "fontSize", deserialize_with = "lenient::or_default")]
    pub font_size: FontSize,
    #[serde(default, alias = "colorScheme", deserialize_with = "lenient::or_default")]
    pub color_scheme: ColorScheme,
    #[serde(default, alias = "textToSpeech", deserialize_with = "lenient::or_default")]
    pub text_to_speech: bool,
    #[serde(default, alias = "reducedAnimations", deserialize_with = "lenient::or_default")]
    pub reduced_animations: bool,
    #[serde(default, alias = "focusMode", deserialize_with = "lenient::or_default")]
    pub focus_mode: bool,
}

/// Suggested changes; `None` leaves a setting untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSuggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<ColorScheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_to_speech: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_animations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_mode: Option<bool>,
    pub reasons: Vec<String>,
    /// Always false: the learner confirms every change
    pub auto_apply: bool,
}

impl UiSuggestion {
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none()
            && self.color_scheme.is_none()
            && self.text_to_speech.is_none()
            && self.reduced_animations.is_none()
            && self.focus_mode.is_none()
    }
}

/// One logged interaction with a gamification element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamificationEvent {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    Badges,
    Points,
}

/// How a learner responds to gamification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationProfile {
    pub responds_to_achievements: bool,
    pub responds_to_points: bool,
    pub responds_to_leaderboards: bool,
    /// Engagement with gamification elements (0-1)
    pub engagement_score: f64,
    pub preferred_reward_type: RewardType,
    pub recommendations: Vec<String>,
}

/// Preference analysis over interface and gamification behavior
#[derive(Debug, Clone, Default)]
pub struct PreferenceAnalyzer {
    config: PreferenceConfig,
}

impl PreferenceAnalyzer {
    pub fn new(config: PreferenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreferenceConfig {
        &self.config
    }

    /// Suggest accessibility settings for the observed behavior
    pub fn suggest_ui_settings(&self, behavior: &UiBehavior, current: &UiSettings) -> UiSuggestion {
        let cfg = &self.config;
        let mut suggestion = UiSuggestion::default();

        if behavior.zoom_frequency > cfg.frequent_zoom {
            suggestion.font_size = Some(FontSize::Large);
        }

        if behavior.average_session_duration > cfg.long_session
            && current.color_scheme == ColorScheme::Light
        {
            suggestion.color_scheme = Some(ColorScheme::Dark);
            suggestion
                .reasons
                .push("Reduce eye strain during long sessions".to_string());
        }

        let reading_speed = behavior
            .average_reading_speed
            .unwrap_or(cfg.default_reading_speed);
        if reading_speed < cfg.slow_reading {
            suggestion.text_to_speech = Some(true);
            suggestion
                .reasons
                .push("Assist with content consumption".to_string());
        }

        if behavior.tab_switch_frequency > cfg.distracted_tab_switches {
            suggestion.reduced_animations = Some(true);
            suggestion.focus_mode = Some(true);
            suggestion.reasons.push("Minimize distractions".to_string());
        }

        debug!(changes = !suggestion.is_empty(), "suggested ui settings");
        suggestion
    }

    /// Summarize responses to badges, points and leaderboards
    pub fn analyze_gamification(&self, events: &[GamificationEvent]) -> GamificationProfile {
        let cfg = &self.config;
        let count = |needle: &str| events.iter().filter(|e| e.action.contains(needle)).count();
        let badges = count("badge");
        let points = count("points");
        let leaderboards = count("leaderboard");

        let total = (badges + points + leaderboards) as f64;
        let engagement_score = if cfg.full_engagement_events > 0.0 {
            (total / cfg.full_engagement_events).min(1.0)
        } else {
            1.0
        };

        let responds_to_achievements = badges > cfg.badge_response;
        let responds_to_points = points > cfg.points_response;
        let responds_to_leaderboards = leaderboards > cfg.leaderboard_response;

        let preferred_reward_type = if badges > points.max(leaderboards) {
            RewardType::Badges
        } else {
            RewardType::Points
        };

        let mut recommendations = Vec::new();
        if engagement_score < cfg.low_engagement {
            recommendations.push(
                "User shows low engagement with gamification - consider hiding some elements"
                    .to_string(),
            );
        }
        if responds_to_leaderboards {
            recommendations.push("Show competitive challenges".to_string());
        }
        if responds_to_achievements {
            recommendations.push("Highlight achievement progress prominently".to_string());
        }

        GamificationProfile {
            responds_to_achievements,
            responds_to_points,
            responds_to_leaderboards,
            engagement_score,
            preferred_reward_type,
            recommendations,
        }
    }
}
