//! Learning insights
//!
//! Short learner-facing observations about study habits: session length,
//! lesson completion and recent activity.

use crate::config::InsightConfig;
use crate::types::InteractionRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Strength,
    Suggestion,
    Achievement,
    Info,
}

/// One observation shown to the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningInsight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl LearningInsight {
    fn new(kind: InsightKind, title: &str, description: String, icon: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description,
            icon: icon.to_string(),
        }
    }
}

/// Derives insights from a learner's history
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    config: InsightConfig,
}

impl InsightGenerator {
    pub fn new(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Insights for a history and a count of completed lessons.
    ///
    /// Never empty: a learner with nothing notable gets a getting-started
    /// insight.
    pub fn generate(
        &self,
        history: &[InteractionRecord],
        completed_lessons: usize,
    ) -> Vec<LearningInsight> {
        let cfg = &self.config;
        let mut insights = Vec::new();

        if history.len() >= cfg.min_sessions {
            let average_minutes =
                history.iter().map(|r| r.duration).sum::<f64>() / history.len() as f64 / 60.0;
            if average_minutes > cfg.focused_minutes {
                insights.push(LearningInsight::new(
                    InsightKind::Strength,
                    "Excellent Focus",
                    format!(
                        "Your average study session lasts {average_minutes:.0} minutes, showing great concentration!"
                    ),
                    "🎯",
                ));
            } else if average_minutes < cfg.short_minutes {
                insights.push(LearningInsight::new(
                    InsightKind::Suggestion,
                    "Short Sessions",
                    "Try extending your study sessions to 20-25 minutes for better retention."
                        .to_string(),
                    "💡",
                ));
            }
        }

        if completed_lessons > cfg.consistent_lessons {
            insights.push(LearningInsight::new(
                InsightKind::Achievement,
                "Consistent Learner",
                format!(
                    "You've completed {completed_lessons} lessons! Keep up the excellent work."
                ),
                "🏆",
            ));
        }

        if history.len() >= cfg.pace_min_interactions && self.is_recently_active(history) {
            insights.push(LearningInsight::new(
                InsightKind::Strength,
                "Rapid Progress",
                "You've been very active this week! Consistency is key to mastery.".to_string(),
                "🚀",
            ));
        }

        if insights.is_empty() {
            insights.push(LearningInsight::new(
                InsightKind::Info,
                "Getting Started",
                "Complete more lessons to unlock personalized insights!".to_string(),
                "🌱",
            ));
        }

        debug!(
            records = history.len(),
            completed_lessons,
            insights = insights.len(),
            "generated insights"
        );
        insights
    }

    /// The most recent records fall on few enough distinct days
    fn is_recently_active(&self, history: &[InteractionRecord]) -> bool {
        let window = &history[history.len().saturating_sub(self.config.pace_window)..];
        let days: HashSet<NaiveDate> = window
            .iter()
            .filter_map(|r| r.timestamp_utc())
            .map(|ts| ts.date_naive())
            .collect();
        days.len() <= self.config.active_days
    }
}
