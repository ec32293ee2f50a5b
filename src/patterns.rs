//! Behavioral pattern matching
//!
//! Aggregates a learner's full history into per-category confidence scores
//! and maps every detected category onto a fixed set of adaptations. The
//! categories describe behavior only and are not diagnoses.

use crate::config::PatternConfig;
use crate::features::variance;
use crate::types::{
    AdaptationKind, AdaptiveRecommendation, InteractionRecord, PatternAssessment, PatternCategory,
};
use chrono::Timelike;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Heuristic pattern matcher over interaction history
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    config: PatternConfig,
}

impl PatternMatcher {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Score every category against the full history
    pub fn match_history(&self, history: &[InteractionRecord]) -> PatternAssessment {
        let cfg = &self.config;
        if history.len() < cfg.min_history {
            debug!(records = history.len(), "too little history for pattern matching");
            return PatternAssessment::insufficient();
        }

        let mut scores = BTreeMap::new();
        for category in PatternCategory::ALL {
            let score = match category {
                PatternCategory::AttentionDeficit => self.attention_deficit_score(history),
                PatternCategory::ReadingDifficulty => self.reading_difficulty_score(history),
                PatternCategory::RoutinePreference => self.routine_preference_score(history),
            };
            trace!(category = category.as_str(), score, "pattern score");
            scores.insert(category, score.clamp(0.0, 1.0));
        }

        let detected: Vec<PatternCategory> = scores
            .iter()
            .filter(|(_, score)| **score >= cfg.detection_threshold)
            .map(|(category, _)| *category)
            .collect();

        let confidence = scores.values().sum::<f64>() / scores.len() as f64;
        let recommendations = detected.iter().flat_map(|&c| adaptations_for(c)).collect();

        debug!(
            records = history.len(),
            detected = detected.len(),
            confidence,
            "matched behavioral patterns"
        );

        PatternAssessment {
            scores,
            detected,
            confidence,
            needs_more_data: history.len() < cfg.confident_history,
            recommendations,
        }
    }

    fn attention_deficit_score(&self, history: &[InteractionRecord]) -> f64 {
        let cfg = &self.config;
        let short_share = share(history, |r| {
            r.attention_span().unwrap_or(cfg.default_attention_span) < cfg.short_attention_span
        });

        cfg.tab_switches.above(mean(history, |r| f64::from(r.tab_switches())))
            + cfg.low_focus.below(mean(history, |r| r.focus_level))
            + cfg.low_completion.below(mean(history, |r| r.completion_rate))
            + cfg.short_attention_share.above(short_share)
    }

    fn reading_difficulty_score(&self, history: &[InteractionRecord]) -> f64 {
        let cfg = &self.config;
        let text: Vec<&InteractionRecord> = history
            .iter()
            .filter(|r| r.content_type.as_deref().is_some_and(|t| t.contains("text")))
            .collect();
        let text_struggle_share = if text.is_empty() {
            0.0
        } else {
            let struggling = text
                .iter()
                .filter(|r| r.completion_rate < cfg.text_struggle_completion)
                .count();
            struggling as f64 / text.len() as f64
        };

        cfg.rewinds.above(mean(history, |r| f64::from(r.rewind_count())))
            + cfg.slow_playback.below(mean(history, |r| r.playback_speed()))
            + cfg.text_struggle_share.above(text_struggle_share)
    }

    fn routine_preference_score(&self, history: &[InteractionRecord]) -> f64 {
        let cfg = &self.config;
        let hours: Vec<f64> = history
            .iter()
            .filter_map(InteractionRecord::timestamp_utc)
            .map(|ts| f64::from(ts.hour()))
            .collect();

        let consistent_hours = if hours.len() >= 2 {
            cfg.hour_spread.below(variance(&hours))
        } else {
            0.0
        };
        let revisit_share = share(history, |r| r.behavior.revisit_count > cfg.revisit_limit);

        consistent_hours + cfg.revisit_share.above(revisit_share)
    }
}

fn mean(history: &[InteractionRecord], value: impl Fn(&InteractionRecord) -> f64) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().map(value).sum::<f64>() / history.len() as f64
}

fn share(history: &[InteractionRecord], predicate: impl Fn(&InteractionRecord) -> bool) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    history.iter().filter(|r| predicate(r)).count() as f64 / history.len() as f64
}

/// Fixed adaptation pairs for a detected category
pub fn adaptations_for(category: PatternCategory) -> Vec<AdaptiveRecommendation> {
    let pairs: [(AdaptationKind, &str, &str); 2] = match category {
        PatternCategory::AttentionDeficit => [
            (
                AdaptationKind::ContentFormat,
                "Switch to shorter, interactive content chunks",
                "Attention-deficit pattern detected - benefits from frequent engagement",
            ),
            (
                AdaptationKind::UiAdjustment,
                "Enable focus mode and reduce animations",
                "Minimize distractions",
            ),
        ],
        PatternCategory::ReadingDifficulty => [
            (
                AdaptationKind::ContentFormat,
                "Prefer audio and video over text content",
                "Reading-difficulty pattern detected",
            ),
            (
                AdaptationKind::UiAdjustment,
                "Use OpenDyslexic font and increase line spacing",
                "Improve text readability",
            ),
        ],
        PatternCategory::RoutinePreference => [
            (
                AdaptationKind::ContentStructure,
                "Maintain consistent daily learning schedule",
                "Routine-preference pattern detected - benefits from routine",
            ),
            (
                AdaptationKind::UiAdjustment,
                "Use structured, predictable navigation",
                "Reduce cognitive load from interface changes",
            ),
        ],
    };

    pairs
        .into_iter()
        .map(|(kind, recommendation, reason)| AdaptiveRecommendation {
            kind,
            recommendation: recommendation.to_string(),
            reason: reason.to_string(),
        })
        .collect()
}
