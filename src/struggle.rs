//! Real-time struggle detection
//!
//! Scores the session in progress against a fixed rule set. Each rule that
//! fires adds its weight and records an indicator; the sum is capped at 1.

use crate::config::StruggleConfig;
use crate::types::{
    InteractionRecord, LiveSession, StruggleAssessment, StruggleIndicator, StruggleLevel,
};
use tracing::{debug, trace};

const HIGH_INTERVENTIONS: [&str; 4] = [
    "Suggest switching to easier content",
    "Recommend taking a break",
    "Offer video tutorial instead of text",
    "Provide step-by-step guide",
];

const MODERATE_INTERVENTIONS: [&str; 3] = [
    "Suggest viewing additional examples",
    "Recommend reviewing prerequisites",
    "Offer hints for current challenge",
];

/// Rule-based struggle detector for live sessions
#[derive(Debug, Clone, Default)]
pub struct StruggleDetector {
    config: StruggleConfig,
}

impl StruggleDetector {
    pub fn new(config: StruggleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StruggleConfig {
        &self.config
    }

    /// Assess a live session against the learner's past interactions
    pub fn assess(&self, session: &LiveSession, history: &[InteractionRecord]) -> StruggleAssessment {
        let cfg = &self.config;
        let mut score = 0.0;
        let mut indicators = Vec::new();

        let mut apply = |weight: f64, indicator: StruggleIndicator| {
            if weight > 0.0 {
                trace!(?indicator, weight, "struggle rule fired");
                score += weight;
                indicators.push(indicator);
            }
        };

        apply(
            cfg.pause_frequency.above(session.pause_frequency),
            StruggleIndicator::HighPauseFrequency,
        );
        apply(
            cfg.rewinds.above(f64::from(session.rewind_count)),
            StruggleIndicator::MultipleRewinds,
        );
        apply(
            cfg.help_requests.above(f64::from(session.help_request_count)),
            StruggleIndicator::FrequentHelpRequests,
        );
        apply(
            cfg.errors.above(f64::from(session.error_count)),
            StruggleIndicator::HighErrorRate,
        );
        apply(
            cfg.low_focus.below(session.focus_level),
            StruggleIndicator::LowFocus,
        );

        let expected = session
            .expected_duration
            .unwrap_or(cfg.default_expected_duration);
        let overtime = if session.duration > expected * cfg.overtime.threshold {
            cfg.overtime.weight
        } else {
            0.0
        };
        apply(overtime, StruggleIndicator::ExcessiveTime);

        if !history.is_empty() {
            let historical_mean = history.iter().map(|r| r.performance.score).sum::<f64>()
                / history.len() as f64;
            let below = if session.score < historical_mean * cfg.below_average.threshold {
                cfg.below_average.weight
            } else {
                0.0
            };
            apply(below, StruggleIndicator::BelowAveragePerformance);
        }

        let score = score.min(1.0);
        let level = self.level_for(score);
        let interventions = interventions_for(level);
        let confidence = if indicators.len() > cfg.confident_indicator_count {
            cfg.high_confidence
        } else {
            cfg.low_confidence
        };

        debug!(score, ?level, indicators = indicators.len(), "assessed struggle");

        StruggleAssessment {
            is_struggling: score >= cfg.struggle_threshold,
            level,
            score,
            indicators,
            interventions,
            confidence,
        }
    }

    fn level_for(&self, score: f64) -> StruggleLevel {
        if score >= self.config.high_severity {
            StruggleLevel::High
        } else if score >= self.config.moderate_severity {
            StruggleLevel::Moderate
        } else {
            StruggleLevel::Low
        }
    }
}

fn interventions_for(level: StruggleLevel) -> Vec<String> {
    let list: &[&str] = match level {
        StruggleLevel::High => &HIGH_INTERVENTIONS,
        StruggleLevel::Moderate => &MODERATE_INTERVENTIONS,
        StruggleLevel::Low => &[],
    };
    list.iter().map(|s| s.to_string()).collect()
}
