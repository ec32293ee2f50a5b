//! Fatigue estimation and break timing

use crate::config::FatigueConfig;
use crate::types::{BreakUrgency, FatigueAssessment, SessionSnapshot, UserRhythm};
use tracing::debug;

/// Estimates fatigue for the session in progress
#[derive(Debug, Clone, Default)]
pub struct FatigueEstimator {
    config: FatigueConfig,
}

impl FatigueEstimator {
    pub fn new(config: FatigueConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FatigueConfig {
        &self.config
    }

    pub fn assess(&self, session: &SessionSnapshot, rhythm: &UserRhythm) -> FatigueAssessment {
        let cfg = &self.config;
        let minutes = session.duration / 60.0;

        let mut score = self.overage(minutes, rhythm.average_attention_span);
        score += self.focus_decline(session);
        score += cfg.idle.above(session.idle_time);
        score += cfg.errors.above(f64::from(session.error_count));
        let fatigue_score = score.min(1.0);

        let needs_break = fatigue_score >= cfg.fatigue_threshold;
        let (urgency, suggested_duration) = if !needs_break {
            (BreakUrgency::Low, cfg.short_break)
        } else if fatigue_score >= cfg.high_urgency {
            (BreakUrgency::High, cfg.long_break)
        } else {
            (BreakUrgency::Medium, cfg.short_break)
        };

        let current_session_minutes = whole_minutes(minutes);
        let minutes_until_next_break = if needs_break {
            0
        } else {
            whole_minutes(rhythm.preferred_break_interval - minutes).max(1)
        };

        let message = if needs_break {
            format!(
                "You've been studying for {current_session_minutes} minutes. Take a {suggested_duration}-min break!"
            )
        } else {
            format!("Keep going! Break recommended in ~{minutes_until_next_break} minutes")
        };

        debug!(fatigue_score, needs_break, ?urgency, "estimated fatigue");

        FatigueAssessment {
            needs_break,
            fatigue_score,
            urgency,
            suggested_duration,
            message,
            minutes_until_next_break,
            current_session_minutes,
        }
    }

    /// Relative overshoot of the usual attention span, capped
    fn overage(&self, minutes: f64, attention_span: f64) -> f64 {
        let cap = self.config.overage_cap;
        if attention_span <= 0.0 {
            return if minutes > 0.0 { cap } else { 0.0 };
        }
        if minutes > attention_span {
            ((minutes - attention_span) / attention_span).min(cap)
        } else {
            0.0
        }
    }

    /// Drop between the mean of the first and the last few focus samples
    fn focus_decline(&self, session: &SessionSnapshot) -> f64 {
        let levels: Vec<f64> = session.focus_timeline.iter().map(|s| s.level).collect();
        if levels.len() < 2 {
            return 0.0;
        }

        let window = self.config.focus_window.min(levels.len()).max(1);
        let initial = levels[..window].iter().sum::<f64>() / window as f64;
        let recent = levels[levels.len() - window..].iter().sum::<f64>() / window as f64;

        let weight = self.config.focus_decline_weight;
        ((initial - recent) / 10.0 * weight).clamp(0.0, weight)
    }
}

fn whole_minutes(minutes: f64) -> u32 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.floor() as u32
    } else {
        0
    }
}
