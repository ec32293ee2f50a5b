//! Performance trend prediction
//!
//! Produces a forward-looking score estimate from a learner's score history,
//! together with a confidence measure, a trend label and advice.

use crate::config::TrendConfig;
use crate::features::variance;
use crate::types::{PredictionResult, ScorePoint, TrendDirection};
use tracing::debug;

/// Heuristic performance predictor
#[derive(Debug, Clone, Default)]
pub struct TrendPredictor {
    config: TrendConfig,
}

impl TrendPredictor {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Predict the next score from an ordered (oldest first) history
    pub fn predict(&self, history: &[ScorePoint]) -> PredictionResult {
        let cfg = &self.config;

        if history.is_empty() {
            return PredictionResult {
                predicted_score: cfg.empty_history_score,
                confidence: cfg.base_confidence,
                trend: TrendDirection::Stable,
                improvement_rate: 0.0,
                current_average: 0.0,
                data_points: 0,
                recommendations: vec!["Complete more lessons to improve predictions".to_string()],
            };
        }

        let scores: Vec<f64> = history.iter().map(|p| p.score).collect();
        let overall_avg = mean(&scores);

        let (trend, improvement_rate) = self.compute_trend(&scores, overall_avg);

        let avg_focus = mean(&history.iter().map(|p| p.focus_level).collect::<Vec<_>>());
        let avg_completion = mean(&history.iter().map(|p| p.completion_rate).collect::<Vec<_>>());

        let focus_adjustment = (avg_focus - cfg.focus_pivot) * cfg.focus_weight;
        let completion_adjustment = (avg_completion - cfg.completion_pivot) / cfg.completion_divisor;

        let predicted_score =
            (recency_weighted_mean(&scores) + focus_adjustment + completion_adjustment)
                .clamp(0.0, 100.0);

        let confidence = self.compute_confidence(&scores);

        let recommendations = self.recommendations(
            predicted_score,
            trend,
            avg_focus,
            avg_completion,
            improvement_rate,
        );

        debug!(
            points = scores.len(),
            predicted_score,
            confidence,
            ?trend,
            "predicted performance"
        );

        PredictionResult {
            predicted_score,
            confidence,
            trend,
            improvement_rate,
            current_average: overall_avg,
            data_points: scores.len(),
            recommendations,
        }
    }

    /// Compare the recent mean against the overall mean
    fn compute_trend(&self, scores: &[f64], overall_avg: f64) -> (TrendDirection, f64) {
        if scores.len() < self.config.min_trend_points {
            return (TrendDirection::Stable, 0.0);
        }

        let window = self.config.recent_window.min(scores.len());
        let recent_avg = mean(&scores[scores.len() - window..]);

        let trend = if recent_avg > overall_avg {
            TrendDirection::Improving
        } else {
            TrendDirection::Declining
        };

        let improvement_rate = if overall_avg > 0.0 {
            (recent_avg - overall_avg) / overall_avg * 100.0
        } else {
            0.0
        };

        (trend, improvement_rate)
    }

    /// Confidence grows with history length and shrinks with score variance
    ///
    /// Formula: `min(0.95, 0.3 + 0.5 * min(1, n / 20)) * (1 - min(var / 1000, 0.5))`
    fn compute_confidence(&self, scores: &[f64]) -> f64 {
        let cfg = &self.config;
        let quantity =
            (scores.len() as f64 / cfg.full_confidence_points.max(1) as f64).min(1.0);
        let base = (cfg.base_confidence + cfg.confidence_span * quantity).min(cfg.max_confidence);

        let penalty = (variance(scores) / cfg.variance_scale).min(cfg.max_variance_penalty);
        base * (1.0 - penalty)
    }

    /// Build advice in fixed order: score band, trend, focus, completion
    fn recommendations(
        &self,
        predicted_score: f64,
        trend: TrendDirection,
        focus: f64,
        completion: f64,
        improvement_rate: f64,
    ) -> Vec<String> {
        let cfg = &self.config;
        let mut recs = Vec::new();

        if predicted_score < cfg.low_score {
            recs.push("Review fundamental concepts before moving forward".to_string());
            recs.push("Consider switching to easier difficulty level".to_string());
        } else if predicted_score > cfg.high_score {
            recs.push("Ready for advanced challenges".to_string());
            recs.push("Consider mentoring peers to reinforce learning".to_string());
        }

        match trend {
            TrendDirection::Declining => {
                recs.push("Take a break to avoid burnout".to_string());
                recs.push("Review recent topics that may need reinforcement".to_string());
            }
            TrendDirection::Improving => {
                recs.push(format!(
                    "Great progress! You've improved by {:.1}%",
                    improvement_rate.abs()
                ));
            }
            TrendDirection::Stable => {}
        }

        if focus < cfg.low_focus {
            recs.push("Try shorter study sessions to improve focus".to_string());
            recs.push("Minimize distractions in your study environment".to_string());
        }

        if completion < cfg.low_completion {
            recs.push("Start with shorter lessons to build momentum".to_string());
        }

        recs.truncate(cfg.max_recommendations);
        recs
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Weighted mean with weights `exp(t)` for `t` evenly spaced over [-1, 0],
/// so the most recent score carries weight 1 and the oldest `1/e`
fn recency_weighted_mean(scores: &[f64]) -> f64 {
    let n = scores.len();
    if n == 0 {
        return 0.0;
    }

    let (weighted_sum, weight_total) = scores.iter().enumerate().fold(
        (0.0, 0.0),
        |(sum, total), (i, score)| {
            let t = if n == 1 {
                -1.0
            } else {
                -1.0 + i as f64 / (n - 1) as f64
            };
            let w = t.exp();
            (sum + score * w, total + w)
        },
    );
    weighted_sum / weight_total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(score: f64) -> ScorePoint {
        ScorePoint {
            score,
            completion_rate: 50.0,
            focus_level: 5.0,
        }
    }

    fn history(scores: &[f64]) -> Vec<ScorePoint> {
        scores.iter().copied().map(point).collect()
    }

    #[test]
    fn test_empty_history_fallback() {
        let result = TrendPredictor::default().predict(&[]);
        assert_eq!(result.predicted_score, 70.0);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.trend, TrendDirection::Stable);
        assert_eq!(result.data_points, 0);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_short_history_is_stable() {
        let result = TrendPredictor::default().predict(&history(&[70.0, 90.0]));
        assert_eq!(result.trend, TrendDirection::Stable);
        assert_eq!(result.improvement_rate, 0.0);
    }

    #[test]
    fn test_improving_trend() {
        // Overall mean 70, recent mean (70+80+90)/3 = 80
        let result = TrendPredictor::default().predict(&history(&[50.0, 60.0, 70.0, 80.0, 90.0]));
        assert_eq!(result.trend, TrendDirection::Improving);
        assert!((result.improvement_rate - (80.0 - 70.0) / 70.0 * 100.0).abs() < 1e-9);
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Great progress! You've improved by 14.3%")));
    }

    #[test]
    fn test_equal_means_count_as_declining() {
        let result = TrendPredictor::default().predict(&history(&[70.0, 70.0, 70.0]));
        assert_eq!(result.trend, TrendDirection::Declining);
        assert_eq!(result.improvement_rate, 0.0);
    }

    #[test]
    fn test_zero_scores_have_zero_improvement_rate() {
        let result = TrendPredictor::default().predict(&history(&[0.0, 0.0, 0.0, 0.0]));
        assert_eq!(result.improvement_rate, 0.0);
        assert_eq!(result.predicted_score, 0.0);
    }

    #[test]
    fn test_recency_weighting_favors_latest() {
        let weighted = recency_weighted_mean(&[0.0, 100.0]);
        // weights 1/e and 1: 100 / (1 + 1/e)
        let expected = 100.0 / (1.0 + (-1.0f64).exp());
        assert!((weighted - expected).abs() < 1e-9);
        assert!(weighted > 50.0);

        assert_eq!(recency_weighted_mean(&[42.0]), 42.0);
    }

    #[test]
    fn test_focus_and_completion_adjustments() {
        let history = vec![ScorePoint {
            score: 70.0,
            completion_rate: 100.0,
            focus_level: 10.0,
        }];
        // 70 + (10-5)*2 + (100-50)/5 = 90
        let result = TrendPredictor::default().predict(&history);
        assert!((result.predicted_score - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_clamped() {
        let history = vec![ScorePoint {
            score: 100.0,
            completion_rate: 100.0,
            focus_level: 10.0,
        }];
        assert_eq!(TrendPredictor::default().predict(&history).predicted_score, 100.0);

        let history = vec![ScorePoint {
            score: 0.0,
            completion_rate: 0.0,
            focus_level: 1.0,
        }];
        assert_eq!(TrendPredictor::default().predict(&history).predicted_score, 0.0);
    }

    #[test]
    fn test_confidence_grows_with_data() {
        let predictor = TrendPredictor::default();
        // Constant scores: no variance penalty
        let one = predictor.predict(&history(&[80.0]));
        assert!((one.confidence - (0.3 + 0.5 / 20.0)).abs() < 1e-9);

        let many = predictor.predict(&history(&[80.0; 40]));
        assert!((many.confidence - 0.8).abs() < 1e-9);
        assert!(many.confidence <= 0.95);
    }

    #[test]
    fn test_confidence_shrinks_with_variance() {
        // Population variance of [0, 100] = 2500, penalty capped at 0.5
        let result = TrendPredictor::default().predict(&history(&[0.0, 100.0]));
        assert!((result.confidence - (0.3 + 0.5 * 2.0 / 20.0) * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recommendations_order_and_cap() {
        let history: Vec<ScorePoint> = [60.0, 50.0, 40.0, 30.0]
            .iter()
            .map(|&score| ScorePoint {
                score,
                completion_rate: 20.0,
                focus_level: 3.0,
            })
            .collect();
        let result = TrendPredictor::default().predict(&history);

        assert_eq!(result.trend, TrendDirection::Declining);
        assert_eq!(
            result.recommendations,
            vec![
                "Review fundamental concepts before moving forward".to_string(),
                "Consider switching to easier difficulty level".to_string(),
                "Take a break to avoid burnout".to_string(),
                "Review recent topics that may need reinforcement".to_string(),
            ]
        );
    }

    #[test]
    fn test_high_score_advice() {
        let history = vec![ScorePoint {
            score: 95.0,
            completion_rate: 90.0,
            focus_level: 8.0,
        }];
        let result = TrendPredictor::default().predict(&history);
        assert_eq!(result.recommendations[0], "Ready for advanced challenges");
    }
}
