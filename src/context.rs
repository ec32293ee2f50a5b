//! Engine context and scoring strategies
//!
//! Pattern classification and performance prediction sit behind single-method
//! traits. The heuristic components are the default implementations; a
//! trained model loaded by the caller can be installed in their place. The
//! context is constructed explicitly and passed to the engine, so nothing is
//! loaded behind the caller's back.

use crate::config::EngineConfig;
use crate::patterns::PatternMatcher;
use crate::trend::TrendPredictor;
use crate::types::{InteractionRecord, PatternAssessment, PredictionResult, ScorePoint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores behavioral pattern categories over a full history
pub trait PatternClassifier: Send + Sync {
    fn classify(&self, history: &[InteractionRecord]) -> PatternAssessment;
}

/// Predicts the next score from an ordered score history
pub trait PerformanceRegressor: Send + Sync {
    fn predict(&self, history: &[ScorePoint]) -> PredictionResult;
}

impl PatternClassifier for PatternMatcher {
    fn classify(&self, history: &[InteractionRecord]) -> PatternAssessment {
        self.match_history(history)
    }
}

impl PerformanceRegressor for TrendPredictor {
    fn predict(&self, history: &[ScorePoint]) -> PredictionResult {
        TrendPredictor::predict(self, history)
    }
}

/// Which optional models are installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub pattern_classifier_loaded: bool,
    pub performance_regressor_loaded: bool,
}

/// Configuration plus optional model handles
pub struct EngineContext {
    config: EngineConfig,
    matcher: PatternMatcher,
    predictor: TrendPredictor,
    classifier_model: Option<Box<dyn PatternClassifier>>,
    regressor_model: Option<Box<dyn PerformanceRegressor>>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("config", &self.config)
            .field("models", &self.model_status())
            .finish()
    }
}

impl EngineContext {
    /// Create a context that uses the heuristic components only
    pub fn new(config: EngineConfig) -> Self {
        Self {
            matcher: PatternMatcher::new(config.patterns.clone()),
            predictor: TrendPredictor::new(config.trend.clone()),
            config,
            classifier_model: None,
            regressor_model: None,
        }
    }

    /// Install a trained pattern classifier
    pub fn with_pattern_classifier(mut self, model: Box<dyn PatternClassifier>) -> Self {
        self.classifier_model = Some(model);
        self
    }

    /// Install a trained performance regressor
    pub fn with_performance_regressor(mut self, model: Box<dyn PerformanceRegressor>) -> Self {
        self.regressor_model = Some(model);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The installed classifier, or the heuristic matcher
    pub fn pattern_classifier(&self) -> &dyn PatternClassifier {
        match &self.classifier_model {
            Some(model) => model.as_ref(),
            None => &self.matcher,
        }
    }

    /// The installed regressor, or the heuristic predictor
    pub fn performance_regressor(&self) -> &dyn PerformanceRegressor {
        match &self.regressor_model {
            Some(model) => model.as_ref(),
            None => &self.predictor,
        }
    }

    pub fn model_status(&self) -> ModelStatus {
        ModelStatus {
            pattern_classifier_loaded: self.classifier_model.is_some(),
            performance_regressor_loaded: self.regressor_model.is_some(),
        }
    }
}
