//! Engine facade and JSON entry points
//!
//! `LearningEngine` wires the scoring components to one `EngineContext`. The
//! `*_json` functions are the request layer: they decode a JSON request, run
//! one engine operation and encode the result without touching any number.

use crate::config::EngineConfig;
use crate::context::{EngineContext, ModelStatus};
use crate::error::ComputeError;
use crate::fatigue::FatigueEstimator;
use crate::features::{FeatureExtractor, FeatureVector};
use crate::insights::{InsightGenerator, LearningInsight};
use crate::lenient;
use crate::mastery::MasteryTracker;
use crate::preferences::{
    GamificationEvent, GamificationProfile, PreferenceAnalyzer, UiBehavior, UiSettings,
    UiSuggestion,
};
use crate::recommender::{
    ContentFeatures, ContentRecommender, DifficultyAdjustment, EngagementPrediction,
    LearnerFeatures, LearningPath, LessonOutcome, RankedContent,
};
use crate::struggle::StruggleDetector;
use crate::types::{
    ContentCandidate, DifficultyLevel, FatigueAssessment, InteractionRecord, LiveSession,
    MasteryMap, PatternAssessment, PredictionResult, ScorePoint, SessionSnapshot,
    SkillInteraction, SkillRecommendation, StruggleAssessment, UserProfile, UserRhythm,
};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Request keys that carry an interaction history
const HISTORY_KEYS: [&str; 3] = ["history", "interactions", "interactionHistory"];

// ============================================================================
// Requests and responses
// ============================================================================

/// Full analysis of a learner's history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default, alias = "interactions", deserialize_with = "lenient::list")]
    pub history: Vec<InteractionRecord>,
    #[serde(default, alias = "userProfile", deserialize_with = "lenient::or_default")]
    pub profile: UserProfile,
    #[serde(default, deserialize_with = "lenient::list")]
    pub candidates: Vec<ContentCandidate>,
    /// Number of ranked candidates to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Who computed a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerInfo {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub producer: ProducerInfo,
    pub computed_at_utc: String,
    pub features: FeatureVector,
    /// Features rescaled to [0, 1] in the fixed feature order
    pub normalized: Vec<f64>,
    pub prediction: PredictionResult,
    pub patterns: PatternAssessment,
    pub learning_path: LearningPath,
    pub ranked_content: Vec<RankedContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StruggleRequest {
    #[serde(default, alias = "currentSession", deserialize_with = "lenient::or_default")]
    pub session: LiveSession,
    #[serde(default, alias = "interactionHistory", deserialize_with = "lenient::list")]
    pub history: Vec<InteractionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FatigueRequest {
    #[serde(default, alias = "sessionData", deserialize_with = "lenient::or_default")]
    pub session: SessionSnapshot,
    #[serde(default, alias = "userRhythm", deserialize_with = "lenient::or_default")]
    pub rhythm: UserRhythm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasteryRequest {
    #[serde(
        default,
        alias = "masteryMap",
        alias = "currentMastery",
        deserialize_with = "lenient::entries"
    )]
    pub mastery: MasteryMap,
    pub interaction: SkillInteraction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryResponse {
    pub mastery: MasteryMap,
    pub recommendations: Vec<SkillRecommendation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DifficultyRequest {
    #[serde(default, alias = "recentPerformance", deserialize_with = "lenient::list")]
    pub recent: Vec<LessonOutcome>,
    /// Level the learner is studying at; beginner when absent
    #[serde(default, alias = "currentLevel", deserialize_with = "lenient::or_default")]
    pub current: DifficultyLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiSettingsRequest {
    #[serde(default, alias = "behaviorPatterns", deserialize_with = "lenient::or_default")]
    pub behavior: UiBehavior,
    #[serde(default, alias = "currentSettings", deserialize_with = "lenient::or_default")]
    pub current: UiSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamificationRequest {
    #[serde(default, alias = "interactionHistory", deserialize_with = "lenient::list")]
    pub events: Vec<GamificationEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementRequest {
    #[serde(default, alias = "userFeatures", deserialize_with = "lenient::or_default")]
    pub learner: LearnerFeatures,
    #[serde(default, alias = "contentFeatures", deserialize_with = "lenient::or_default")]
    pub content: ContentFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightRequest {
    #[serde(default, alias = "interactions", deserialize_with = "lenient::list")]
    pub history: Vec<InteractionRecord>,
    /// Completed lesson records; only their number is used
    #[serde(default, alias = "completedLessons", deserialize_with = "lenient::list")]
    pub completed_lessons: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    pub insights: Vec<LearningInsight>,
    pub computed_at_utc: String,
}

// ============================================================================
// Engine
// ============================================================================

/// Stateless learning analytics engine.
///
/// Every operation is a pure function of its arguments and the context. The
/// engine can be shared between threads; mastery maps are passed in and out.
pub struct LearningEngine {
    context: EngineContext,
    features: FeatureExtractor,
    struggle: StruggleDetector,
    fatigue: FatigueEstimator,
    mastery: MasteryTracker,
    recommender: ContentRecommender,
    preferences: PreferenceAnalyzer,
    insights: InsightGenerator,
    instance_id: String,
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new(EngineContext::default())
    }
}

impl LearningEngine {
    /// Create an engine around a prepared context
    pub fn new(context: EngineContext) -> Self {
        let config = context.config();
        Self {
            features: FeatureExtractor::new(config.features.clone()),
            struggle: StruggleDetector::new(config.struggle.clone()),
            fatigue: FatigueEstimator::new(config.fatigue.clone()),
            mastery: MasteryTracker::new(config.mastery.clone()),
            recommender: ContentRecommender::new(config.recommender.clone()),
            preferences: PreferenceAnalyzer::new(config.preferences.clone()),
            insights: InsightGenerator::new(config.insights.clone()),
            context,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an engine with heuristic components only
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(EngineContext::new(config))
    }

    /// Use a fixed producer instance id in reports
    pub fn with_instance_id(mut self, instance_id: String) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn config(&self) -> &EngineConfig {
        self.context.config()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.context.model_status()
    }

    pub fn extract_features(&self, history: &[InteractionRecord]) -> FeatureVector {
        self.features.extract(history)
    }

    pub fn predict_performance(&self, history: &[InteractionRecord]) -> PredictionResult {
        let points: Vec<ScorePoint> = history.iter().map(ScorePoint::from).collect();
        self.context.performance_regressor().predict(&points)
    }

    pub fn detect_struggle(
        &self,
        session: &LiveSession,
        history: &[InteractionRecord],
    ) -> StruggleAssessment {
        self.struggle.assess(session, history)
    }

    pub fn estimate_fatigue(
        &self,
        session: &SessionSnapshot,
        rhythm: &UserRhythm,
    ) -> FatigueAssessment {
        self.fatigue.assess(session, rhythm)
    }

    pub fn match_patterns(&self, history: &[InteractionRecord]) -> PatternAssessment {
        self.context.pattern_classifier().classify(history)
    }

    pub fn update_mastery(&self, map: MasteryMap, interaction: &SkillInteraction) -> MasteryMap {
        self.mastery.update(map, interaction)
    }

    pub fn recommend_practice(&self, map: &MasteryMap) -> Vec<SkillRecommendation> {
        self.mastery.recommend(map)
    }

    pub fn recommender(&self) -> &ContentRecommender {
        &self.recommender
    }

    pub fn preferences(&self) -> &PreferenceAnalyzer {
        &self.preferences
    }

    pub fn predict_engagement(
        &self,
        learner: &LearnerFeatures,
        content: &ContentFeatures,
    ) -> EngagementPrediction {
        self.recommender.predict_engagement(learner, content)
    }

    pub fn learning_insights(
        &self,
        history: &[InteractionRecord],
        completed_lessons: usize,
    ) -> Vec<LearningInsight> {
        self.insights.generate(history, completed_lessons)
    }

    /// Run every history-based component over one request
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisReport {
        let features = self.extract_features(&request.history);
        let normalized = self.features.normalize(&features).to_vec();
        let prediction = self.predict_performance(&request.history);
        let patterns = self.match_patterns(&request.history);
        let learning_path = self.recommender.learning_path(&features, &request.profile);
        let ranked_content = self
            .recommender
            .rank_content(&request.candidates, &features, request.limit);

        debug!(
            records = request.history.len(),
            candidates = request.candidates.len(),
            "analysis complete"
        );

        AnalysisReport {
            producer: ProducerInfo {
                name: PRODUCER_NAME.to_string(),
                version: VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            features,
            normalized,
            prediction,
            patterns,
            learning_path,
            ranked_content,
        }
    }

    // ------------------------------------------------------------------------
    // JSON request layer
    // ------------------------------------------------------------------------

    pub fn analyze_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: AnalysisRequest = decode_request(request_json)?;
        encode_response(&self.analyze(&request))
    }

    pub fn struggle_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: StruggleRequest = decode_request(request_json)?;
        encode_response(&self.detect_struggle(&request.session, &request.history))
    }

    pub fn fatigue_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: FatigueRequest = decode_request(request_json)?;
        encode_response(&self.estimate_fatigue(&request.session, &request.rhythm))
    }

    pub fn mastery_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: MasteryRequest = decode_request(request_json)?;
        let mastery = self.update_mastery(request.mastery, &request.interaction);
        let recommendations = self.recommend_practice(&mastery);
        encode_response(&MasteryResponse {
            mastery,
            recommendations,
        })
    }

    pub fn difficulty_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: DifficultyRequest = decode_request(request_json)?;
        let adjustment: DifficultyAdjustment =
            self.recommender.adjust_difficulty(&request.recent, request.current);
        encode_response(&adjustment)
    }

    pub fn ui_settings_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: UiSettingsRequest = decode_request(request_json)?;
        let suggestion: UiSuggestion = self
            .preferences
            .suggest_ui_settings(&request.behavior, &request.current);
        encode_response(&suggestion)
    }

    pub fn gamification_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: GamificationRequest = decode_request(request_json)?;
        let profile: GamificationProfile = self.preferences.analyze_gamification(&request.events);
        encode_response(&profile)
    }

    pub fn engagement_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: EngagementRequest = decode_request(request_json)?;
        encode_response(&self.predict_engagement(&request.learner, &request.content))
    }

    pub fn insights_json(&self, request_json: &str) -> Result<String, ComputeError> {
        let request: InsightRequest = decode_request(request_json)?;
        encode_response(&InsightResponse {
            insights: self.learning_insights(&request.history, request.completed_lessons.len()),
            computed_at_utc: Utc::now().to_rfc3339(),
        })
    }
}

/// Analyze a learner's history with the default configuration (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = analyze_history(r#"{"history": []}"#.to_string())?;
/// ```
pub fn analyze_history(request_json: String) -> Result<String, ComputeError> {
    LearningEngine::default().analyze_json(&request_json)
}

/// Assess struggle in a live session with the default configuration
pub fn assess_struggle(request_json: String) -> Result<String, ComputeError> {
    LearningEngine::default().struggle_json(&request_json)
}

/// Estimate fatigue with the default configuration
pub fn assess_fatigue(request_json: String) -> Result<String, ComputeError> {
    LearningEngine::default().fatigue_json(&request_json)
}

/// Update a mastery map and rank practice with the default configuration
pub fn update_mastery(request_json: String) -> Result<String, ComputeError> {
    LearningEngine::default().mastery_json(&request_json)
}

/// Decode a request object, rejecting an interaction history that is not an array
fn decode_request<T: DeserializeOwned>(json: &str) -> Result<T, ComputeError> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ComputeError::ParseError(format!(
            "request must be a JSON object, got {}",
            json_kind(&value)
        )));
    }
    if let Some(history) = HISTORY_KEYS
        .iter()
        .filter_map(|key| value.get(*key))
        .find(|history| !history.is_array())
    {
        return Err(ComputeError::InvalidHistory(json_kind(history).to_string()));
    }
    serde_json::from_value(value).map_err(|e| ComputeError::ParseError(e.to_string()))
}

fn encode_response<T: Serialize>(response: &T) -> Result<String, ComputeError> {
    serde_json::to_string(response).map_err(|e| ComputeError::EncodingError(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
