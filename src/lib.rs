//! learnflux - Behavioral analytics engine for adaptive learning
//!
//! learnflux turns logged learning interactions into the signals an adaptive
//! learning platform acts on: a feature summary of the learner's history, a
//! performance forecast, real-time struggle and fatigue assessments,
//! behavioral pattern scores, per-skill mastery, and content recommendations.
//!
//! ## Modules
//!
//! - **Scoring components**: [`features`], [`trend`], [`struggle`], [`fatigue`],
//!   [`patterns`], [`mastery`], [`recommender`], [`preferences`], [`insights`]
//! - **Engine**: [`context`] holds configuration and optional trained models,
//!   [`pipeline`] exposes the [`LearningEngine`] facade and JSON entry points
//!
//! Every operation is deterministic and side-effect free. Mastery state is
//! owned by the caller and passed in and out explicitly.

pub mod config;
pub mod context;
pub mod error;
pub mod fatigue;
pub mod features;
pub mod insights;
mod lenient;
pub mod mastery;
pub mod patterns;
pub mod pipeline;
pub mod preferences;
pub mod recommender;
pub mod struggle;
pub mod trend;
pub mod types;

pub use config::EngineConfig;
pub use context::{EngineContext, ModelStatus, PatternClassifier, PerformanceRegressor};
pub use error::ComputeError;
pub use features::{normalize, FeatureExtractor, FeatureVector};
pub use pipeline::{
    analyze_history, assess_fatigue, assess_struggle, update_mastery, AnalysisReport,
    AnalysisRequest, LearningEngine,
};

// Component exports
pub use fatigue::FatigueEstimator;
pub use insights::InsightGenerator;
pub use mastery::MasteryTracker;
pub use patterns::PatternMatcher;
pub use preferences::PreferenceAnalyzer;
pub use recommender::ContentRecommender;
pub use struggle::StruggleDetector;
pub use trend::TrendPredictor;

/// learnflux version embedded in every analysis report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for analysis reports
pub const PRODUCER_NAME: &str = "learnflux";
