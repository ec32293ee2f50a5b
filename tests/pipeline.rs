//! End-to-end tests through the JSON entry points

use learnflux::pipeline::MasteryResponse;
use learnflux::types::{
    BreakUrgency, PatternCategory, PredictionResult, ScorePoint, StruggleLevel, TrendDirection,
};
use learnflux::{
    analyze_history, assess_fatigue, assess_struggle, update_mastery, ComputeError, EngineConfig,
    EngineContext, LearningEngine, PerformanceRegressor, PRODUCER_NAME,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Ten short, distracted sessions on text content, studied at the same hour
fn distracted_history() -> Value {
    let records: Vec<Value> = (0..10)
        .map(|i| {
            let kind = if i % 4 == 0 { "complete" } else { "view" };
            let score = 55 - i;
            json!({
                "userId": "learner-7",
                "sessionId": format!("s-{i}"),
                "contentId": format!("reading-{}", i % 3),
                "contentType": "text",
                "interactionType": kind,
                "timestamp": format!("2024-04-{:02}T19:30:00Z", i + 1),
                "duration": 420,
                "completionRate": 35,
                "focusLevel": 3,
                "emotionalState": "frustrated",
                "performance": { "score": score, "hints": 2 },
                "features": { "pauseFrequency": 6, "revisitCount": 3 },
                "behaviorMetrics": { "tabSwitches": 5, "idleTime": 80 },
                "mediaMetrics": { "rewindCount": 6, "averagePlaybackSpeed": 0.8 },
                "attentionMetrics": { "attentionSpan": 9 },
                "skills": ["reading-comprehension"]
            })
        })
        .collect();
    Value::Array(records)
}

#[test]
fn test_full_analysis_of_distracted_learner() {
    let request = json!({
        "history": distracted_history(),
        "profile": { "neurodiversityType": ["adhd"], "learningStyle": "reading-writing" },
        "candidates": [
            { "id": "warmup", "difficulty": "beginner" },
            { "id": "core", "difficulty": "intermediate" },
            { "id": "stretch", "difficulty": "advanced" }
        ],
        "limit": 2
    });

    let report: Value =
        serde_json::from_str(&analyze_history(request.to_string()).unwrap()).unwrap();

    assert_eq!(report["producer"]["name"], PRODUCER_NAME);
    assert_eq!(report["features"]["interaction_count"], 10.0);
    assert_eq!(report["features"]["content_variety"], 3.0);

    let detected: Vec<PatternCategory> =
        serde_json::from_value(report["patterns"]["detected"].clone()).unwrap();
    assert_eq!(
        detected,
        vec![
            PatternCategory::AttentionDeficit,
            PatternCategory::ReadingDifficulty,
            PatternCategory::RoutinePreference,
        ]
    );
    assert_eq!(report["patterns"]["needs_more_data"], false);

    assert_eq!(report["prediction"]["trend"], "declining");
    assert_eq!(report["learning_path"]["difficulty"], "beginner");
    assert_eq!(report["learning_path"]["break_frequency"], 15);
    assert_eq!(
        report["learning_path"]["formats"],
        json!(["interactive", "game", "video"])
    );

    let ranked = report["ranked_content"].as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["id"], "warmup");
}

#[test]
fn test_struggle_and_fatigue_requests() {
    let struggle: Value = serde_json::from_str(
        &assess_struggle(
            json!({
                "currentSession": {
                    "pauseFrequency": 10,
                    "rewindCount": 5,
                    "helpRequestCount": 3,
                    "errorCount": 5,
                    "focusLevel": 2,
                    "duration": 1200,
                    "expectedDuration": 600,
                    "score": 40
                },
                "history": [
                    { "performance": { "score": 80 } },
                    { "performance": { "score": 80 } }
                ]
            })
            .to_string(),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(struggle["score"], 1.0);
    assert_eq!(
        serde_json::from_value::<StruggleLevel>(struggle["level"].clone()).unwrap(),
        StruggleLevel::High
    );

    let fatigue: Value = serde_json::from_str(
        &assess_fatigue(
            json!({
                "sessionData": {
                    "duration": 3600,
                    "focusLevelTimeline": [
                        { "level": 9 }, { "level": 9 }, { "level": 9 },
                        { "level": 2 }, { "level": 2 }, { "level": 2 }
                    ],
                    "idleTime": 120,
                    "errorCount": 4
                },
                "userRhythm": { "averageAttentionSpan": 20, "preferredBreakInterval": 25 }
            })
            .to_string(),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(fatigue["needs_break"], true);
    assert_eq!(
        serde_json::from_value::<BreakUrgency>(fatigue["urgency"].clone()).unwrap(),
        BreakUrgency::High
    );
    assert_eq!(fatigue["suggested_duration"], 10);
    assert_eq!(fatigue["current_session_minutes"], 60);
}

#[test]
fn test_mastery_state_is_caller_owned() {
    let mut mastery = json!({});
    for (day, score) in [(1, 40), (2, 50), (3, 90)] {
        let request = json!({
            "masteryMap": mastery,
            "interaction": {
                "skills": ["fractions", "decimals"],
                "score": score,
                "timestamp": format!("2024-05-{day:02}T10:00:00Z")
            }
        });
        let response: MasteryResponse =
            serde_json::from_str(&update_mastery(request.to_string()).unwrap()).unwrap();
        mastery = serde_json::to_value(&response.mastery).unwrap();
    }

    let fractions = &mastery["fractions"];
    assert_eq!(fractions["practice_count"], 3);
    // 0.4 -> 0.43 -> 0.571
    assert!((fractions["mastery_level"].as_f64().unwrap() - 0.571).abs() < 1e-9);
    assert!((fractions["average_score"].as_f64().unwrap() - 0.6).abs() < 1e-9);
}

#[test]
fn test_history_that_is_not_a_list_is_rejected() {
    for bad in [json!("records"), json!(12), json!({"a": 1})] {
        let result = analyze_history(json!({ "history": bad }).to_string());
        assert!(matches!(result, Err(ComputeError::InvalidHistory(_))));
    }
}

#[test]
fn test_custom_configuration_changes_thresholds() {
    let config = EngineConfig::from_json(r#"{"struggle": {"struggle_threshold": 0.3}}"#).unwrap();
    let engine = LearningEngine::with_config(config);

    let json = engine
        .struggle_json(r#"{"session": {"errorCount": 9, "helpRequestCount": 9}}"#)
        .unwrap();
    let result: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(result["is_struggling"], true);
    assert_eq!(result["level"], "moderate");
}

struct OptimisticRegressor;

impl PerformanceRegressor for OptimisticRegressor {
    fn predict(&self, history: &[ScorePoint]) -> PredictionResult {
        PredictionResult {
            predicted_score: 95.0,
            confidence: 0.9,
            trend: TrendDirection::Improving,
            improvement_rate: 0.0,
            current_average: 0.0,
            data_points: history.len(),
            recommendations: Vec::new(),
        }
    }
}

#[test]
fn test_installed_model_replaces_heuristic_prediction() {
    let context =
        EngineContext::default().with_performance_regressor(Box::new(OptimisticRegressor));
    let engine = LearningEngine::new(context);
    assert!(engine.model_status().performance_regressor_loaded);

    let report: Value =
        serde_json::from_str(&engine.analyze_json(r#"{"history": [{"duration": 60}]}"#).unwrap())
            .unwrap();
    assert_eq!(report["prediction"]["predicted_score"], 95.0);
    // Pattern matching still falls back to the heuristic matcher
    assert_eq!(report["patterns"]["needs_more_data"], true);
}
