//! Property-based tests for the scoring components
//!
//! Tests the following invariants:
//! - Feature vectors are always finite; normalization always lands in [0, 1]
//! - Predictions stay within [0, 100] with confidence within [0, 0.95]
//! - Struggle and fatigue scores stay within [0, 1]
//! - Mastery levels stay within [0, 1] and practice counts only grow
//! - Pattern matching is deterministic

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use learnflux::features::FEATURE_COUNT;
use learnflux::types::{
    BehaviorMetrics, BehaviorSignals, EmotionalState, FocusSample, InteractionRecord,
    InteractionType, LiveSession, MasteryMap, MediaMetrics, PerformanceMetrics, ScorePoint,
    SessionSnapshot, SkillInteraction, UserRhythm,
};
use learnflux::{
    normalize, FatigueEstimator, FeatureExtractor, MasteryTracker, PatternMatcher,
    StruggleDetector, TrendPredictor,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_emotional_state() -> impl Strategy<Value = EmotionalState> {
    prop_oneof![
        Just(EmotionalState::Confident),
        Just(EmotionalState::Engaged),
        Just(EmotionalState::Neutral),
        Just(EmotionalState::Confused),
        Just(EmotionalState::Frustrated),
    ]
}

fn arb_interaction_type() -> impl Strategy<Value = InteractionType> {
    prop_oneof![
        Just(InteractionType::View),
        Just(InteractionType::Complete),
        Just(InteractionType::Pause),
        Just(InteractionType::Review),
    ]
}

fn arb_timestamp() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(
        (1u32..=28, 0u32..=23).prop_map(|(day, hour)| format!("2024-02-{day:02}T{hour:02}:15:00Z")),
    )
}

fn arb_record() -> impl Strategy<Value = InteractionRecord> {
    (
        (0.0f64..=1.0e6),                          // duration
        (0.0f64..=100.0),                          // completion_rate
        (1.0f64..=10.0),                           // focus_level
        (0.0f64..=100.0),                          // score
        arb_emotional_state(),
        arb_interaction_type(),
        arb_timestamp(),
        proptest::option::of(0u8..6),              // content id
        (0u32..=20, 0u32..=10, 0u32..=10),         // hints, revisits, tab switches
        (0u32..=10, 0.25f64..=2.0),                // rewinds, playback speed
        prop_oneof![Just("text"), Just("video"), Just("quiz")],
    )
        .prop_map(
            |(
                duration,
                completion_rate,
                focus_level,
                score,
                emotional_state,
                interaction_type,
                timestamp,
                content,
                (hints, revisit_count, tab_switches),
                (rewind_count, average_playback_speed),
                content_type,
            )| InteractionRecord {
                content_id: content.map(|c| format!("content-{c}")),
                content_type: Some(content_type.to_string()),
                interaction_type,
                timestamp,
                duration,
                completion_rate,
                focus_level,
                emotional_state,
                performance: PerformanceMetrics {
                    score,
                    hints,
                    ..Default::default()
                },
                behavior: BehaviorSignals {
                    pause_frequency: f64::from(hints % 7),
                    revisit_count,
                },
                behavior_metrics: Some(BehaviorMetrics {
                    tab_switches,
                    idle_time: 0.0,
                }),
                media: Some(MediaMetrics {
                    rewind_count,
                    average_playback_speed,
                }),
                ..Default::default()
            },
        )
}

fn arb_history(max: usize) -> impl Strategy<Value = Vec<InteractionRecord>> {
    prop::collection::vec(arb_record(), 0..max)
}

fn arb_live_session() -> impl Strategy<Value = LiveSession> {
    (
        (0.0f64..=20.0),
        0u32..=10,
        0u32..=10,
        0u32..=10,
        (0.0f64..=10.0),
        (0.0f64..=5000.0),
        proptest::option::of(1.0f64..=3000.0),
        (0.0f64..=100.0),
    )
        .prop_map(
            |(
                pause_frequency,
                rewind_count,
                help_request_count,
                error_count,
                focus_level,
                duration,
                expected_duration,
                score,
            )| LiveSession {
                pause_frequency,
                rewind_count,
                help_request_count,
                error_count,
                focus_level,
                duration,
                expected_duration,
                score,
            },
        )
}

fn arb_snapshot() -> impl Strategy<Value = SessionSnapshot> {
    (
        (0.0f64..=10_000.0),
        prop::collection::vec(1.0f64..=10.0, 0..12),
        (0.0f64..=600.0),
        0u32..=10,
    )
        .prop_map(|(duration, levels, idle_time, error_count)| SessionSnapshot {
            duration,
            focus_timeline: levels
                .into_iter()
                .map(|level| FocusSample {
                    timestamp: None,
                    level,
                })
                .collect(),
            idle_time,
            error_count,
        })
}

fn arb_skill_interaction() -> impl Strategy<Value = SkillInteraction> {
    (
        prop::collection::vec(prop_oneof![Just("algebra"), Just("geometry"), Just("logic")], 0..4),
        (-50.0f64..=150.0),
    )
        .prop_map(|(skills, score)| SkillInteraction {
            skills: skills.into_iter().map(str::to_string).collect(),
            score,
            timestamp: None,
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_features_are_finite(history in prop::collection::vec(arb_record(), 1..30)) {
        let features = FeatureExtractor::default().extract(&history);
        let values = features.values();
        prop_assert_eq!(values.len(), FEATURE_COUNT);
        for value in values {
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn prop_normalized_features_in_unit_range(history in arb_history(30)) {
        let normalized = normalize(&FeatureExtractor::default().extract(&history));
        for value in normalized {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn prop_prediction_bounds(
        points in prop::collection::vec(
            ((-500.0f64..=500.0), (0.0f64..=100.0), (1.0f64..=10.0)),
            0..40,
        )
    ) {
        let history: Vec<ScorePoint> = points
            .into_iter()
            .map(|(score, completion_rate, focus_level)| ScorePoint {
                score,
                completion_rate,
                focus_level,
            })
            .collect();
        let prediction = TrendPredictor::default().predict(&history);

        prop_assert!((0.0..=100.0).contains(&prediction.predicted_score));
        prop_assert!((0.0..=0.95).contains(&prediction.confidence));
        prop_assert!(prediction.recommendations.len() <= 4);
        prop_assert_eq!(prediction.data_points, history.len());
    }

    #[test]
    fn prop_struggle_bounds(session in arb_live_session(), history in arb_history(10)) {
        let result = StruggleDetector::default().assess(&session, &history);

        prop_assert!((0.0..=1.0).contains(&result.score));
        prop_assert_eq!(result.is_struggling, result.score >= 0.6);
        prop_assert!(result.indicators.len() <= 7);
    }

    #[test]
    fn prop_fatigue_bounds(
        session in arb_snapshot(),
        span in 1.0f64..=120.0,
        interval in 1.0f64..=90.0,
    ) {
        let rhythm = UserRhythm {
            average_attention_span: span,
            preferred_break_interval: interval,
        };
        let result = FatigueEstimator::default().assess(&session, &rhythm);

        prop_assert!((0.0..=1.0).contains(&result.fatigue_score));
        prop_assert_eq!(result.needs_break, result.fatigue_score >= 0.7);
        if result.needs_break {
            prop_assert_eq!(result.minutes_until_next_break, 0);
        } else {
            prop_assert!(result.minutes_until_next_break >= 1);
        }
    }

    #[test]
    fn prop_mastery_clamped_and_counts_grow(
        interactions in prop::collection::vec(arb_skill_interaction(), 1..20)
    ) {
        let tracker = MasteryTracker::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut map = MasteryMap::new();

        for interaction in &interactions {
            let before = map.clone();
            map = tracker.update_at(map, interaction, now);

            for (skill, state) in &map {
                prop_assert!((0.0..=1.0).contains(&state.mastery_level));
                let previous = before.get(skill).map_or(0, |s| s.practice_count);
                let practiced = interaction.skills.iter().any(|s| s == skill);
                let expected = if practiced { previous + 1 } else { previous };
                prop_assert_eq!(state.practice_count, expected);
            }
        }

        let recommendations = tracker.recommend_at(&map, now);
        prop_assert!(recommendations.len() <= 10);
        prop_assert!(recommendations.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn prop_pattern_matching_is_deterministic(history in arb_history(25)) {
        let matcher = PatternMatcher::default();
        let first = matcher.match_history(&history);
        let second = matcher.match_history(&history);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.needs_more_data, history.len() < 10);
        for score in first.scores.values() {
            prop_assert!((0.0..=1.0).contains(score));
        }
    }
}
