//! Per-skill mastery tracking
//!
//! The tracker never stores mastery state itself. Callers pass the map in and
//! get the updated map back; concurrent updates for the same learner must be
//! serialized by the caller.

use crate::config::MasteryConfig;
use crate::types::{
    parse_timestamp, MasteryMap, PracticePriority, SkillInteraction, SkillMastery,
    SkillRecommendation,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Exponentially smoothed mastery tracker
#[derive(Debug, Clone, Default)]
pub struct MasteryTracker {
    config: MasteryConfig,
}

impl MasteryTracker {
    pub fn new(config: MasteryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MasteryConfig {
        &self.config
    }

    /// Fold one interaction into the map.
    ///
    /// The interaction timestamp becomes `last_practiced`; interactions
    /// without a parseable timestamp are stamped with the current time.
    pub fn update(&self, map: MasteryMap, interaction: &SkillInteraction) -> MasteryMap {
        let practiced_at = interaction
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);
        self.update_at(map, interaction, practiced_at)
    }

    /// Fold one interaction into the map, stamping it with `practiced_at`
    pub fn update_at(
        &self,
        mut map: MasteryMap,
        interaction: &SkillInteraction,
        practiced_at: DateTime<Utc>,
    ) -> MasteryMap {
        let normalized = (interaction.score / 100.0).clamp(0.0, 1.0);
        let alpha = self.config.smoothing_rate;

        let skills: BTreeSet<&str> = interaction.skills.iter().map(String::as_str).collect();
        for skill in skills {
            match map.get_mut(skill) {
                Some(state) => {
                    let count = f64::from(state.practice_count);
                    state.mastery_level =
                        (state.mastery_level * (1.0 - alpha) + normalized * alpha).clamp(0.0, 1.0);
                    state.average_score = (state.average_score * count + normalized) / (count + 1.0);
                    state.practice_count = state.practice_count.saturating_add(1);
                    state.last_practiced = practiced_at;
                    trace!(skill, mastery = state.mastery_level, "updated skill");
                }
                None => {
                    map.insert(
                        skill.to_string(),
                        SkillMastery {
                            mastery_level: normalized,
                            practice_count: 1,
                            average_score: normalized,
                            last_practiced: practiced_at,
                        },
                    );
                    trace!(skill, mastery = normalized, "started tracking skill");
                }
            }
        }

        map
    }

    /// Practice recommendations as of now
    pub fn recommend(&self, map: &MasteryMap) -> Vec<SkillRecommendation> {
        self.recommend_at(map, Utc::now())
    }

    /// Practice recommendations as of `now`, most urgent first
    pub fn recommend_at(&self, map: &MasteryMap, now: DateTime<Utc>) -> Vec<SkillRecommendation> {
        let cfg = &self.config;
        let mut recommendations: Vec<SkillRecommendation> = map
            .iter()
            .map(|(skill, state)| {
                let days_since_practice = (now - state.last_practiced).num_days();
                let stale = days_since_practice > cfg.refresher_after_days;

                let (priority, reason) = if state.mastery_level < cfg.low_mastery {
                    (PracticePriority::High, "Low mastery - needs focused practice")
                } else if state.mastery_level < cfg.mastery_threshold {
                    (PracticePriority::Medium, "Approaching mastery - keep practicing")
                } else if stale {
                    (PracticePriority::Medium, "Needs refresher to maintain mastery")
                } else {
                    (PracticePriority::Low, "Well mastered")
                };

                SkillRecommendation {
                    skill: skill.clone(),
                    mastery_level: state.mastery_level,
                    priority,
                    reason: reason.to_string(),
                    days_since_practice,
                }
            })
            .collect();

        recommendations.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then_with(|| {
                a.mastery_level
                    .partial_cmp(&b.mastery_level)
                    .unwrap_or(Ordering::Equal)
            })
        });
        recommendations.truncate(cfg.max_recommendations);

        debug!(
            skills = map.len(),
            recommended = recommendations.len(),
            "ranked practice recommendations"
        );
        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
    }

    fn interaction(skills: &[&str], score: f64) -> SkillInteraction {
        SkillInteraction {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            score,
            timestamp: None,
        }
    }

    fn state(mastery_level: f64, last_practiced: DateTime<Utc>) -> SkillMastery {
        SkillMastery {
            mastery_level,
            practice_count: 3,
            average_score: mastery_level,
            last_practiced,
        }
    }

    #[test]
    fn test_first_and_second_update() {
        let tracker = MasteryTracker::default();
        let map = tracker.update_at(MasteryMap::new(), &interaction(&["algebra"], 80.0), at(1));

        let algebra = &map["algebra"];
        assert!((algebra.mastery_level - 0.8).abs() < 1e-9);
        assert_eq!(algebra.practice_count, 1);
        assert!((algebra.average_score - 0.8).abs() < 1e-9);

        let map = tracker.update_at(map, &interaction(&["algebra"], 60.0), at(2));
        let algebra = &map["algebra"];
        assert!((algebra.mastery_level - 0.74).abs() < 1e-9);
        assert_eq!(algebra.practice_count, 2);
        assert!((algebra.average_score - 0.70).abs() < 1e-9);
        assert_eq!(algebra.last_practiced, at(2));
    }

    #[test]
    fn test_scores_are_clamped() {
        let tracker = MasteryTracker::default();
        let map = tracker.update_at(MasteryMap::new(), &interaction(&["a", "b"], 150.0), at(1));
        assert_eq!(map["a"].mastery_level, 1.0);

        let map = tracker.update_at(map, &interaction(&["b"], -20.0), at(2));
        assert!((map["b"].mastery_level - 0.7).abs() < 1e-9);
        assert!(map["b"].mastery_level >= 0.0);
    }

    #[test]
    fn test_duplicate_tags_count_once() {
        let tracker = MasteryTracker::default();
        let map = tracker.update_at(
            MasteryMap::new(),
            &interaction(&["geometry", "geometry"], 50.0),
            at(1),
        );
        assert_eq!(map["geometry"].practice_count, 1);
    }

    #[test]
    fn test_untagged_interaction_leaves_map_alone() {
        let tracker = MasteryTracker::default();
        let map = tracker.update_at(MasteryMap::new(), &interaction(&["a"], 50.0), at(1));
        let updated = tracker.update_at(map.clone(), &interaction(&[], 90.0), at(2));
        assert_eq!(map, updated);
    }

    #[test]
    fn test_update_uses_interaction_timestamp() {
        let tracker = MasteryTracker::default();
        let mut practiced = interaction(&["a"], 50.0);
        practiced.timestamp = Some("2024-05-03T12:00:00Z".to_string());
        let map = tracker.update(MasteryMap::new(), &practiced);
        assert_eq!(map["a"].last_practiced, at(3));
    }

    #[test]
    fn test_recommend_priorities_and_order() {
        let now = at(20);
        let mut map = MasteryMap::new();
        map.insert("fresh".to_string(), state(0.9, now - Duration::days(1)));
        map.insert("stale".to_string(), state(0.9, now - Duration::days(10)));
        map.insert("weak".to_string(), state(0.2, now));
        map.insert("weaker".to_string(), state(0.1, now));
        map.insert("close".to_string(), state(0.6, now));

        let recs = MasteryTracker::default().recommend_at(&map, now);
        let order: Vec<&str> = recs.iter().map(|r| r.skill.as_str()).collect();
        assert_eq!(order, vec!["weaker", "weak", "close", "stale", "fresh"]);

        assert_eq!(recs[0].priority, PracticePriority::High);
        assert_eq!(recs[2].reason, "Approaching mastery - keep practicing");
        assert_eq!(recs[3].priority, PracticePriority::Medium);
        assert_eq!(recs[3].reason, "Needs refresher to maintain mastery");
        assert_eq!(recs[3].days_since_practice, 10);
        assert_eq!(recs[4].priority, PracticePriority::Low);
    }

    #[test]
    fn test_recommend_caps_at_ten() {
        let now = at(20);
        let map: MasteryMap = (0..15)
            .map(|i| (format!("skill-{i:02}"), state(i as f64 / 20.0, now)))
            .collect();
        let recs = MasteryTracker::default().recommend_at(&map, now);
        assert_eq!(recs.len(), 10);
        assert_eq!(recs[0].skill, "skill-00");
    }

    #[test]
    fn test_exactly_seven_days_is_not_stale() {
        let now = at(20);
        let mut map = MasteryMap::new();
        map.insert("a".to_string(), state(0.8, now - Duration::days(7)));
        let recs = MasteryTracker::default().recommend_at(&map, now);
        assert_eq!(recs[0].priority, PracticePriority::Low);
    }
}
