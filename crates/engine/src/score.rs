//! Gap-based resource scoring.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uplevel_catalog::{
    Difficulty, Resource, ResourceId, Skill, SkillId, SkillTarget, UserSkillProfile,
};

use crate::peers::{resource_popularity, PeerUsageMap};
use crate::EngineConfig;

/// Floor of the score range; a matched resource never scores below this.
pub const SCORE_FLOOR: f64 = 0.1;
/// Linear decay applied per level of gap.
const GAP_DECAY: f64 = 0.1;

/// A scored, ranked resource recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResource {
    pub resource_id: ResourceId,
    pub title: String,
    pub provider: String,
    pub kind: String,
    pub difficulty: Option<Difficulty>,
    /// Target skill that produced this match. When several targets match the
    /// same resource, the earliest-supplied target wins.
    pub skill_id: SkillId,
    pub updated_at: DateTime<Utc>,
    /// Final score in `[0.1, 1.0]`.
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Components behind a recommendation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Gap-based base score before any peer blending.
    pub skill_gap: f64,
    /// Normalized peer popularity in `[0, 1]`; absent when no peer data was
    /// supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_boost: Option<f64>,
}

/// Base score for a resource level against a target level.
///
/// Linear decay with a floor: `max(0.1, 1 − 0.1 × |target − resource|)`.
/// The gap domain is effectively 0-9, so the result is always in
/// `[0.1, 1.0]`.
#[must_use]
pub fn gap_score(target_level: u8, resource_level: u8) -> f64 {
    let gap = target_level.abs_diff(resource_level);
    (1.0 - GAP_DECAY * f64::from(gap)).max(SCORE_FLOOR)
}

/// Compute ranked recommendations for the given target skills.
///
/// Pure function of its arguments plus the supplied snapshots: nothing is
/// mutated, and identical inputs produce an identical ordered result.
/// Returns an empty list (not an error) when `targets` is empty or no
/// resource matches any target skill.
///
/// Per target skill, candidates are the resources mapped to that skill,
/// newest `updated_at` first, capped at `config.per_skill_cap`. Resources
/// already matched by an earlier target are skipped, so the earlier target
/// populates the breakdown. With peer data, the base gap score is blended
/// with normalized peer popularity and clamped back into `[0.1, 1.0]`.
pub fn compute(
    targets: &[SkillTarget],
    profile: &UserSkillProfile,
    resources: &[Resource],
    skills: &[Skill],
    peers: Option<&PeerUsageMap>,
    config: &EngineConfig,
) -> Vec<ScoredResource> {
    if targets.is_empty() {
        return Vec::new();
    }

    let known_skills: HashSet<&SkillId> = skills.iter().map(|s| &s.id).collect();
    let popularity = peers.map(|map| resource_popularity(profile, map));

    let mut seen: HashSet<ResourceId> = HashSet::new();
    let mut ranked: Vec<ScoredResource> = Vec::new();

    for target in targets {
        if !known_skills.contains(&target.skill_id) {
            tracing::debug!(
                target: "uplevel::engine",
                skill = %target.skill_id,
                "target skill missing from skill pool; matching by id only"
            );
        }
        let target_level = target.effective_level();

        // Newest material first within a skill, capped to bound cost.
        let mut candidates: Vec<&Resource> = resources
            .iter()
            .filter(|r| r.skill_id.as_ref() == Some(&target.skill_id))
            .collect();
        candidates.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        candidates.truncate(config.per_skill_cap);

        for resource in candidates {
            if resource.title.trim().is_empty() {
                tracing::warn!(
                    target: "uplevel::engine",
                    resource = %resource.id,
                    "skipping malformed resource record"
                );
                continue;
            }
            if !seen.insert(resource.id.clone()) {
                continue;
            }

            let base = gap_score(target_level, resource.calibrated_level());
            let boost = popularity
                .as_ref()
                .map(|p| p.get(&resource.id).copied().unwrap_or(0.0));
            let score = match boost {
                Some(pop) => ((1.0 - config.peer_alpha) * base + config.peer_alpha * pop)
                    .clamp(SCORE_FLOOR, 1.0),
                None => base,
            };

            ranked.push(ScoredResource {
                resource_id: resource.id.clone(),
                title: resource.title.clone(),
                provider: resource.provider.clone(),
                kind: resource.kind.clone(),
                difficulty: resource.difficulty,
                skill_id: target.skill_id.clone(),
                updated_at: resource.updated_at,
                score,
                breakdown: ScoreBreakdown {
                    skill_gap: base,
                    peer_boost: boost,
                },
            });
        }
    }

    // Score descending; ties go to fresher material, then id for a total
    // deterministic order.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
            .then_with(|| a.resource_id.cmp(&b.resource_id))
    });
    ranked.truncate(config.limit);
    ranked
}
