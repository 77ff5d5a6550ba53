//! Peer usage aggregation and similarity.
//!
//! Builds a transient map of peer signals (declared skills plus resources
//! their approved/completed plans recommended) and derives from it the
//! similarity-weighted popularity the scorer blends in. The aggregator holds
//! no state; callers wishing to avoid repeated cost memoize the result
//! through the cache layer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uplevel_catalog::{DevelopmentPlan, ResourceId, SkillId, SkillRating, UserId, UserSkillProfile};

/// One peer's signal: declared skills plus used resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerSignal {
    pub skills: Vec<SkillRating>,
    pub used_resources: HashSet<ResourceId>,
}

/// Transient mapping of peer signals keyed by user. Derived, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerUsageMap {
    pub peers: HashMap<UserId, PeerSignal>,
}

impl PeerUsageMap {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }
}

/// Build the peer usage map for a requester.
///
/// Includes every user except `exclude`. Only plans in the approved or
/// completed states contribute usage. Peers with neither skills nor used
/// resources are dropped to keep the map sparse.
#[must_use]
pub fn aggregate(
    exclude: &UserId,
    profiles: &[UserSkillProfile],
    plans: &[DevelopmentPlan],
) -> PeerUsageMap {
    let mut peers: HashMap<UserId, PeerSignal> = HashMap::new();

    for profile in profiles {
        if &profile.user_id == exclude {
            continue;
        }
        peers
            .entry(profile.user_id.clone())
            .or_default()
            .skills
            .clone_from(&profile.skills);
    }

    for plan in plans {
        if !plan.status.counts_for_peers() || &plan.employee_id == exclude {
            continue;
        }
        let signal = peers.entry(plan.employee_id.clone()).or_default();
        for entry in &plan.recommended_resources {
            signal.used_resources.insert(entry.resource_id.clone());
        }
    }

    peers.retain(|_, signal| !signal.skills.is_empty() || !signal.used_resources.is_empty());
    PeerUsageMap { peers }
}

/// Cosine similarity between two skill vectors over their shared skill ids.
///
/// Returns 0.0 when either vector is empty or the vectors share no skills.
#[must_use]
pub fn cosine_similarity(a: &[SkillRating], b: &[SkillRating]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let index: HashMap<&SkillId, f64> = a
        .iter()
        .map(|r| (&r.skill_id, f64::from(r.level.get())))
        .collect();

    let mut dot = 0.0;
    for rating in b {
        if let Some(level) = index.get(&rating.skill_id) {
            dot += level * f64::from(rating.level.get());
        }
    }
    if dot == 0.0 {
        return 0.0;
    }

    let norm = |ratings: &[SkillRating]| -> f64 {
        ratings
            .iter()
            .map(|r| f64::from(r.level.get()).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Similarity-weighted popularity of each resource among the requester's
/// peers, normalized into `[0, 1]` by the most popular resource.
///
/// Peers whose skill vector does not overlap the requester's contribute
/// nothing.
#[must_use]
pub fn resource_popularity(
    requester: &UserSkillProfile,
    peers: &PeerUsageMap,
) -> HashMap<ResourceId, f64> {
    let mut raw: HashMap<ResourceId, f64> = HashMap::new();

    for signal in peers.peers.values() {
        let similarity = cosine_similarity(&requester.skills, &signal.skills);
        if similarity <= 0.0 {
            continue;
        }
        for resource in &signal.used_resources {
            *raw.entry(resource.clone()).or_insert(0.0) += similarity;
        }
    }

    let max = raw.values().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for value in raw.values_mut() {
            *value /= max;
        }
    }
    raw
}
