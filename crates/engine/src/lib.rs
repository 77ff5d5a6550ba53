//! Recommendation engine for the uplevel core.
//!
//! This crate provides:
//! - Gap-based resource scoring with optional peer-usage blending
//! - Peer aggregation from approved/completed development plans
//! - Same-category similar-skill lookup
//!
//! All computation here is synchronous and side-effect-free: functions take
//! snapshots of catalog and record data and never mutate them, so they can
//! run on any worker without coordination.

pub mod peers;
pub mod score;
pub mod similar;

pub use peers::{aggregate, cosine_similarity, resource_popularity, PeerSignal, PeerUsageMap};
pub use score::{compute, gap_score, ScoreBreakdown, ScoredResource, SCORE_FLOOR};
pub use similar::{name_similarity, similar_skills, SimilarSkill};

/// Default blend factor for the peer signal.
pub const DEFAULT_PEER_ALPHA: f64 = 0.2;
/// Default candidate cap per target skill.
pub const DEFAULT_PER_SKILL_CAP: usize = 5;
/// Default maximum number of recommendations returned.
pub const DEFAULT_LIMIT: usize = 10;

/// Tuning knobs for the recommendation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Blend factor for the peer signal; 0 disables the blend even when peer
    /// data is supplied.
    pub peer_alpha: f64,
    /// Candidate cap per target skill. Engine cost is bounded by limiting
    /// the candidate set, not by wall-clock timeouts.
    pub per_skill_cap: usize,
    /// Maximum number of recommendations returned.
    pub limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            peer_alpha: DEFAULT_PEER_ALPHA,
            per_skill_cap: DEFAULT_PER_SKILL_CAP,
            limit: DEFAULT_LIMIT,
        }
    }
}
