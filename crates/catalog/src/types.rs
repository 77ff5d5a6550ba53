//! Catalog and record entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{PlanId, ResourceId, SkillId, UserId};

/// Level assumed for a resource carrying no difficulty information.
const UNKNOWN_DIFFICULTY_LEVEL: u8 = 1;

/// Proficiency level clamped to the `[1, 10]` range.
///
/// Used both for a user's current level in a skill and for target levels on
/// plans and requests. Construction clamps, so a `Level` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    /// Target level assumed when a request does not specify one.
    pub const DEFAULT_TARGET: Level = Level(5);

    /// Create a new level, clamping the value into `[1, 10]`.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// The numeric level.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::DEFAULT_TARGET
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A skill in the catalog. Created and owned by catalog management; this
/// side never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub category: String,
}

/// Difficulty bucket of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Representative numeric level for the bucket.
    #[must_use]
    pub fn bucket_level(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 5,
            Self::Advanced => 9,
        }
    }
}

/// A learning resource. Maps to at most one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub provider: String,
    /// Kind of resource (course, book, video, ...). Free-form, owned by
    /// catalog management.
    pub kind: String,
    pub skill_id: Option<SkillId>,
    pub difficulty: Option<Difficulty>,
    /// Explicit calibration override; always wins over the difficulty bucket.
    pub target_level: Option<Level>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Numeric level this resource is calibrated for.
    ///
    /// `target_level` always wins when present; otherwise the difficulty
    /// bucket maps beginner→1, intermediate→5, advanced→9, and a resource
    /// with no difficulty at all defaults to 1.
    #[must_use]
    pub fn calibrated_level(&self) -> u8 {
        if let Some(level) = self.target_level {
            return level.get();
        }
        self.difficulty
            .map(Difficulty::bucket_level)
            .unwrap_or(UNKNOWN_DIFFICULTY_LEVEL)
    }
}

/// A user's declared level in one skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRating {
    pub skill_id: SkillId,
    pub level: Level,
}

/// The set of skills a user holds. Ordering carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSkillProfile {
    pub user_id: UserId,
    pub skills: Vec<SkillRating>,
}

/// A skill a plan wants to improve, with an optional explicit target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTarget {
    pub skill_id: SkillId,
    pub target_level: Option<Level>,
}

impl SkillTarget {
    /// Effective target level, defaulting to 5 when unspecified.
    #[must_use]
    pub fn effective_level(&self) -> u8 {
        self.target_level.unwrap_or(Level::DEFAULT_TARGET).get()
    }
}

/// Lifecycle state of a development plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Pending,
    Approved,
    Active,
    Completed,
}

impl PlanStatus {
    /// Whether a successful recommendation job may move this plan to
    /// `Active`. `Active → Completed` is driven externally and never by the
    /// engine.
    #[must_use]
    pub fn can_activate(self) -> bool {
        matches!(self, Self::Draft | Self::Pending | Self::Approved)
    }

    /// Whether plans in this state contribute to peer usage aggregation.
    #[must_use]
    pub fn counts_for_peers(self) -> bool {
        matches!(self, Self::Approved | Self::Completed)
    }
}

/// Progress state of one recommended resource inside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// How completion of a recommended resource is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationMethod {
    #[default]
    None,
    Certificate,
    Assessment,
    ManagerReview,
}

/// One recommended resource tracked by a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResource {
    pub resource_id: ResourceId,
    pub status: RecommendationStatus,
    pub evidence: String,
    pub verification_method: VerificationMethod,
}

impl PlanResource {
    /// A freshly recommended entry: pending, no evidence, unverified.
    #[must_use]
    pub fn recommended(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            status: RecommendationStatus::Pending,
            evidence: String::new(),
            verification_method: VerificationMethod::None,
        }
    }
}

/// An employee's development plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevelopmentPlan {
    pub id: PlanId,
    pub employee_id: UserId,
    pub skills_to_improve: Vec<SkillTarget>,
    pub recommended_resources: Vec<PlanResource>,
    pub status: PlanStatus,
}

/// A user's reaction to a recommended resource. Append-only; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: UserId,
    pub resource_id: ResourceId,
    pub action: FeedbackAction,
    pub timestamp: DateTime<Utc>,
}

/// The kinds of feedback a user can leave on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackAction {
    Like,
    Dislike,
    Dismiss,
    Click,
}

impl FeedbackAction {
    /// Parse a raw action string, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" => Some(Self::Like),
            "dislike" => Some(Self::Dislike),
            "dismiss" => Some(Self::Dismiss),
            "click" => Some(Self::Click),
            _ => None,
        }
    }
}
