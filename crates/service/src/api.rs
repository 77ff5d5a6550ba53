//! Wire-facing request and response types.
//!
//! These DTOs are what the external HTTP layer serializes; field names are
//! camelCase on the wire. Identifiers arrive as raw strings and are
//! normalized into typed ids during validation, before anything reaches the
//! engine.

use serde::{Deserialize, Serialize};
use uplevel_catalog::{Difficulty, Level, ResourceId, SkillId, SkillTarget};
use uplevel_engine::{ScoredResource, SimilarSkill};

use crate::error::ServiceError;

/// Input for `POST suggestions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub target_skills: Vec<TargetSkillInput>,
}

/// One requested target skill, as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSkillInput {
    pub skill_id: String,
    pub target_level: Option<u8>,
}

/// Output of `POST suggestions`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub recommendations: Vec<Recommendation>,
}

/// One recommended resource on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub resource_id: ResourceId,
    pub title: String,
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub difficulty: Option<Difficulty>,
    pub score: f64,
    pub score_breakdown: ScoreBreakdownDto,
}

/// Score components on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdownDto {
    pub skill_gap: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_boost: Option<f64>,
}

impl From<ScoredResource> for Recommendation {
    fn from(scored: ScoredResource) -> Self {
        Self {
            resource_id: scored.resource_id,
            title: scored.title,
            provider: scored.provider,
            kind: scored.kind,
            difficulty: scored.difficulty,
            score: scored.score,
            score_breakdown: ScoreBreakdownDto {
                skill_gap: scored.breakdown.skill_gap,
                peer_boost: scored.breakdown.peer_boost,
            },
        }
    }
}

/// Input for `POST feedback`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub resource_id: String,
    pub action: String,
}

/// Acknowledgment for `POST feedback`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackAck {
    pub recorded: bool,
}

/// Input for `POST similar-skills`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarSkillsRequest {
    pub skill_id: String,
}

/// Output of `POST similar-skills`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarSkillsResponse {
    pub similar_skills: Vec<SimilarSkill>,
}

/// Normalize and validate the target skills of a suggestion request.
///
/// Rejects an empty list, malformed identifiers, and out-of-range levels
/// before the engine runs. Out-of-range levels are refused explicitly rather
/// than clamped.
pub(crate) fn validate_targets(
    request: &SuggestionRequest,
) -> Result<Vec<SkillTarget>, ServiceError> {
    if request.target_skills.is_empty() {
        return Err(ServiceError::validation("targetSkills must not be empty"));
    }
    request
        .target_skills
        .iter()
        .map(|input| {
            let skill_id = SkillId::parse(&input.skill_id)
                .map_err(|e| ServiceError::validation(e.to_string()))?;
            let target_level = match input.target_level {
                Some(level) if (Level::MIN..=Level::MAX).contains(&level) => {
                    Some(Level::new(level))
                }
                Some(level) => {
                    return Err(ServiceError::validation(format!(
                        "target level {level} out of range {}-{}",
                        Level::MIN,
                        Level::MAX
                    )))
                }
                None => None,
            };
            Ok(SkillTarget {
                skill_id,
                target_level,
            })
        })
        .collect()
}
