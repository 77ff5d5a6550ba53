//! Same-category similar-skill lookup.
//!
//! The scope is intentionally narrow: only skills in the exact same category
//! qualify. Trigram name similarity orders the results within that scope.

use serde::{Deserialize, Serialize};
use trigram::similarity;
use uplevel_catalog::{Skill, SkillId};

/// A skill similar to the queried one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarSkill {
    pub id: SkillId,
    pub name: String,
    pub category: String,
    /// Trigram name similarity in `[0, 1]`.
    pub similarity: f64,
}

/// Trigram similarity between two skill names, case-insensitive.
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    f64::from(similarity(&a.to_lowercase(), &b.to_lowercase()))
}

/// Find skills similar to `skill`.
///
/// Candidates are same-category skills from `pool`, excluding the skill
/// itself, ordered by descending name similarity with name as the final
/// tie-break.
#[must_use]
pub fn similar_skills(skill: &Skill, pool: &[Skill]) -> Vec<SimilarSkill> {
    let mut matches: Vec<SimilarSkill> = pool
        .iter()
        .filter(|candidate| candidate.id != skill.id && candidate.category == skill.category)
        .map(|candidate| SimilarSkill {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            category: candidate.category.clone(),
            similarity: name_similarity(&skill.name, &candidate.name),
        })
        .collect();

    matches.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    matches
}
