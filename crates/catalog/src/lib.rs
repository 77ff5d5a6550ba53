//! Domain types and collaborator stores for the uplevel recommendation core.
//!
//! This crate provides:
//! - Identifier newtypes, normalized and validated at the system boundary
//! - Catalog entities (skills, resources) and record entities (profiles,
//!   development plans, feedback)
//! - The `CatalogStore` / `RecordStore` collaborator traits, with in-memory
//!   implementations for tests and single-process deployments

pub mod ids;
pub mod store;
pub mod types;

pub use ids::{IdError, PlanId, ResourceId, SkillId, UserId};
pub use store::{
    CatalogSnapshot, CatalogStore, MemoryCatalog, MemoryRecords, RecordStore, StoreError,
    StoreResult,
};
pub use types::{
    DevelopmentPlan, Difficulty, Feedback, FeedbackAction, Level, PlanResource, PlanStatus,
    RecommendationStatus, Resource, Skill, SkillRating, SkillTarget, UserSkillProfile,
    VerificationMethod,
};
