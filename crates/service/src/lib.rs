//! Request-facing core of the uplevel recommendation service.
//!
//! An external HTTP layer calls into [`App`]; everything behind that
//! (boundary validation, the scoring engine, peer aggregation, the TTL
//! cache, and the fire-and-forget job trigger) lives in this workspace.
//! This crate owns:
//! - The operation surface: suggestions, feedback, similar skills, and plan
//!   refresh triggering
//! - The error taxonomy the transport layer maps onto status codes
//! - Configuration (TOML file + `UPLEVEL_*` environment overrides)
//! - Explicit component lifecycle: construct at startup, tear down at
//!   shutdown, no process-global singletons

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;

pub use api::{
    FeedbackAck, FeedbackRequest, Recommendation, ScoreBreakdownDto, SimilarSkillsRequest,
    SimilarSkillsResponse, SuggestionRequest, SuggestionResponse, TargetSkillInput,
};
pub use app::App;
pub use config::{CacheBackend, Config, QueueBackend};
pub use error::ServiceError;
pub use telemetry::init_tracing;
