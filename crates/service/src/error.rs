//! Service-level error taxonomy.

use uplevel_catalog::StoreError;

/// Errors surfaced by service operations.
///
/// The external request layer maps these onto transport status codes via
/// [`ServiceError::status_class`]. Internal faults never leak detail beyond
/// a generic message; collaborator failures are propagated as a
/// service-unavailable condition, never silently swallowed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request rejected before the engine runs.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Internal engine fault. The message stays generic for callers.
    #[error("recommendation computation failed")]
    Computation,

    /// A collaborator is unreachable.
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] StoreError),
}

impl ServiceError {
    /// Status class for the external request layer.
    #[must_use]
    pub fn status_class(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Computation => 500,
            Self::Upstream(_) => 503,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
