//! Error types for collaborator calls.
//!
//! Every external collaborator (content store, affinity store, embedding
//! service) returns `Result<T, CollaboratorError>`. The orchestrator
//! pattern-matches on these to decide between default-substitution and
//! fatal propagation, which keeps the degradation policy visible instead
//! of buried in catch-all handlers.

use thiserror::Error;

/// A failed call to an external collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or refused the call
    #[error("{component} unavailable: {reason}")]
    Unavailable { component: String, reason: String },

    /// The collaborator did not answer within its deadline
    #[error("{component} timed out")]
    Timeout { component: String },

    /// The collaborator answered with data the engine cannot use
    #[error("{component} returned malformed data: {detail}")]
    Malformed { component: String, detail: String },
}

impl CollaboratorError {
    /// Name of the component that failed, used as the key under
    /// `metadata.errors` in the final result.
    pub fn component(&self) -> &str {
        match self {
            CollaboratorError::Unavailable { component, .. } => component,
            CollaboratorError::Timeout { component } => component,
            CollaboratorError::Malformed { component, .. } => component,
        }
    }

    pub fn unavailable(component: impl Into<String>, reason: impl Into<String>) -> Self {
        CollaboratorError::Unavailable {
            component: component.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for collaborator call results
pub type Result<T> = std::result::Result<T, CollaboratorError>;
