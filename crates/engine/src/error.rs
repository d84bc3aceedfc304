//! Fatal errors of the recommendation engine.
//!
//! Only two failures propagate to the caller; everything else degrades
//! and is reported under `metadata.errors` in a successful result.

use thiserror::Error;

/// Errors returned by `RecommendationEngine::generate_recommendations`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The request violated the one hard precondition: a non-empty user id
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The candidate source failed or returned nothing — there is
    /// nothing to rank
    #[error("no candidates available: {0}")]
    NoCandidates(String),
}

/// Convenience type alias for engine results
pub type Result<T> = std::result::Result<T, RecommendError>;
