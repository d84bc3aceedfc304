//! # Context Crate
//!
//! Request-scoped user context and the types that flow through the
//! scoring pipeline.
//!
//! ## Components
//!
//! - [`types`]: `UserContext`, `ScoredCandidate`, match categories, and
//!   the discovery-factor classification
//! - [`builder`]: `ContextBuilder`, which aggregates affinities, stored
//!   taste vectors, and the embedded query into one snapshot per request
//!
//! The builder degrades on collaborator failure instead of aborting:
//! cold start and a down memory store both yield a usable low-confidence
//! context, with failures handed back for result metadata.

pub mod builder;
pub mod types;

// Re-export commonly used types
pub use builder::{BuiltContext, ContextBuilder};
pub use types::{
    ContextConfidence, DiscoveryFactor, MatchCategory, ScoredCandidate, UserContext,
};
