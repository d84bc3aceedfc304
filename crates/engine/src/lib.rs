//! # Engine Crate
//!
//! The recommendation orchestrator: strategies, request normalization,
//! and the end-to-end pipeline wiring.
//!
//! ## Components
//!
//! - [`request`]: `RecommendationRequest`, the strategy set, and input
//!   normalization (unknown strategies fall back, limits are clamped)
//! - [`orchestrator`]: `RecommendationEngine`, which builds the user
//!   context, fetches candidates, runs the scoring pipeline, and ranks
//! - [`result`]: the final payload with per-response metadata
//! - [`error`]: the two fatal errors; every other failure degrades into
//!   `metadata.errors`
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{RecommendationEngine, RecommendationRequest};
//!
//! let engine = RecommendationEngine::new(content, memory, embeddings, sink);
//! let request = RecommendationRequest::new("user-42")
//!     .with_strategy("hybrid")
//!     .with_query("space heist")
//!     .with_limit(10);
//! let result = engine.generate_recommendations(&request).await?;
//! ```

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod result;

// Re-export main types
pub use error::{RecommendError, Result};
pub use orchestrator::RecommendationEngine;
pub use request::{
    DEFAULT_DIVERSITY, DEFAULT_LIMIT, MAX_LIMIT, RecommendationRequest, Strategy, StrategyProfile,
};
pub use result::{RecommendationResult, ResultMetadata};
