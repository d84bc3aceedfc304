//! Scoring pipeline for recommendation candidates.
//!
//! This crate provides the pure, synchronous stages of the pipeline:
//! - SemanticMatcher: embedding similarity in [0,1]
//! - AffinityBooster: bounded additive boost plus the confidence blend
//! - DiversityRanker: genre-capped re-ranking, never dropping candidates
//! - ExplanationGenerator: reasons and safe/stretch/adventure labels
//!
//! ## Architecture
//! Stages run in a fixed order over a `Vec<ScoredCandidate>`:
//! 1. SemanticMatcher scores candidates against the context embedding
//! 2. AffinityBooster adds memory-derived boosts and finalizes confidence
//! 3. ExplanationGenerator annotates reasons and discovery factors
//! 4. DiversityRanker re-orders under the genre cap
//!
//! Every stage is deterministic given its inputs; all I/O (candidate
//! fetching, embedding lookup) happens before the pipeline runs.
//!
//! ## Example Usage
//! ```ignore
//! use scoring::{AffinityBooster, DiversityRanker, ScoringConfig, SemanticMatcher};
//!
//! let config = ScoringConfig::default();
//! let mut scored = SemanticMatcher::new(config).score(candidates, &embeddings, &ctx);
//! AffinityBooster::new(config).apply(&mut scored, &ctx);
//! let ranked = DiversityRanker.rank(scored, 0.3, 20);
//! ```

pub mod boost;
pub mod config;
pub mod diversity;
pub mod explain;
pub mod semantic;

// Re-export main types
pub use boost::AffinityBooster;
pub use config::ScoringConfig;
pub use diversity::DiversityRanker;
pub use explain::ExplanationGenerator;
pub use semantic::{SemanticMatcher, cosine_similarity, cosine_to_unit};
