//! Scoring constants and configuration.
//!
//! Every threshold the pipeline uses lives here as a named constant, so
//! the blend is auditable in one place and tests can pin exact values.

/// Upper bound on the additive affinity boost. A perfect-affinity match
/// can shift ranking by at most this much, which keeps historical signal
/// from overriding fresh semantic relevance.
pub const MAX_BOOST: f32 = 0.25;

/// Similarity assigned when no context embedding or candidate embedding
/// exists. Neutral rather than zero, so non-semantic signals (affinity,
/// rating) still differentiate candidates on cold start.
pub const NEUTRAL_SIMILARITY: f32 = 0.5;

/// Weight of semantic similarity in the combined confidence.
pub const SEMANTIC_WEIGHT: f32 = 0.6;

/// Weight of the normalized 0-10 quality rating in the combined
/// confidence. SEMANTIC_WEIGHT + RATING_WEIGHT + MAX_BOOST = 1.0, so a
/// maxed-out candidate lands exactly at confidence 1.0.
pub const RATING_WEIGHT: f32 = 0.15;

/// Minimum semantic score for the "semantic-match" category tag.
pub const SEMANTIC_MATCH_MIN: f32 = 0.6;

/// Minimum rating for a "highly rated" explanation.
pub const HIGH_RATING_MIN: f32 = 7.5;

// Discovery-factor thresholds (see ExplanationGenerator). The source
// system left these heuristic; they are fixed here and pinned by tests.

/// "Safe" requires the candidate's rating within this window of the
/// user's average accepted rating (0-10 scale)...
pub const SAFE_RATING_WINDOW: f32 = 1.5;

/// ...and at least this much affinity boost.
pub const SAFE_MIN_BOOST: f32 = 0.15;

/// "Adventure" requires semantic similarity at least this high...
pub const ADVENTURE_MIN_SEMANTIC: f32 = 0.65;

/// ...at most this much affinity boost...
pub const ADVENTURE_MAX_BOOST: f32 = 0.05;

/// ...and a sparse affinity map (at most this many entries) with no
/// accepted-rating baseline.
pub const SPARSE_AFFINITY_MAX: usize = 2;

/// Tunable weights for one scoring pass.
///
/// Strategies reuse the same pipeline with different weightings; the
/// defaults are the documented constants above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    pub max_boost: f32,
    pub semantic_weight: f32,
    pub rating_weight: f32,
    pub neutral_similarity: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_boost: MAX_BOOST,
            semantic_weight: SEMANTIC_WEIGHT,
            rating_weight: RATING_WEIGHT,
            neutral_similarity: NEUTRAL_SIMILARITY,
        }
    }
}

impl ScoringConfig {
    /// Same bounds, different semantic/rating balance.
    pub fn with_weights(semantic_weight: f32, rating_weight: f32) -> Self {
        Self {
            semantic_weight,
            rating_weight,
            ..Self::default()
        }
    }
}
