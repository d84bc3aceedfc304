//! Final recommendation payload returned to callers.

use context::ScoredCandidate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-response metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ResultMetadata {
    /// Strategy provenance, e.g. "smart" or "hybrid(smart+behavioral)"
    pub source: String,
    /// Mean per-candidate confidence of the returned movies
    pub confidence: f32,
    /// Distinct primary genres / result count, post-ranking
    pub diversity_score: f32,
    /// Collaborator failures absorbed along the way, keyed by component.
    /// Present entries mean the result was produced in degraded mode.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// The ordered result of one `generate_recommendations` call.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    pub movies: Vec<ScoredCandidate>,
    pub metadata: ResultMetadata,
}

impl RecommendationResult {
    /// Mean confidence over a candidate list; 0 for an empty list.
    pub fn mean_confidence(movies: &[ScoredCandidate]) -> f32 {
        if movies.is_empty() {
            return 0.0;
        }
        movies.iter().map(|m| m.confidence).sum::<f32>() / movies.len() as f32
    }
}
