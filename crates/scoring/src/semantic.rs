//! Semantic matching of candidates against the user context.
//!
//! Attaches a similarity score in [0,1] to each candidate by comparing
//! its overview embedding with the context's combined embedding. Both
//! missing candidate embeddings and a missing context embedding are
//! normal: the candidate gets the neutral baseline and a category tag
//! instead of an error.

use crate::config::{SEMANTIC_MATCH_MIN, ScoringConfig};
use catalog::{CandidateMovie, Embedding, MovieId};
use context::{MatchCategory, ScoredCandidate, UserContext};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Scores candidates by embedding similarity.
#[derive(Debug, Clone, Default)]
pub struct SemanticMatcher {
    config: ScoringConfig,
}

impl SemanticMatcher {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Attach semantic scores to every candidate, preserving input order.
    ///
    /// `embeddings` holds the vectors the orchestrator prefetched from
    /// the embedding service; candidates absent from the map are tagged
    /// `embedding-missing` and scored at the neutral baseline.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn score(
        &self,
        candidates: Vec<CandidateMovie>,
        embeddings: &HashMap<MovieId, Embedding>,
        user_context: &UserContext,
    ) -> Vec<ScoredCandidate> {
        let context_embedding = user_context.context_embedding();
        if context_embedding.is_none() {
            debug!("No usable context embedding; scoring at neutral baseline");
        }

        candidates
            .into_par_iter()
            .map(|movie| self.score_single(movie, embeddings, context_embedding.as_deref()))
            .collect()
    }

    fn score_single(
        &self,
        movie: CandidateMovie,
        embeddings: &HashMap<MovieId, Embedding>,
        context_embedding: Option<&[f32]>,
    ) -> ScoredCandidate {
        let mut scored = ScoredCandidate::new(movie);

        let Some(context_embedding) = context_embedding else {
            scored.semantic_score = self.config.neutral_similarity;
            scored.categories.push(MatchCategory::ColdStart);
            return scored;
        };

        match embeddings.get(&scored.movie.id) {
            Some(candidate_embedding) => {
                scored.semantic_score =
                    cosine_to_unit(context_embedding, candidate_embedding);
                if scored.semantic_score >= SEMANTIC_MATCH_MIN {
                    scored.categories.push(MatchCategory::SemanticMatch);
                }
            }
            None => {
                scored.semantic_score = self.config.neutral_similarity;
                scored.categories.push(MatchCategory::EmbeddingMissing);
            }
        }
        scored
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Cosine similarity mapped from [-1,1] into [0,1].
pub fn cosine_to_unit(a: &[f32], b: &[f32]) -> f32 {
    ((cosine_similarity(a, b) + 1.0) / 2.0).clamp(0.0, 1.0)
}
