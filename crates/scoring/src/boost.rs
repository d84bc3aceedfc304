//! Affinity boosting and the combined-confidence blend.
//!
//! The boost is additive and bounded: `max_boost * average(strengths)`
//! over the candidate's genres that appear in the user's affinity map.
//! Clamping makes an out-of-range boost unrepresentable rather than a
//! runtime check.

use crate::config::ScoringConfig;
use catalog::GenreId;
use context::{MatchCategory, ScoredCandidate, UserContext};
use std::collections::HashMap;
use tracing::instrument;

/// Applies affinity boosts and finalizes combined confidence.
#[derive(Debug, Clone, Default)]
pub struct AffinityBooster {
    config: ScoringConfig,
}

impl AffinityBooster {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Boost every candidate in place and compute its confidence.
    ///
    /// ## Algorithm
    /// 1. Collect affinity strengths for the candidate's genres
    /// 2. boost = max_boost * average(strengths), 0 when nothing matches
    /// 3. confidence = clamp01(semantic * semantic_weight
    ///    + rating/10 * rating_weight + boost)
    #[instrument(skip_all, fields(candidates = scored.len()))]
    pub fn apply(&self, scored: &mut [ScoredCandidate], user_context: &UserContext) {
        for candidate in scored.iter_mut() {
            let boost = self.compute_boost(&candidate.movie.genres, &user_context.affinities);
            candidate.affinity_boost = boost;

            if boost > 0.0 {
                candidate.categories.push(MatchCategory::MemoryMatch);
            }
            if !user_context.requested_genres.is_empty()
                && candidate
                    .movie
                    .genres
                    .iter()
                    .any(|g| user_context.requested_genres.contains(g))
            {
                candidate.categories.push(MatchCategory::GenreMatch);
            }

            candidate.confidence = self.combined_confidence(
                candidate.semantic_score,
                candidate.movie.rating,
                boost,
            );
        }
    }

    /// Bounded additive boost for one genre list.
    ///
    /// An empty genre list or no affinity overlap yields 0, not an error.
    pub fn compute_boost(
        &self,
        genres: &[GenreId],
        affinities: &HashMap<GenreId, f32>,
    ) -> f32 {
        let strengths: Vec<f32> = genres
            .iter()
            .filter_map(|g| affinities.get(g).copied())
            .collect();
        if strengths.is_empty() {
            return 0.0;
        }
        let average = strengths.iter().sum::<f32>() / strengths.len() as f32;
        (self.config.max_boost * average).clamp(0.0, self.config.max_boost)
    }

    /// Deterministic blend of semantic score, quality rating, and boost.
    pub fn combined_confidence(&self, semantic: f32, rating: f32, boost: f32) -> f32 {
        let rating_component = (rating / 10.0).clamp(0.0, 1.0);
        (semantic * self.config.semantic_weight
            + rating_component * self.config.rating_weight
            + boost)
            .clamp(0.0, 1.0)
    }
}
