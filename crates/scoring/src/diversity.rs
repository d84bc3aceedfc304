//! Diversity-aware re-ranking.
//!
//! Re-orders a scored candidate list so one genre cannot dominate the
//! top of the results. Over-represented candidates are deferred to the
//! tail, never dropped: truncation to the requested limit happens in the
//! orchestrator, after ranking, so the ranker always sees the full set.

use catalog::GenreId;
use context::ScoredCandidate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Re-orders candidates under a soft per-genre cap.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiversityRanker;

impl DiversityRanker {
    /// Rank candidates by confidence with a genre-repetition cap.
    ///
    /// ## Algorithm
    /// 1. Stable sort by confidence descending; equal confidence keeps
    ///    the relative input order (deterministic tie-break)
    /// 2. diversity_factor 0 means no reordering beyond the sort
    /// 3. Otherwise cap = max(1, ceil((1 - factor) * limit)): walk the
    ///    sorted list, keeping each candidate until its primary genre has
    ///    appeared `cap` times, deferring the rest
    /// 4. Append deferred candidates, still in confidence order
    ///
    /// The highest-confidence candidate is always admitted first (its
    /// genre count starts at zero and the cap is at least 1), so the top
    /// pick can move rank but never disappear.
    #[instrument(skip(self, scored), fields(candidates = scored.len(), factor = diversity_factor))]
    pub fn rank(
        &self,
        mut scored: Vec<ScoredCandidate>,
        diversity_factor: f32,
        limit: usize,
    ) -> Vec<ScoredCandidate> {
        let factor = diversity_factor.clamp(0.0, 1.0);

        // Stable: ties preserve input order
        scored.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if factor == 0.0 || scored.len() <= 1 {
            return scored;
        }

        let cap = genre_cap(factor, limit);
        debug!("Applying genre cap {} over {} candidates", cap, scored.len());

        let mut counts: HashMap<GenreId, usize> = HashMap::new();
        let mut kept = Vec::with_capacity(scored.len());
        let mut deferred = Vec::new();

        for candidate in scored {
            match candidate.movie.primary_genre() {
                Some(genre) => {
                    let seen = counts.entry(genre).or_insert(0);
                    if *seen < cap {
                        *seen += 1;
                        kept.push(candidate);
                    } else {
                        deferred.push(candidate);
                    }
                }
                // Genre-less candidates are never capped
                None => kept.push(candidate),
            }
        }

        kept.extend(deferred);
        kept
    }

    /// Diversity metadata: distinct primary genres / result count,
    /// computed after truncation. Empty results score 0.
    pub fn diversity_score(results: &[ScoredCandidate]) -> f32 {
        if results.is_empty() {
            return 0.0;
        }
        let distinct: HashSet<Option<GenreId>> = results
            .iter()
            .map(|c| c.movie.primary_genre())
            .collect();
        distinct.len() as f32 / results.len() as f32
    }
}

/// How many times one primary genre may appear before deferral.
/// Scales inversely with the diversity factor; never below 1.
fn genre_cap(factor: f32, limit: usize) -> usize {
    // Epsilon keeps float error in (1 - factor) * limit from pushing an
    // exact product like 1.0 over the next ceil step
    let cap = (((1.0 - factor) * limit as f32) - 1e-6).ceil() as usize;
    cap.max(1)
}
