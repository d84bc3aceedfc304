//! Explanation and discovery-factor generation.
//!
//! Derives a primary human-readable reason and a safe/stretch/adventure
//! classification for each surfaced candidate, from the same signals
//! that produced its score. Nothing is fabricated: every reason quotes a
//! value that was actually part of the computation (a matched affinity,
//! the query text, the candidate's own rating).

use crate::config::{
    ADVENTURE_MAX_BOOST, ADVENTURE_MIN_SEMANTIC, HIGH_RATING_MIN, SAFE_MIN_BOOST,
    SAFE_RATING_WINDOW, SPARSE_AFFINITY_MAX,
};
use catalog::GenreId;
use context::{DiscoveryFactor, MatchCategory, ScoredCandidate, UserContext};
use tracing::instrument;

/// Annotates scored candidates with reasons and discovery factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplanationGenerator;

impl ExplanationGenerator {
    /// Fill in `reason` and `discovery` for every candidate in place.
    #[instrument(skip_all, fields(candidates = scored.len()))]
    pub fn annotate(&self, scored: &mut [ScoredCandidate], user_context: &UserContext) {
        for candidate in scored.iter_mut() {
            candidate.discovery = classify(candidate, user_context);
            candidate.reason = primary_reason(candidate, user_context);
        }
    }
}

/// Discovery classification from documented thresholds (see config).
///
/// - Safe: rating within SAFE_RATING_WINDOW of the user's average
///   accepted rating, and affinity boost at least SAFE_MIN_BOOST
/// - Adventure: semantic similarity dominates (>= ADVENTURE_MIN_SEMANTIC)
///   while affinity and rating history are sparse
/// - Stretch: everything else
fn classify(candidate: &ScoredCandidate, user_context: &UserContext) -> DiscoveryFactor {
    if let Some(avg) = user_context.avg_accepted_rating
        && (candidate.movie.rating - avg).abs() <= SAFE_RATING_WINDOW
        && candidate.affinity_boost >= SAFE_MIN_BOOST
    {
        return DiscoveryFactor::Safe;
    }

    let history_sparse = user_context.affinities.len() <= SPARSE_AFFINITY_MAX
        && user_context.avg_accepted_rating.is_none();
    if candidate.semantic_score >= ADVENTURE_MIN_SEMANTIC
        && candidate.affinity_boost <= ADVENTURE_MAX_BOOST
        && history_sparse
    {
        return DiscoveryFactor::Adventure;
    }

    DiscoveryFactor::Stretch
}

/// The single strongest signal, phrased for the user.
fn primary_reason(candidate: &ScoredCandidate, user_context: &UserContext) -> String {
    if candidate.affinity_boost > 0.0
        && let Some((genre, strength)) = strongest_matched_genre(candidate, user_context)
    {
        return format!(
            "Matches your taste for genre #{} (strength {:.2})",
            genre, strength
        );
    }

    if candidate.has_category(MatchCategory::SemanticMatch) {
        return match &user_context.query {
            Some(query) => format!("Close match for \"{}\"", query),
            None => "Close match to your taste profile".to_string(),
        };
    }

    if candidate.movie.rating >= HIGH_RATING_MIN {
        return format!("Highly rated ({:.1}/10)", candidate.movie.rating);
    }

    format!("Rated {:.1}/10 overall", candidate.movie.rating)
}

/// The candidate genre with the highest affinity strength, if any of its
/// genres appear in the user's affinity map.
fn strongest_matched_genre(
    candidate: &ScoredCandidate,
    user_context: &UserContext,
) -> Option<(GenreId, f32)> {
    candidate
        .movie
        .genres
        .iter()
        .filter_map(|g| user_context.affinities.get(g).map(|s| (*g, *s)))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::CandidateMovie;

    fn scored(genres: Vec<GenreId>, rating: f32) -> ScoredCandidate {
        ScoredCandidate::new(CandidateMovie {
            id: 1,
            title: "Test Movie".to_string(),
            year: Some(2010),
            genres,
            overview: String::new(),
            rating,
            popularity: None,
        })
    }

    #[test]
    fn test_safe_requires_rating_window_and_boost() {
        let mut user_context = UserContext::new("u1".to_string());
        user_context.avg_accepted_rating = Some(7.0);
        user_context.affinities.insert(1, 0.9);

        let mut candidate = scored(vec![1], 7.5);
        candidate.affinity_boost = 0.2;
        assert_eq!(classify(&candidate, &user_context), DiscoveryFactor::Safe);

        // Rating too far from the accepted baseline
        let mut candidate = scored(vec![1], 9.5);
        candidate.affinity_boost = 0.2;
        assert_eq!(classify(&candidate, &user_context), DiscoveryFactor::Stretch);

        // Boost below the safe threshold
        let mut candidate = scored(vec![1], 7.5);
        candidate.affinity_boost = 0.1;
        assert_eq!(classify(&candidate, &user_context), DiscoveryFactor::Stretch);
    }

    #[test]
    fn test_adventure_requires_semantic_dominance_and_sparse_history() {
        let user_context = UserContext::new("u1".to_string());

        let mut candidate = scored(vec![1], 6.0);
        candidate.semantic_score = 0.8;
        candidate.affinity_boost = 0.0;
        assert_eq!(classify(&candidate, &user_context), DiscoveryFactor::Adventure);

        // Heavy affinity history disqualifies adventure
        let mut rich_context = UserContext::new("u1".to_string());
        for genre in 0..5u16 {
            rich_context.affinities.insert(genre, 0.5);
        }
        assert_eq!(classify(&candidate, &rich_context), DiscoveryFactor::Stretch);

        // Weak semantic score stays stretch
        candidate.semantic_score = 0.5;
        assert_eq!(classify(&candidate, &user_context), DiscoveryFactor::Stretch);
    }

    #[test]
    fn test_reason_names_only_matched_genres() {
        let mut user_context = UserContext::new("u1".to_string());
        user_context.affinities.insert(3, 0.4);
        user_context.affinities.insert(7, 0.9);
        // Genre 9 is on the movie but has no affinity entry

        let mut candidate = scored(vec![3, 7, 9], 6.0);
        candidate.affinity_boost = 0.16;

        let mut candidates = vec![candidate];
        ExplanationGenerator.annotate(&mut candidates, &user_context);

        // Strongest matched genre is 7; 9 must never be named
        assert_eq!(
            candidates[0].reason,
            "Matches your taste for genre #7 (strength 0.90)"
        );
    }

    #[test]
    fn test_reason_quotes_query_on_semantic_match() {
        let mut user_context = UserContext::new("u1".to_string());
        user_context.query = Some("space heist".to_string());

        let mut candidate = scored(vec![1], 6.0);
        candidate.semantic_score = 0.8;
        candidate.categories.push(MatchCategory::SemanticMatch);

        let mut candidates = vec![candidate];
        ExplanationGenerator.annotate(&mut candidates, &user_context);
        assert_eq!(candidates[0].reason, "Close match for \"space heist\"");
    }

    #[test]
    fn test_fallback_reason_uses_candidate_rating() {
        let user_context = UserContext::new("u1".to_string());

        let mut candidates = vec![scored(vec![], 8.4)];
        ExplanationGenerator.annotate(&mut candidates, &user_context);
        assert_eq!(candidates[0].reason, "Highly rated (8.4/10)");

        let mut candidates = vec![scored(vec![], 6.2)];
        ExplanationGenerator.annotate(&mut candidates, &user_context);
        assert_eq!(candidates[0].reason, "Rated 6.2/10 overall");
    }

    #[test]
    fn test_every_candidate_gets_reason_and_discovery() {
        let user_context = UserContext::new("u1".to_string());
        let mut candidates = vec![scored(vec![1], 5.0), scored(vec![2], 9.0)];
        ExplanationGenerator.annotate(&mut candidates, &user_context);
        for c in &candidates {
            assert!(!c.reason.is_empty());
        }
    }
}
