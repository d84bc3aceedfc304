//! The RecommendationEngine orchestrates one request end to end.
//!
//! This module wires the asynchronous collaborators (content store,
//! memory store, embedding service, interaction sink) to the pure
//! scoring pipeline. Collaborator failures degrade into
//! `metadata.errors`; only an invalid user id or an empty candidate set
//! aborts the request.

use crate::error::{RecommendError, Result};
use crate::request::{
    HYBRID_PRIMARY_WEIGHT, HYBRID_SECONDARY_WEIGHT, NormalizedRequest, RecommendationRequest,
    Strategy, StrategyProfile,
};
use crate::result::{RecommendationResult, ResultMetadata};
use catalog::{
    AffinityStore, CandidateFilter, ContentStore, Embedding, EmbeddingService, InteractionKind,
    InteractionSink, MovieId,
};
use context::{BuiltContext, ContextBuilder, ScoredCandidate, UserContext};
use scoring::{
    AffinityBooster, DiversityRanker, ExplanationGenerator, ScoringConfig, SemanticMatcher,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How many top affinity genres seed the candidate filter for
/// affinity-driven strategies when the caller gave no genre filter.
const AFFINITY_SEED_GENRES: usize = 3;

/// The scored output of one single-strategy run, before ranking.
struct StrategyRun {
    scored: Vec<ScoredCandidate>,
    errors: BTreeMap<String, String>,
}

/// Orchestrates context building, candidate fetching, scoring, and
/// ranking across the available strategies.
///
/// ## Usage
/// ```ignore
/// let engine = RecommendationEngine::new(content, memory, embeddings, interactions);
/// let request = RecommendationRequest::new("user-42").with_query("space heist");
/// let result = engine.generate_recommendations(&request).await?;
/// ```
pub struct RecommendationEngine {
    content: Arc<dyn ContentStore>,
    memory: Arc<dyn AffinityStore>,
    embeddings: Arc<dyn EmbeddingService>,
    interactions: Arc<dyn InteractionSink>,
}

impl RecommendationEngine {
    pub fn new(
        content: Arc<dyn ContentStore>,
        memory: Arc<dyn AffinityStore>,
        embeddings: Arc<dyn EmbeddingService>,
        interactions: Arc<dyn InteractionSink>,
    ) -> Self {
        Self {
            content,
            memory,
            embeddings,
            interactions,
        }
    }

    /// Generate recommendations for one request.
    ///
    /// ## Algorithm
    /// 1. Reject an empty user id, then normalize the request
    /// 2. Hybrid: run smart + behavioral concurrently and merge;
    ///    any other strategy runs once
    /// 3. Rank with the diversity cap, truncate to the limit
    /// 4. Record a `Recommended` interaction per surfaced movie
    ///
    /// # Returns
    /// * `Ok(RecommendationResult)` - ranked movies plus metadata; any
    ///   absorbed collaborator failures appear under `metadata.errors`
    /// * `Err(RecommendError::InvalidRequest)` - empty user id
    /// * `Err(RecommendError::NoCandidates)` - the content store failed
    ///   or returned nothing
    pub async fn generate_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult> {
        if request.user_id.trim().is_empty() {
            return Err(RecommendError::InvalidRequest(
                "user id must not be empty".to_string(),
            ));
        }
        let normalized = request.normalize();
        info!(
            user_id = %normalized.user_id,
            strategy = normalized.strategy.as_str(),
            limit = normalized.limit,
            "Generating recommendations"
        );

        match normalized.strategy {
            Strategy::Hybrid => self.run_hybrid(&normalized).await,
            single => {
                let run = self.run_strategy(single, &normalized).await?;
                Ok(self.finalize(run.scored, run.errors, single.as_str().to_string(), &normalized))
            }
        }
    }

    /// Run smart and behavioral concurrently and merge their results.
    ///
    /// If exactly one sub-strategy fails the other's result is served
    /// alone, with the failure recorded; both failing is fatal.
    async fn run_hybrid(&self, request: &NormalizedRequest) -> Result<RecommendationResult> {
        let (primary, secondary) = tokio::join!(
            self.run_strategy(Strategy::Smart, request),
            self.run_strategy(Strategy::Behavioral, request),
        );

        let (scored, errors) = match (primary, secondary) {
            (Ok(primary), Ok(secondary)) => {
                let mut errors = primary.errors;
                errors.extend(secondary.errors);
                (merge_runs(primary.scored, secondary.scored), errors)
            }
            (Ok(primary), Err(err)) => {
                warn!("Behavioral sub-strategy failed, serving smart alone: {}", err);
                let mut errors = primary.errors;
                errors.insert("behavioral".to_string(), err.to_string());
                (primary.scored, errors)
            }
            (Err(err), Ok(secondary)) => {
                warn!("Smart sub-strategy failed, serving behavioral alone: {}", err);
                let mut errors = secondary.errors;
                errors.insert("smart".to_string(), err.to_string());
                (secondary.scored, errors)
            }
            (Err(err), Err(_)) => return Err(err),
        };

        Ok(self.finalize(scored, errors, "hybrid(smart+behavioral)".to_string(), request))
    }

    /// One pass of the pipeline under a single strategy's profile.
    #[instrument(skip(self, request), fields(strategy = strategy.as_str(), user_id = %request.user_id))]
    async fn run_strategy(
        &self,
        strategy: Strategy,
        request: &NormalizedRequest,
    ) -> Result<StrategyRun> {
        let profile = strategy.profile();

        let builder = ContextBuilder::new(self.memory.clone(), self.embeddings.clone());
        let BuiltContext { context, failures } = builder
            .build(
                &request.user_id,
                request.query.as_deref(),
                request.mood.as_deref(),
                &request.genres,
            )
            .await;

        let mut errors: BTreeMap<String, String> = BTreeMap::new();
        for failure in failures {
            errors.insert(failure.component().to_string(), failure.to_string());
        }

        let filter = candidate_filter(request, &profile, &context);
        let candidates = self
            .content
            .fetch_candidates(&filter)
            .await
            .map_err(|err| RecommendError::NoCandidates(err.to_string()))?;
        if candidates.is_empty() {
            return Err(RecommendError::NoCandidates(format!(
                "content store returned no candidates for strategy '{}'",
                strategy.as_str()
            )));
        }
        debug!("Fetched {} candidates", candidates.len());

        // Candidate embeddings only matter when there is a context
        // embedding to compare against; skip the lookups on cold start
        let mut movie_embeddings: HashMap<MovieId, Embedding> = HashMap::new();
        if context.context_embedding().is_some() {
            for candidate in &candidates {
                match self.embeddings.movie_embedding(candidate.id).await {
                    Ok(Some(embedding)) => {
                        movie_embeddings.insert(candidate.id, embedding);
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!("Movie-embedding lookup failed: {}", err);
                        errors.insert(err.component().to_string(), err.to_string());
                        // Remaining candidates fall back to the neutral
                        // baseline via the embedding-missing path
                        break;
                    }
                }
            }
        }

        let config = ScoringConfig::with_weights(profile.semantic_weight, profile.rating_weight);
        let mut scored = SemanticMatcher::new(config).score(candidates, &movie_embeddings, &context);
        AffinityBooster::new(config).apply(&mut scored, &context);
        ExplanationGenerator.annotate(&mut scored, &context);

        Ok(StrategyRun { scored, errors })
    }

    /// Rank, truncate, assemble metadata, and record interactions.
    fn finalize(
        &self,
        scored: Vec<ScoredCandidate>,
        errors: BTreeMap<String, String>,
        source: String,
        request: &NormalizedRequest,
    ) -> RecommendationResult {
        let mut ranked = DiversityRanker.rank(scored, request.diversity_factor, request.limit);
        ranked.truncate(request.limit);

        let confidence = RecommendationResult::mean_confidence(&ranked);
        let diversity_score = DiversityRanker::diversity_score(&ranked);

        self.record_surfaced(&request.user_id, &ranked);

        info!(
            returned = ranked.len(),
            confidence, diversity_score, "Recommendations ready"
        );
        RecommendationResult {
            movies: ranked,
            metadata: ResultMetadata {
                source,
                confidence,
                diversity_score,
                errors,
            },
        }
    }

    /// Record a `Recommended` interaction per surfaced movie.
    /// Fire-and-forget: the response never waits on the sink.
    fn record_surfaced(&self, user_id: &str, ranked: &[ScoredCandidate]) {
        let sink = self.interactions.clone();
        let user_id = user_id.to_string();
        let movie_ids: Vec<MovieId> = ranked.iter().map(|c| c.movie.id).collect();
        tokio::spawn(async move {
            for movie_id in movie_ids {
                sink.record_interaction(&user_id, movie_id, InteractionKind::Recommended)
                    .await;
            }
        });
    }
}

/// The content-store filter for one strategy run.
///
/// Affinity-seeded strategies derive a genre filter from the user's top
/// affinities when the caller gave none; otherwise the request passes
/// through, falling back to the store's popular default set.
fn candidate_filter(
    request: &NormalizedRequest,
    profile: &StrategyProfile,
    context: &UserContext,
) -> CandidateFilter {
    let mut genres = request.genres.clone();
    if genres.is_empty() && profile.seed_from_affinities {
        genres = context.top_affinity_genres(AFFINITY_SEED_GENRES);
    }
    CandidateFilter {
        query: request.query.clone(),
        genres,
        fetch_limit: CandidateFilter::DEFAULT_FETCH_LIMIT,
    }
}

/// Union of two scored runs, keyed by movie id.
///
/// Movies found by both keep the primary run's annotations and blend
/// confidence with the hybrid weights; movies found by one keep their
/// confidence untouched. Order is first occurrence, primary run first.
fn merge_runs(
    primary: Vec<ScoredCandidate>,
    secondary: Vec<ScoredCandidate>,
) -> Vec<ScoredCandidate> {
    let mut merged = primary;
    let mut by_id: HashMap<MovieId, usize> = merged
        .iter()
        .enumerate()
        .map(|(index, candidate)| (candidate.movie.id, index))
        .collect();

    for candidate in secondary {
        match by_id.get(&candidate.movie.id) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.confidence = (existing.confidence * HYBRID_PRIMARY_WEIGHT
                    + candidate.confidence * HYBRID_SECONDARY_WEIGHT)
                    .clamp(0.0, 1.0);
                for category in candidate.categories {
                    if !existing.categories.contains(&category) {
                        existing.categories.push(category);
                    }
                }
            }
            None => {
                by_id.insert(candidate.movie.id, merged.len());
                merged.push(candidate);
            }
        }
    }
    merged
}
