//! Builds a UserContext from the memory store and embedding service.
//!
//! The builder gathers everything the pipeline needs up front so the
//! scoring stages stay pure: affinities, stored taste vectors, and the
//! embedded query text. Every collaborator failure here degrades to a
//! neutral default and is reported back to the orchestrator, which
//! surfaces it under `metadata.errors` — a missing memory store must
//! never abort a recommendation request.

use crate::types::{ContextConfidence, UserContext};
use catalog::error::CollaboratorError;
use catalog::{AffinityStore, EmbeddingService, GenreId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A context plus the collaborator failures absorbed while building it.
#[derive(Debug)]
pub struct BuiltContext {
    pub context: UserContext,
    pub failures: Vec<CollaboratorError>,
}

/// Aggregates per-user signals into a [`UserContext`].
#[derive(Clone)]
pub struct ContextBuilder {
    memory: Arc<dyn AffinityStore>,
    embeddings: Arc<dyn EmbeddingService>,
}

impl ContextBuilder {
    pub fn new(memory: Arc<dyn AffinityStore>, embeddings: Arc<dyn EmbeddingService>) -> Self {
        Self { memory, embeddings }
    }

    /// Build a context for one request.
    ///
    /// ## Algorithm
    /// 1. Read the affinity map; clip strengths to [0,1], drop non-finite
    ///    entries; an empty map is the normal cold-start answer
    /// 2. Read stored taste vectors; fall back to zero-filled vectors
    /// 3. Embed `query` plus `mood` when either is present
    /// 4. Confidence is High only when real personalization data exists
    #[instrument(skip(self, query, mood, genres), fields(user_id = %user_id))]
    pub async fn build(
        &self,
        user_id: &UserId,
        query: Option<&str>,
        mood: Option<&str>,
        genres: &[GenreId],
    ) -> BuiltContext {
        let mut context = UserContext::new(user_id.clone());
        context.query = query.map(str::to_string);
        context.mood = mood.map(str::to_string);
        context.requested_genres = genres.to_vec();

        let mut failures = Vec::new();

        match self.memory.fetch_user_affinities(user_id).await {
            Ok(raw) => {
                context.affinities = sanitize_affinities(raw);
                debug!(
                    "Loaded {} affinity entries for user {}",
                    context.affinities.len(),
                    user_id
                );
            }
            Err(err) => {
                warn!("Affinity read failed for user {}: {}", user_id, err);
                failures.push(err);
            }
        }

        match self.memory.fetch_taste_vectors(user_id).await {
            Ok(Some(taste)) => {
                context.preference_vector = taste.preference;
                context.behavior_vector = taste.behavior;
                context.avg_accepted_rating = taste.avg_accepted_rating;
            }
            Ok(None) => {
                // Cold start: keep the zero-filled defaults
            }
            Err(err) => {
                warn!("Taste-vector read failed for user {}: {}", user_id, err);
                failures.push(err);
            }
        }

        if let Some(text) = embedding_text(query, mood) {
            match self.embeddings.embed_text(&text).await {
                Ok(vector) => context.query_embedding = Some(vector),
                Err(err) => {
                    warn!("Query embedding failed for user {}: {}", user_id, err);
                    failures.push(err);
                }
            }
        }

        context.confidence = if context.has_affinities()
            || context.avg_accepted_rating.is_some()
            || context
                .preference_vector
                .iter()
                .chain(context.behavior_vector.iter())
                .any(|v| *v != 0.0)
        {
            ContextConfidence::High
        } else {
            ContextConfidence::Low
        };

        BuiltContext { context, failures }
    }
}

/// Clip strengths to [0,1] and drop entries that are not finite numbers.
fn sanitize_affinities(raw: HashMap<GenreId, f32>) -> HashMap<GenreId, f32> {
    raw.into_iter()
        .filter(|(_, strength)| strength.is_finite())
        .map(|(genre, strength)| (genre, strength.clamp(0.0, 1.0)))
        .collect()
}

/// Text handed to the embedding service: the query, with the mood label
/// folded in when present.
fn embedding_text(query: Option<&str>, mood: Option<&str>) -> Option<String> {
    match (query, mood) {
        (Some(q), Some(m)) => Some(format!("{} mood: {}", q, m)),
        (Some(q), None) => Some(q.to_string()),
        (None, Some(m)) => Some(format!("mood: {}", m)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog::error::Result;
    use catalog::{CatalogIndex, Embedding, MovieId, TasteVectors};

    /// Memory store that fails every call, for degradation tests.
    struct DownStore;

    #[async_trait]
    impl AffinityStore for DownStore {
        async fn fetch_user_affinities(&self, _user_id: &UserId) -> Result<HashMap<GenreId, f32>> {
            Err(CollaboratorError::unavailable("affinity-store", "down"))
        }

        async fn fetch_taste_vectors(&self, _user_id: &UserId) -> Result<Option<TasteVectors>> {
            Err(CollaboratorError::unavailable("affinity-store", "down"))
        }
    }

    #[async_trait]
    impl EmbeddingService for DownStore {
        async fn embed_text(&self, _text: &str) -> Result<Embedding> {
            Err(CollaboratorError::unavailable("embedding-service", "down"))
        }

        async fn movie_embedding(&self, _movie_id: MovieId) -> Result<Option<Embedding>> {
            Err(CollaboratorError::unavailable("embedding-service", "down"))
        }
    }

    fn index_with_user() -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();
        let mut affinities = HashMap::new();
        affinities.insert(1u16, 0.9f32);
        affinities.insert(2u16, 1.7f32); // out of range, must be clipped
        affinities.insert(3u16, f32::NAN); // malformed, must be dropped
        index.set_affinities("u1".to_string(), affinities);
        Arc::new(index)
    }

    #[tokio::test]
    async fn test_affinities_clipped_and_sanitized() {
        let index = index_with_user();
        let builder = ContextBuilder::new(index.clone(), index);
        let built = builder.build(&"u1".to_string(), None, None, &[]).await;

        let context = built.context;
        assert_eq!(context.affinities.len(), 2);
        assert_eq!(context.affinities[&1], 0.9);
        assert_eq!(context.affinities[&2], 1.0, "strength clipped to 1.0");
        assert_eq!(context.confidence, ContextConfidence::High);
        assert!(built.failures.is_empty());
    }

    #[tokio::test]
    async fn test_cold_start_is_not_an_error() {
        let index = Arc::new(CatalogIndex::new());
        let builder = ContextBuilder::new(index.clone(), index);
        let built = builder.build(&"stranger".to_string(), None, None, &[]).await;

        let context = built.context;
        assert!(context.affinities.is_empty());
        assert!(context.preference_vector.iter().all(|v| *v == 0.0));
        assert_eq!(context.confidence, ContextConfidence::Low);
        assert!(built.failures.is_empty());
    }

    #[tokio::test]
    async fn test_memory_store_failure_degrades_gracefully() {
        let down = Arc::new(DownStore);
        let builder = ContextBuilder::new(down.clone(), down);
        let built = builder
            .build(&"u1".to_string(), Some("space heist"), None, &[])
            .await;

        // Still produces a usable cold-start context
        assert!(built.context.affinities.is_empty());
        assert!(built.context.query_embedding.is_none());
        assert_eq!(built.context.confidence, ContextConfidence::Low);

        // But the failures are reported: affinities, taste, embedding
        assert_eq!(built.failures.len(), 3);
    }

    #[tokio::test]
    async fn test_query_and_mood_are_embedded() {
        let mut index = CatalogIndex::new();
        index.compute_embeddings();
        let index = Arc::new(index);
        let builder = ContextBuilder::new(index.clone(), index);

        let built = builder
            .build(&"u1".to_string(), Some("heist"), Some("tense"), &[])
            .await;
        assert!(built.context.query_embedding.is_some());
        assert_eq!(built.context.query.as_deref(), Some("heist"));
        assert_eq!(built.context.mood.as_deref(), Some("tense"));
    }

    #[tokio::test]
    async fn test_no_query_no_mood_skips_embedding_call() {
        let down = Arc::new(DownStore);
        let index = Arc::new(CatalogIndex::new());
        // Working memory store, broken embedding service: with no query
        // the embedding service is never called, so no failure appears
        let builder = ContextBuilder::new(index, down);
        let built = builder.build(&"u1".to_string(), None, None, &[]).await;
        assert!(built.failures.is_empty());
    }

    #[test]
    fn test_embedding_text_folds_mood() {
        assert_eq!(
            embedding_text(Some("heist"), Some("tense")).as_deref(),
            Some("heist mood: tense")
        );
        assert_eq!(embedding_text(None, Some("cozy")).as_deref(), Some("mood: cozy"));
        assert_eq!(embedding_text(None, None), None);
    }
}
