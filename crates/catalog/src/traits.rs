//! Collaborator contracts consumed by the engine.
//!
//! The engine never talks to a database, a vector index, or an embedding
//! model directly; it goes through these traits. Production wires them to
//! real services, tests and the CLI use the in-memory [`CatalogIndex`]
//! implementation from this crate.
//!
//! ## Design Note
//! - `Send + Sync` so stores can be shared across concurrent requests
//!   behind an `Arc<dyn ...>`
//! - Calls are `async` because every one of them crosses an I/O boundary
//!   in production; the engine awaits a single best-effort result per call
//!   and degrades on failure
//!
//! [`CatalogIndex`]: crate::store::CatalogIndex

use crate::error::Result;
use crate::types::{
    CandidateFilter, CandidateMovie, Embedding, GenreId, InteractionKind, MovieId, TasteVectors,
    UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Content store: the source of candidate movies.
///
/// The one collaborator whose failure is fatal — with no candidates there
/// is nothing to rank.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch candidates by query, genre filter, or the popular/trending
    /// default when the filter is empty.
    async fn fetch_candidates(&self, filter: &CandidateFilter) -> Result<Vec<CandidateMovie>>;
}

/// Memory/affinity store: learned per-user preference data.
#[async_trait]
pub trait AffinityStore: Send + Sync {
    /// Learned strength-of-preference per genre, each in [0,1].
    ///
    /// An empty map is the normal cold-start answer, not an error.
    async fn fetch_user_affinities(&self, user_id: &UserId) -> Result<HashMap<GenreId, f32>>;

    /// Stored preference/behavior embeddings and the accepted-rating
    /// baseline, or `None` when the user has no personalization data yet.
    async fn fetch_taste_vectors(&self, user_id: &UserId) -> Result<Option<TasteVectors>>;
}

/// Embedding service: text and per-movie vectors.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed free text (query plus mood) into the shared vector space.
    async fn embed_text(&self, text: &str) -> Result<Embedding>;

    /// Embedding for a movie's overview, or `None` when the service has
    /// not computed one yet. A missing embedding is tolerated downstream.
    async fn movie_embedding(&self, movie_id: MovieId) -> Result<Option<Embedding>>;
}

/// Write-only interaction sink, fire-and-forget from the engine's side.
#[async_trait]
pub trait InteractionSink: Send + Sync {
    async fn record_interaction(&self, user_id: &UserId, movie_id: MovieId, kind: InteractionKind);
}
