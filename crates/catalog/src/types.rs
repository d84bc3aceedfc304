//! Core domain types for the recommendation engine.
//!
//! This module defines the data structures shared across the whole
//! pipeline: candidate movies, embeddings, stored taste data, and the
//! filter used to ask the content store for candidates.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up movie ids with genre ids

/// Unique identifier for a movie in the content store
pub type MovieId = u32;

/// Small integer identifier for a genre (assigned by the content store)
pub type GenreId = u16;

/// Unique identifier for a user. Opaque to the engine; an empty string is
/// the one invalid value (see `engine::RecommendError::InvalidRequest`).
pub type UserId = String;

/// A fixed-length numeric embedding.
pub type Embedding = Vec<f32>;

/// Dimension of every embedding handled by the reference store.
///
/// External embedding services may use larger vectors; the engine only
/// requires that context and candidate vectors share a dimension.
pub const EMBEDDING_DIM: usize = 64;

// =============================================================================
// Candidate Movie
// =============================================================================

/// A content item under consideration for a single scoring pass.
///
/// Owned by the external content store; the engine takes it by value and
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMovie {
    pub id: MovieId,
    pub title: String,
    /// Release year, when the content store knows it
    pub year: Option<u16>,
    /// Genre identifiers; the first entry is the primary genre
    pub genres: Vec<GenreId>,
    /// Plot/overview text used for embedding
    pub overview: String,
    /// Quality rating on a 0-10 scale
    pub rating: f32,
    /// Interaction count, when the content store tracks popularity
    pub popularity: Option<u32>,
}

impl CandidateMovie {
    /// The genre used for diversity capping: the first genre id, if any.
    pub fn primary_genre(&self) -> Option<GenreId> {
        self.genres.first().copied()
    }
}

// =============================================================================
// Stored Personalization Data
// =============================================================================

/// Embeddings the memory store has learned for a user, plus the average
/// rating of titles the user accepted. Absent for cold-start users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasteVectors {
    /// Embedding of the user's declared tastes
    pub preference: Embedding,
    /// Embedding derived from interaction history
    pub behavior: Embedding,
    /// Mean 0-10 rating of accepted recommendations, if any were accepted
    pub avg_accepted_rating: Option<f32>,
}

// =============================================================================
// Candidate Retrieval
// =============================================================================

/// What to ask the content store for.
///
/// With neither a query nor genres, the store falls back to its
/// popular/trending default set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    /// Free-text query matched against title and overview
    pub query: Option<String>,
    /// Restrict candidates to these genres (any-match)
    pub genres: Vec<GenreId>,
    /// Upper bound on how many candidates the store should return
    pub fetch_limit: usize,
}

impl CandidateFilter {
    /// Default number of candidates to pull per strategy run.
    ///
    /// Deliberately larger than any result limit so the diversity ranker
    /// sees the full set before truncation.
    pub const DEFAULT_FETCH_LIMIT: usize = 200;

    pub fn popular() -> Self {
        Self {
            query: None,
            genres: Vec::new(),
            fetch_limit: Self::DEFAULT_FETCH_LIMIT,
        }
    }
}

// =============================================================================
// Interaction Events
// =============================================================================

/// Interaction kinds recorded through the write-only sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionKind {
    /// The engine surfaced this movie in a result set
    Recommended,
    /// The user accepted (watched/saved) the recommendation
    Accepted,
    /// The user dismissed the recommendation
    Dismissed,
}
