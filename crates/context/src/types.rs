//! Request-scoped context and scored-candidate types.
//!
//! A `UserContext` is built fresh per request and never persisted;
//! `ScoredCandidate`s are created by the scoring pipeline and discarded
//! after the response is assembled.

use catalog::{CandidateMovie, EMBEDDING_DIM, Embedding, GenreId, UserId};
use serde::Serialize;
use std::collections::HashMap;

/// How much stored personalization data backs this context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextConfidence {
    /// Cold start: neutral vectors, empty affinity map
    Low,
    /// Real affinity or taste data was found for the user
    High,
}

/// Per-request snapshot of everything known about the user.
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: UserId,
    pub query: Option<String>,
    pub mood: Option<String>,
    /// Genres the caller explicitly asked for
    pub requested_genres: Vec<GenreId>,
    /// Embedding of declared tastes; zero-filled on cold start
    pub preference_vector: Embedding,
    /// Embedding derived from interaction history; zero-filled on cold start
    pub behavior_vector: Embedding,
    /// Learned strength per genre, each clipped to [0,1]
    pub affinities: HashMap<GenreId, f32>,
    /// Mean 0-10 rating of recommendations the user accepted
    pub avg_accepted_rating: Option<f32>,
    /// Embedding of the free-text query plus mood, when either was given
    pub query_embedding: Option<Embedding>,
    pub confidence: ContextConfidence,
}

impl UserContext {
    /// A cold-start context: zero vectors, empty affinities, low confidence.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            query: None,
            mood: None,
            requested_genres: Vec::new(),
            preference_vector: vec![0.0; EMBEDDING_DIM],
            behavior_vector: vec![0.0; EMBEDDING_DIM],
            affinities: HashMap::new(),
            avg_accepted_rating: None,
            query_embedding: None,
            confidence: ContextConfidence::Low,
        }
    }

    /// Combined embedding the semantic matcher compares candidates to:
    /// the element-wise mean of the query embedding and any non-zero
    /// stored vectors. `None` when no usable signal exists, in which case
    /// every candidate gets the neutral baseline similarity.
    pub fn context_embedding(&self) -> Option<Embedding> {
        let mut parts: Vec<&Embedding> = Vec::new();
        if let Some(q) = &self.query_embedding {
            parts.push(q);
        }
        if is_nonzero(&self.preference_vector) {
            parts.push(&self.preference_vector);
        }
        if is_nonzero(&self.behavior_vector) {
            parts.push(&self.behavior_vector);
        }
        if parts.is_empty() {
            return None;
        }

        let dim = parts[0].len();
        let mut combined = vec![0.0f32; dim];
        for part in &parts {
            for (acc, value) in combined.iter_mut().zip(part.iter()) {
                *acc += value;
            }
        }
        for value in &mut combined {
            *value /= parts.len() as f32;
        }
        Some(combined)
    }

    /// The user's strongest genres, ordered by strength descending with
    /// genre id as the deterministic tie-break.
    pub fn top_affinity_genres(&self, n: usize) -> Vec<GenreId> {
        let mut ranked: Vec<(GenreId, f32)> =
            self.affinities.iter().map(|(g, s)| (*g, *s)).collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(n);
        ranked.into_iter().map(|(g, _)| g).collect()
    }

    pub fn has_affinities(&self) -> bool {
        !self.affinities.is_empty()
    }
}

fn is_nonzero(vector: &Embedding) -> bool {
    vector.iter().any(|v| *v != 0.0)
}

/// Tags explaining which signals matched a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchCategory {
    /// Semantic similarity to the context embedding was above threshold
    SemanticMatch,
    /// The candidate shares a genre with the request's genre filter
    GenreMatch,
    /// The candidate matched a learned affinity from the memory store
    MemoryMatch,
    /// The embedding service had no vector for this candidate
    EmbeddingMissing,
    /// No usable context embedding existed; neutral baseline was used
    ColdStart,
}

/// How far a recommendation sits from the user's established taste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryFactor {
    Safe,
    Stretch,
    Adventure,
}

/// A candidate movie augmented with everything the pipeline computed.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub movie: CandidateMovie,
    /// Semantic similarity in [0,1]
    pub semantic_score: f32,
    /// Additive affinity boost in [0, MAX_BOOST]
    pub affinity_boost: f32,
    /// Combined confidence in [0,1]; deterministic given the inputs
    pub confidence: f32,
    pub categories: Vec<MatchCategory>,
    /// Primary human-readable reason for surfacing this candidate
    pub reason: String,
    pub discovery: DiscoveryFactor,
}

impl ScoredCandidate {
    /// Wrap a candidate before any stage has run.
    pub fn new(movie: CandidateMovie) -> Self {
        Self {
            movie,
            semantic_score: 0.0,
            affinity_boost: 0.0,
            confidence: 0.0,
            categories: Vec::new(),
            reason: String::new(),
            discovery: DiscoveryFactor::Stretch,
        }
    }

    pub fn has_category(&self, category: MatchCategory) -> bool {
        self.categories.contains(&category)
    }
}
