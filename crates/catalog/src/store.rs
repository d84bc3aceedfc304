//! In-memory reference implementation of every collaborator contract.
//!
//! `CatalogIndex` is the heart of this crate: a catalog of movies with a
//! genre secondary index, per-movie embeddings, and per-user affinity and
//! taste data. Tests, benchmarks, and the CLI run the whole engine
//! against it, hermetically and deterministically.
//!
//! The built-in text embedder is a hashed bag-of-words stand-in for the
//! external embedding service: cheap, deterministic, and good enough for
//! relative similarity between short texts.

use crate::error::{CollaboratorError, Result};
use crate::traits::{AffinityStore, ContentStore, EmbeddingService, InteractionSink};
use crate::types::{
    CandidateFilter, CandidateMovie, EMBEDDING_DIM, Embedding, GenreId, InteractionKind, MovieId,
    TasteVectors, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// On-disk catalog format loaded by [`CatalogIndex::load_from_json`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub movies: Vec<CandidateMovie>,
    /// Per-user genre affinities, each strength in [0,1]
    #[serde(default)]
    pub affinities: HashMap<UserId, HashMap<GenreId, f32>>,
    /// Per-user stored taste vectors
    #[serde(default)]
    pub taste: HashMap<UserId, TasteVectors>,
}

/// In-memory catalog with secondary indices.
///
/// Getters return borrowed data; mutators are used while seeding. Call
/// [`CatalogIndex::compute_embeddings`] after manual inserts so every
/// movie has an overview embedding (mirrors how an external embedding
/// service backfills vectors).
#[derive(Debug, Default)]
pub struct CatalogIndex {
    movies: HashMap<MovieId, CandidateMovie>,
    /// Movies grouped by genre (one movie can appear in several lists)
    genre_index: HashMap<GenreId, Vec<MovieId>>,
    /// Overview embeddings, keyed by movie
    embeddings: HashMap<MovieId, Embedding>,
    /// Learned genre affinities per user
    affinities: HashMap<UserId, HashMap<GenreId, f32>>,
    /// Stored taste vectors per user
    taste: HashMap<UserId, TasteVectors>,
    /// Interactions recorded through the sink (inspectable in tests)
    interactions: Mutex<Vec<(UserId, MovieId, InteractionKind)>>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file and compute missing embeddings.
    pub fn load_from_json(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut index = Self::new();
        for movie in file.movies {
            index.insert_movie(movie);
        }
        for (user, map) in file.affinities {
            index.set_affinities(user, map);
        }
        for (user, vectors) in file.taste {
            index.set_taste_vectors(user, vectors);
        }
        index.compute_embeddings();

        let (movies, users) = index.counts();
        debug!("Loaded catalog: {} movies, {} users with affinities", movies, users);
        Ok(index)
    }

    // Mutators - used while seeding the index

    /// Insert a movie and update the genre index.
    pub fn insert_movie(&mut self, movie: CandidateMovie) {
        for &genre in &movie.genres {
            self.genre_index.entry(genre).or_default().push(movie.id);
        }
        self.movies.insert(movie.id, movie);
    }

    /// Attach a precomputed embedding to a movie.
    pub fn insert_embedding(&mut self, movie_id: MovieId, embedding: Embedding) {
        self.embeddings.insert(movie_id, embedding);
    }

    /// Replace a user's genre affinity map.
    pub fn set_affinities(&mut self, user_id: UserId, affinities: HashMap<GenreId, f32>) {
        self.affinities.insert(user_id, affinities);
    }

    /// Replace a user's stored taste vectors.
    pub fn set_taste_vectors(&mut self, user_id: UserId, vectors: TasteVectors) {
        self.taste.insert(user_id, vectors);
    }

    /// Embed title + overview for every movie that has no embedding yet.
    pub fn compute_embeddings(&mut self) {
        for (id, movie) in &self.movies {
            if !self.embeddings.contains_key(id) {
                let text = format!("{} {}", movie.title, movie.overview);
                self.embeddings.insert(*id, hashed_embedding(&text));
            }
        }
    }

    // Getters

    pub fn get_movie(&self, id: MovieId) -> Option<&CandidateMovie> {
        self.movies.get(&id)
    }

    pub fn movies_by_genre(&self, genre: GenreId) -> &[MovieId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// (movie count, count of users with affinity data)
    pub fn counts(&self) -> (usize, usize) {
        (self.movies.len(), self.affinities.len())
    }

    /// Interactions recorded so far, oldest first.
    pub fn recorded_interactions(&self) -> Vec<(UserId, MovieId, InteractionKind)> {
        self.interactions.lock().expect("interaction log poisoned").clone()
    }

    /// Candidate retrieval backing `ContentStore::fetch_candidates`.
    ///
    /// ## Algorithm
    /// 1. Genre filter: any-match against the movie's genre list
    /// 2. Query filter: every query token must appear in title or overview
    /// 3. Order by popularity desc, then rating desc, then id asc so the
    ///    result is fully deterministic
    /// 4. Truncate to the filter's fetch limit
    fn select_candidates(&self, filter: &CandidateFilter) -> Vec<CandidateMovie> {
        let tokens: Vec<String> = filter
            .query
            .as_deref()
            .map(tokenize)
            .unwrap_or_default();

        let mut selected: Vec<&CandidateMovie> = self
            .movies
            .values()
            .filter(|movie| {
                filter.genres.is_empty()
                    || movie.genres.iter().any(|g| filter.genres.contains(g))
            })
            .filter(|movie| {
                if tokens.is_empty() {
                    return true;
                }
                let haystack =
                    format!("{} {}", movie.title, movie.overview).to_lowercase();
                tokens.iter().any(|t| haystack.contains(t))
            })
            .collect();

        selected.sort_by(|a, b| {
            b.popularity
                .unwrap_or(0)
                .cmp(&a.popularity.unwrap_or(0))
                .then_with(|| {
                    b.rating
                        .partial_cmp(&a.rating)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.id.cmp(&b.id))
        });

        let limit = if filter.fetch_limit == 0 {
            CandidateFilter::DEFAULT_FETCH_LIMIT
        } else {
            filter.fetch_limit
        };
        selected.truncate(limit);
        selected.into_iter().cloned().collect()
    }
}

#[async_trait]
impl ContentStore for CatalogIndex {
    async fn fetch_candidates(&self, filter: &CandidateFilter) -> Result<Vec<CandidateMovie>> {
        Ok(self.select_candidates(filter))
    }
}

#[async_trait]
impl AffinityStore for CatalogIndex {
    async fn fetch_user_affinities(&self, user_id: &UserId) -> Result<HashMap<GenreId, f32>> {
        // Cold start: no stored data is an empty map, not an error
        Ok(self.affinities.get(user_id).cloned().unwrap_or_default())
    }

    async fn fetch_taste_vectors(&self, user_id: &UserId) -> Result<Option<TasteVectors>> {
        Ok(self.taste.get(user_id).cloned())
    }
}

#[async_trait]
impl EmbeddingService for CatalogIndex {
    async fn embed_text(&self, text: &str) -> Result<Embedding> {
        if text.trim().is_empty() {
            return Err(CollaboratorError::Malformed {
                component: "embedding-service".to_string(),
                detail: "cannot embed empty text".to_string(),
            });
        }
        Ok(hashed_embedding(text))
    }

    async fn movie_embedding(&self, movie_id: MovieId) -> Result<Option<Embedding>> {
        Ok(self.embeddings.get(&movie_id).cloned())
    }
}

#[async_trait]
impl InteractionSink for CatalogIndex {
    async fn record_interaction(&self, user_id: &UserId, movie_id: MovieId, kind: InteractionKind) {
        self.interactions
            .lock()
            .expect("interaction log poisoned")
            .push((user_id.clone(), movie_id, kind));
    }
}

/// Lowercased alphanumeric tokens of a text.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Deterministic hashed bag-of-words embedding, L2-normalized.
///
/// Each token is FNV-1a hashed into one of `EMBEDDING_DIM` buckets.
/// Texts sharing tokens land in shared buckets, so cosine similarity
/// tracks word overlap.
pub fn hashed_embedding(text: &str) -> Embedding {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for token in tokenize(text) {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        vector[(hash % EMBEDDING_DIM as u64) as usize] += 1.0;
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, title: &str, genres: Vec<GenreId>, rating: f32, pop: u32) -> CandidateMovie {
        CandidateMovie {
            id,
            title: title.to_string(),
            year: Some(2010),
            genres,
            overview: format!("{} overview text", title),
            rating,
            popularity: Some(pop),
        }
    }

    fn seeded_index() -> CatalogIndex {
        let mut index = CatalogIndex::new();
        index.insert_movie(movie(1, "Space Heist", vec![1, 4], 8.2, 900));
        index.insert_movie(movie(2, "Quiet Drama", vec![2], 7.9, 500));
        index.insert_movie(movie(3, "Loud Action", vec![1], 6.1, 1200));
        index.insert_movie(movie(4, "Obscure Gem", vec![3], 9.0, 10));
        index.compute_embeddings();
        index
    }

    #[tokio::test]
    async fn test_popular_default_sorts_by_popularity() {
        let index = seeded_index();
        let candidates = index
            .fetch_candidates(&CandidateFilter::popular())
            .await
            .unwrap();

        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[0].id, 3, "most popular first");
        assert_eq!(candidates[1].id, 1);
    }

    #[tokio::test]
    async fn test_genre_filter_any_match() {
        let index = seeded_index();
        let filter = CandidateFilter {
            genres: vec![1],
            ..CandidateFilter::popular()
        };
        let candidates = index.fetch_candidates(&filter).await.unwrap();

        let ids: Vec<MovieId> = candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_query_filter_matches_title() {
        let index = seeded_index();
        let filter = CandidateFilter {
            query: Some("space heist".to_string()),
            ..CandidateFilter::popular()
        };
        let candidates = index.fetch_candidates(&filter).await.unwrap();

        assert!(candidates.iter().any(|c| c.id == 1));
        assert!(!candidates.iter().any(|c| c.id == 2));
    }

    #[tokio::test]
    async fn test_fetch_limit_truncates() {
        let index = seeded_index();
        let filter = CandidateFilter {
            fetch_limit: 2,
            ..CandidateFilter::popular()
        };
        let candidates = index.fetch_candidates(&filter).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_affinities_is_empty_not_error() {
        let index = seeded_index();
        let affinities = index
            .fetch_user_affinities(&"nobody".to_string())
            .await
            .unwrap();
        assert!(affinities.is_empty());
    }

    #[tokio::test]
    async fn test_movie_embedding_missing_is_none() {
        let mut index = seeded_index();
        index.insert_movie(movie(99, "No Vector Yet", vec![1], 5.0, 1));
        // Deliberately no compute_embeddings() call for movie 99
        assert!(index.movie_embedding(99).await.unwrap().is_none());
        assert!(index.movie_embedding(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_interaction_sink_records() {
        let index = seeded_index();
        index
            .record_interaction(&"u1".to_string(), 1, InteractionKind::Recommended)
            .await;
        let log = index.recorded_interactions();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, 1);
    }

    #[test]
    fn test_hashed_embedding_deterministic_and_normalized() {
        let a = hashed_embedding("a heist in space");
        let b = hashed_embedding("a heist in space");
        assert_eq!(a, b);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_hashed_embedding_overlap_beats_disjoint() {
        let query = hashed_embedding("space heist crew");
        let close = hashed_embedding("a heist crew in deep space");
        let far = hashed_embedding("quiet countryside romance");

        let dot = |a: &Embedding, b: &Embedding| -> f32 {
            a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
        };
        assert!(dot(&query, &close) > dot(&query, &far));
    }

    #[test]
    fn test_embed_empty_text_is_malformed() {
        // Sync check through the error constructor path
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let index = seeded_index();
        let result = rt.block_on(index.embed_text("   "));
        assert!(matches!(
            result,
            Err(CollaboratorError::Malformed { .. })
        ));
    }
}
