//! End-to-end tests for the recommendation engine.
//!
//! These tests drive a realistic catalog through full requests and check
//! the complete response surface: ranking, metadata, serialization, and
//! strategy behavior working together.

use catalog::{
    CandidateMovie, CatalogIndex, EMBEDDING_DIM, GenreId, MovieId, TasteVectors, hashed_embedding,
};
use engine::{RecommendError, RecommendationEngine, RecommendationRequest};
use std::collections::HashMap;
use std::sync::Arc;

const ACTION: GenreId = 1;
const DRAMA: GenreId = 2;
const COMEDY: GenreId = 3;
const SCIFI: GenreId = 4;

fn movie(
    id: MovieId,
    title: &str,
    genres: Vec<GenreId>,
    rating: f32,
    popularity: u32,
    overview: &str,
) -> CandidateMovie {
    CandidateMovie {
        id,
        title: title.to_string(),
        year: Some(2000 + id as u16),
        genres,
        overview: overview.to_string(),
        rating,
        popularity: Some(popularity),
    }
}

/// A catalog with enough spread across genres that diversity ranking and
/// affinity seeding have something to work with.
fn build_catalog() -> Arc<CatalogIndex> {
    let mut index = CatalogIndex::new();

    index.insert_movie(movie(1, "Vault Breakers", vec![ACTION], 8.1, 200, "a heist crew cracks an orbital vault"));
    index.insert_movie(movie(2, "Iron Pursuit", vec![ACTION], 7.9, 190, "an action chase across three borders"));
    index.insert_movie(movie(3, "Last Stand Canyon", vec![ACTION], 7.4, 180, "action showdown in a desert canyon"));
    index.insert_movie(movie(4, "Quiet Rivers", vec![DRAMA], 8.3, 170, "a slow family drama by the river"));
    index.insert_movie(movie(5, "Deep Currents", vec![DRAMA], 8.0, 160, "a drama about grief and recovery"));
    index.insert_movie(movie(6, "Laugh Track", vec![COMEDY], 6.8, 150, "a comedy troupe tours small towns"));
    index.insert_movie(movie(7, "Orbit Comedy", vec![COMEDY, SCIFI], 7.1, 140, "a comedy heist set on a space station"));
    index.insert_movie(movie(8, "Signal Lost", vec![SCIFI], 7.7, 130, "a space crew loses contact with home"));
    index.insert_movie(movie(9, "Beyond the Belt", vec![SCIFI, ACTION], 7.6, 120, "space miners fight over an asteroid claim"));
    index.insert_movie(movie(10, "Second Act", vec![DRAMA, COMEDY], 7.2, 110, "a washed-up comedian starts over"));
    index.compute_embeddings();

    let mut affinities = HashMap::new();
    affinities.insert(ACTION, 0.85f32);
    affinities.insert(SCIFI, 0.6f32);
    index.set_affinities("veteran".to_string(), affinities);
    index.set_taste_vectors(
        "veteran".to_string(),
        TasteVectors {
            preference: hashed_embedding("space action heist"),
            behavior: vec![0.0; EMBEDDING_DIM],
            avg_accepted_rating: Some(7.7),
        },
    );

    Arc::new(index)
}

fn build_engine(index: Arc<CatalogIndex>) -> RecommendationEngine {
    RecommendationEngine::new(index.clone(), index.clone(), index.clone(), index)
}

#[tokio::test]
async fn test_established_user_full_response() {
    let engine = build_engine(build_catalog());
    let request = RecommendationRequest::new("veteran")
        .with_query("space heist")
        .with_limit(5);

    let result = engine.generate_recommendations(&request).await.unwrap();

    assert!(!result.movies.is_empty());
    assert!(result.movies.len() <= 5);
    assert!(result.metadata.errors.is_empty());
    assert_eq!(result.metadata.source, "smart");

    // Confidence is sorted descending apart from diversity deferrals;
    // the top pick always carries the highest confidence
    let top = result.movies[0].confidence;
    assert!(result.movies.iter().all(|m| m.confidence <= top));

    for candidate in &result.movies {
        assert!((0.0..=1.0).contains(&candidate.confidence));
        assert!(!candidate.reason.is_empty());
    }
}

#[tokio::test]
async fn test_all_strategies_succeed_for_both_user_kinds() {
    let engine = build_engine(build_catalog());
    for user in ["veteran", "newcomer"] {
        for strategy in ["smart", "behavioral", "hyper-personalized", "hybrid"] {
            let request = RecommendationRequest::new(user).with_strategy(strategy);
            let result = engine.generate_recommendations(&request).await.unwrap();
            assert!(
                !result.movies.is_empty(),
                "{} / {} returned nothing",
                user,
                strategy
            );
        }
    }
}

#[tokio::test]
async fn test_diversity_factor_spreads_genres() {
    let engine = build_engine(build_catalog());

    let uniform = engine
        .generate_recommendations(
            &RecommendationRequest::new("veteran")
                .with_limit(4)
                .with_diversity_factor(0.0),
        )
        .await
        .unwrap();
    let spread = engine
        .generate_recommendations(
            &RecommendationRequest::new("veteran")
                .with_limit(4)
                .with_diversity_factor(1.0),
        )
        .await
        .unwrap();

    assert!(
        spread.metadata.diversity_score >= uniform.metadata.diversity_score,
        "raising the factor must not reduce genre spread ({} < {})",
        spread.metadata.diversity_score,
        uniform.metadata.diversity_score
    );
    // Factor 1.0 caps every primary genre at one slot
    assert_eq!(spread.metadata.diversity_score, 1.0);
}

#[tokio::test]
async fn test_genre_filter_is_honored() {
    let engine = build_engine(build_catalog());
    let request = RecommendationRequest::new("veteran").with_genres(vec![DRAMA]);
    let result = engine.generate_recommendations(&request).await.unwrap();

    assert!(!result.movies.is_empty());
    for candidate in &result.movies {
        assert!(
            candidate.movie.genres.contains(&DRAMA),
            "{} has no drama genre",
            candidate.movie.title
        );
    }
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let engine = build_engine(build_catalog());
    let request = RecommendationRequest::new("veteran").with_limit(3);
    let result = engine.generate_recommendations(&request).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&result).unwrap()).unwrap();

    assert_eq!(json["metadata"]["source"], "smart");
    assert_eq!(json["movies"].as_array().unwrap().len(), result.movies.len());
    // Clean runs omit the errors map entirely
    assert!(json["metadata"].get("errors").is_none());

    let first = &json["movies"][0];
    assert!(first["movie"]["title"].is_string());
    assert!(first["reason"].is_string());
    assert!(first["discovery"].is_string());
}

#[tokio::test]
async fn test_no_matching_candidates_is_fatal() {
    let engine = build_engine(build_catalog());
    // Genre 99 exists on no movie
    let request = RecommendationRequest::new("veteran").with_genres(vec![99]);
    let err = engine.generate_recommendations(&request).await.unwrap_err();
    assert!(matches!(err, RecommendError::NoCandidates(_)));
}

#[tokio::test]
async fn test_hybrid_covers_at_least_the_behavioral_genres() {
    let engine = build_engine(build_catalog());

    let behavioral = engine
        .generate_recommendations(
            &RecommendationRequest::new("veteran").with_strategy("behavioral"),
        )
        .await
        .unwrap();
    let hybrid = engine
        .generate_recommendations(&RecommendationRequest::new("veteran").with_strategy("hybrid"))
        .await
        .unwrap();

    // The catalog fits inside the default limit, so hybrid's union must
    // contain everything behavioral found plus smart's wider pool
    let hybrid_ids: Vec<MovieId> = hybrid.movies.iter().map(|m| m.movie.id).collect();
    assert!(hybrid.movies.len() >= behavioral.movies.len());
    for candidate in &behavioral.movies {
        assert!(
            hybrid_ids.contains(&candidate.movie.id),
            "{} missing from hybrid result",
            candidate.movie.title
        );
    }
}
