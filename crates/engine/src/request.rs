//! Request types, strategy names, and input normalization.
//!
//! Optional inputs are normalized instead of rejected: an unknown
//! strategy falls back to the default, a non-positive limit becomes the
//! default limit, an oversized one is clamped. The only fatal input is
//! an empty user identifier (checked by the orchestrator).

use catalog::GenreId;
use serde::Serialize;
use tracing::warn;

/// Default number of recommendations when the caller gives no limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Hard cap on the result size.
pub const MAX_LIMIT: usize = 100;

/// Diversity factor used when the caller does not supply one.
pub const DEFAULT_DIVERSITY: f32 = 0.3;

/// Confidence weights for hybrid merging: movies found by both
/// sub-strategies average their confidences with these weights.
pub const HYBRID_PRIMARY_WEIGHT: f32 = 0.6;
pub const HYBRID_SECONDARY_WEIGHT: f32 = 0.4;

/// The closed set of strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Default: semantic-leaning scoring over the caller's filter
    Smart,
    /// Affinity-leaning weights, candidates seeded from top affinities
    Behavioral,
    /// Smart weighting over affinity-seeded candidates
    HyperPersonalized,
    /// Runs smart + behavioral concurrently and merges
    Hybrid,
}

impl Strategy {
    /// Parse a strategy name. Unknown names fall back to [`Strategy::Smart`]
    /// with a warning — never an error back to the caller.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "smart" => Strategy::Smart,
            "behavioral" => Strategy::Behavioral,
            "hyper-personalized" | "hyper_personalized" => Strategy::HyperPersonalized,
            "hybrid" => Strategy::Hybrid,
            other => {
                warn!("Unknown strategy '{}', falling back to smart", other);
                Strategy::Smart
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Smart => "smart",
            Strategy::Behavioral => "behavioral",
            Strategy::HyperPersonalized => "hyper-personalized",
            Strategy::Hybrid => "hybrid",
        }
    }

    /// Scoring weights and candidate sourcing for a single-run strategy.
    ///
    /// Hybrid has no profile of its own; it composes smart + behavioral.
    pub fn profile(&self) -> StrategyProfile {
        match self {
            Strategy::Smart | Strategy::Hybrid => StrategyProfile {
                semantic_weight: 0.6,
                rating_weight: 0.15,
                seed_from_affinities: false,
            },
            Strategy::Behavioral => StrategyProfile {
                semantic_weight: 0.45,
                rating_weight: 0.3,
                seed_from_affinities: true,
            },
            Strategy::HyperPersonalized => StrategyProfile {
                semantic_weight: 0.6,
                rating_weight: 0.15,
                seed_from_affinities: true,
            },
        }
    }
}

/// Per-strategy pipeline parameters. Weights plus the shared MAX_BOOST
/// always sum to at most 1.0 so confidence stays in [0,1] by blending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyProfile {
    pub semantic_weight: f32,
    pub rating_weight: f32,
    /// Seed the candidate filter with the user's top affinity genres
    /// when the caller gave no explicit genre filter
    pub seed_from_affinities: bool,
}

/// A recommendation request as the caller hands it over.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub user_id: String,
    /// Raw strategy name; parsed with fallback
    pub strategy: String,
    /// 0 means "use the default"
    pub limit: usize,
    pub query: Option<String>,
    pub mood: Option<String>,
    pub genres: Vec<GenreId>,
    pub diversity_factor: Option<f32>,
}

impl RecommendationRequest {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            strategy: String::new(),
            limit: 0,
            query: None,
            mood: None,
            genres: Vec::new(),
            diversity_factor: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    pub fn with_genres(mut self, genres: Vec<GenreId>) -> Self {
        self.genres = genres;
        self
    }

    pub fn with_diversity_factor(mut self, factor: f32) -> Self {
        self.diversity_factor = Some(factor);
        self
    }

    /// Normalize optional fields into concrete pipeline parameters.
    pub fn normalize(&self) -> NormalizedRequest {
        let limit = if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        };
        NormalizedRequest {
            user_id: self.user_id.clone(),
            strategy: Strategy::parse(&self.strategy),
            limit,
            query: self.query.clone(),
            mood: self.mood.clone(),
            genres: self.genres.clone(),
            diversity_factor: self
                .diversity_factor
                .unwrap_or(DEFAULT_DIVERSITY)
                .clamp(0.0, 1.0),
        }
    }
}

/// A request after normalization; what the pipeline actually consumes.
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub user_id: String,
    pub strategy: Strategy,
    pub limit: usize,
    pub query: Option<String>,
    pub mood: Option<String>,
    pub genres: Vec<GenreId>,
    pub diversity_factor: f32,
}
