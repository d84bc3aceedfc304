//! # Catalog Crate
//!
//! Domain types, collaborator contracts, and the in-memory reference
//! store for the recommendation engine.
//!
//! ## Components
//!
//! - [`types`]: `CandidateMovie`, id aliases, embeddings, taste data
//! - [`error`]: `CollaboratorError` returned by every external call
//! - [`traits`]: the four collaborator seams the engine consumes
//!   (`ContentStore`, `AffinityStore`, `EmbeddingService`,
//!   `InteractionSink`)
//! - [`store`]: `CatalogIndex`, an in-memory implementation of all four,
//!   used by tests, benchmarks, and the CLI
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, CandidateFilter, ContentStore};
//!
//! let index = CatalogIndex::load_from_json(Path::new("data/catalog.json"))?;
//! let candidates = index.fetch_candidates(&CandidateFilter::popular()).await?;
//! ```

pub mod error;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::CollaboratorError;
pub use store::{CatalogFile, CatalogIndex, hashed_embedding};
pub use traits::{AffinityStore, ContentStore, EmbeddingService, InteractionSink};
pub use types::{
    CandidateFilter, CandidateMovie, EMBEDDING_DIM, Embedding, GenreId, InteractionKind, MovieId,
    TasteVectors, UserId,
};
