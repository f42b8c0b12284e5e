//! Service layer: catalog boundary, Spotify client, recommender

pub mod catalog;
pub mod recommender;
pub mod spotify;

pub use catalog::{CatalogError, TrackCatalog};
pub use recommender::{CommitOutcome, Recommender, RecommenderSettings};
pub use spotify::SpotifyCatalog;
