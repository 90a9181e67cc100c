//! # Almoner
//!
//! An explainable interest-to-charity matching and ranking engine.
//!
//! ## Features
//!
//! - Structured feature extraction from free-text interest queries
//! - TF-IDF semantic similarity over the catalog corpus
//! - Tiered category matching (exact, word, fuzzy, substring)
//! - Adaptive fusion with an optional external relevance model
//! - Diversified, deduplicated top-N results with per-signal scores
//!
//! ```
//! use almoner::catalog::{Catalog, Entity};
//! use almoner::{EngineConfig, Recommender};
//!
//! let catalog = Catalog::new(vec![
//!     Entity::new(1, "Ocean Trust")
//!         .with_description("Protects marine wildlife and coral reefs")
//!         .with_categories_str("environment,wildlife"),
//!     Entity::new(2, "City Readers")
//!         .with_description("Literacy programs for children")
//!         .with_categories_str("education,children"),
//! ])
//! .unwrap();
//!
//! let recommender = Recommender::new(catalog, EngineConfig::default()).unwrap();
//! let results = recommender.recommend("I love wildlife", 1, false).unwrap();
//! assert_eq!(results[0].id, 1);
//! ```

pub mod analysis;
pub mod catalog;
pub mod category;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod ranking;
pub mod relevance;
pub mod util;
pub mod vector;

pub use config::EngineConfig;
pub use engine::{EngineStats, Recommender};
pub use error::{AlmonerError, Result};
pub use ranking::{MatchResult, MatchType};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
