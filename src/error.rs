//! Error types for the Almoner engine.
//!
//! All fallible library operations return [`Result`], whose error side is the
//! [`AlmonerError`] enum. The external relevance collaborator has its own,
//! narrower [`ModelError`] so that ranking can map a missing signal to the
//! neutral default without touching the rest of the error space.
//!
//! # Examples
//!
//! ```
//! use almoner::error::{AlmonerError, Result};
//!
//! fn check_top_n(top_n: usize) -> Result<()> {
//!     if top_n == 0 {
//!         return Err(AlmonerError::invalid_argument("top_n must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_top_n(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Almoner operations.
#[derive(Error, Debug)]
pub enum AlmonerError {
    /// I/O errors (catalog, config, model files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Catalog loading or validation errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis-related errors (tokenization, linguistic analysis)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Rejected caller input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Relevance model errors that escaped to the caller (loading only)
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type alias for operations that may fail with AlmonerError.
pub type Result<T> = std::result::Result<T, AlmonerError>;

impl AlmonerError {
    /// Create a new catalog error.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        AlmonerError::Catalog(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        AlmonerError::Config(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        AlmonerError::Analysis(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        AlmonerError::InvalidArgument(msg.into())
    }

    /// Whether this error was caused by caller input rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AlmonerError::InvalidArgument(_))
    }
}

/// Errors reported by an external relevance model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("relevance model unavailable")]
    Unavailable,

    #[error("no prediction for user {user_id} and entity {entity_id}")]
    PredictionImpossible { user_id: u64, entity_id: i64 },

    #[error("model produced a non-finite score for entity {entity_id}")]
    NonFinite { entity_id: i64 },

    #[error("model loading failed: {path}: {message}")]
    Load { path: String, message: String },
}
