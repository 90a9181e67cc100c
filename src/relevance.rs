//! External relevance models.
//!
//! A relevance model predicts how much a user would favour an entity,
//! independently of the query. The ranker treats its answer as one of three
//! signals and substitutes a neutral value whenever the model cannot answer.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::EntityId;
use crate::error::ModelError;

/// Predicts a user's affinity for an entity, in `[0, 1]`.
pub trait RelevanceModel: Send + Sync {
    fn score(&self, user_id: u64, entity_id: EntityId) -> Result<f64, ModelError>;

    /// Get the name of this model (for logging and stats).
    fn name(&self) -> &'static str;

    /// Whether the model can answer at all.
    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in used when no model is configured or the model failed to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

impl RelevanceModel for NoModel {
    fn score(&self, _user_id: u64, _entity_id: EntityId) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }
}

fn default_rating_min() -> f64 {
    0.0
}

fn default_rating_max() -> f64 {
    1.0
}

/// A biased matrix-factorization model:
///
/// ```text
/// est = μ + b_u + b_i + q_i · p_u
/// ```
///
/// Unknown users contribute no bias or factors. Predictions are clipped to
/// the rating scale and rescaled to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorModel {
    pub global_mean: f64,
    #[serde(default = "default_rating_min")]
    pub rating_min: f64,
    #[serde(default = "default_rating_max")]
    pub rating_max: f64,
    #[serde(default)]
    pub user_bias: HashMap<u64, f64>,
    #[serde(default)]
    pub item_bias: HashMap<EntityId, f64>,
    #[serde(default)]
    pub user_factors: HashMap<u64, Vec<f64>>,
    #[serde(default)]
    pub item_factors: HashMap<EntityId, Vec<f64>>,
}

impl FactorModel {
    /// Load a model from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let load_error = |message: String| ModelError::Load {
            path: path.display().to_string(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let model: FactorModel =
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
        model.validate().map_err(load_error)?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), String> {
        if self.rating_min.is_nan() || self.rating_max.is_nan() || self.rating_min >= self.rating_max {
            return Err(format!(
                "invalid rating scale [{}, {}]",
                self.rating_min, self.rating_max
            ));
        }
        if !self.global_mean.is_finite() {
            return Err("global_mean must be finite".to_string());
        }
        let mut lengths = self
            .user_factors
            .values()
            .chain(self.item_factors.values())
            .map(Vec::len);
        if let Some(first) = lengths.next()
            && lengths.any(|len| len != first)
        {
            return Err("latent factors must all have the same length".to_string());
        }
        Ok(())
    }

    /// Raw estimate on the rating scale, before clipping.
    pub fn estimate(&self, user_id: u64, entity_id: EntityId) -> Result<f64, ModelError> {
        let item_bias = self
            .item_bias
            .get(&entity_id)
            .ok_or(ModelError::PredictionImpossible { user_id, entity_id })?;

        let mut est = self.global_mean + item_bias;
        if let Some(user_bias) = self.user_bias.get(&user_id) {
            est += user_bias;
        }
        if let (Some(p), Some(q)) = (
            self.user_factors.get(&user_id),
            self.item_factors.get(&entity_id),
        ) {
            est += p.iter().zip(q).map(|(a, b)| a * b).sum::<f64>();
        }
        Ok(est)
    }
}

impl RelevanceModel for FactorModel {
    fn score(&self, user_id: u64, entity_id: EntityId) -> Result<f64, ModelError> {
        let est = self.estimate(user_id, entity_id)?;
        if !est.is_finite() {
            return Err(ModelError::NonFinite { entity_id });
        }
        let clipped = est.clamp(self.rating_min, self.rating_max);
        Ok((clipped - self.rating_min) / (self.rating_max - self.rating_min))
    }

    fn name(&self) -> &'static str {
        "factor"
    }
}

/// Load a factor model, falling back to [`NoModel`] when loading fails.
pub fn load_model_or_none<P: AsRef<Path>>(path: P) -> Arc<dyn RelevanceModel> {
    match FactorModel::load_from_file(path) {
        Ok(model) => {
            info!(
                "loaded relevance model: {} users, {} items",
                model.user_bias.len(),
                model.item_bias.len()
            );
            Arc::new(model)
        }
        Err(e) => {
            warn!("{e}; continuing without a relevance model");
            Arc::new(NoModel)
        }
    }
}
