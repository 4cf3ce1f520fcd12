//! Explainer configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ExplainError, Result};

/// Optimizer settings for the mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Number of optimization steps.
    pub num_epochs: usize,
    /// Learning rate.
    pub lr: f64,
    /// Weight decay.
    pub weight_decay: f32,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            num_epochs: 100,
            lr: 1e-2,
            weight_decay: 5e-4,
        }
    }
}

impl TrainParams {
    /// Create train params with the default weight decay.
    pub fn new(num_epochs: usize, lr: f64) -> Self {
        Self {
            num_epochs,
            lr,
            ..Default::default()
        }
    }

    /// Set weight decay.
    #[must_use]
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidConfig`] for zero epochs, a non-positive
    /// learning rate or a negative weight decay.
    pub fn validate(&self) -> Result<()> {
        if self.num_epochs == 0 {
            return Err(ExplainError::InvalidConfig(
                "num_epochs must be >= 1".to_string(),
            ));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(ExplainError::InvalidConfig(format!(
                "learning rate must be > 0, got {}",
                self.lr
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ExplainError::InvalidConfig(format!(
                "weight decay must be >= 0, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}

/// Mask hyperparameters (the `explainer` configuration section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerParams {
    /// Postprocessing threshold on masked edge weights.
    pub adj_thresh: f32,
    /// Initial pre-sigmoid value of every adjacency mask cell.
    #[serde(default = "default_adjacency_mask_init")]
    pub adjacency_mask_init: f32,
    /// Initial pre-sigmoid value of the feature mask; `None` disables it.
    #[serde(default)]
    pub feature_mask_init: Option<f32>,
    /// Weight of the mean edge mask.
    #[serde(default = "default_sparsity_coefficient")]
    pub sparsity_coefficient: f32,
    /// Weight of the mean edge mask entropy.
    #[serde(default = "default_entropy_coefficient")]
    pub entropy_coefficient: f32,
    /// Weight of the mean feature mask.
    #[serde(default = "default_feature_sparsity_coefficient")]
    pub feature_sparsity_coefficient: f32,
    /// Weight of the mean feature mask entropy.
    #[serde(default = "default_feature_entropy_coefficient")]
    pub feature_entropy_coefficient: f32,
}

fn default_adjacency_mask_init() -> f32 {
    3.0
}

fn default_sparsity_coefficient() -> f32 {
    0.005
}

fn default_entropy_coefficient() -> f32 {
    1.0
}

fn default_feature_sparsity_coefficient() -> f32 {
    1.0
}

fn default_feature_entropy_coefficient() -> f32 {
    0.1
}

impl ExplainerParams {
    /// Create params with the default mask hyperparameters.
    pub fn new(adj_thresh: f32) -> Self {
        Self {
            adj_thresh,
            adjacency_mask_init: default_adjacency_mask_init(),
            feature_mask_init: None,
            sparsity_coefficient: default_sparsity_coefficient(),
            entropy_coefficient: default_entropy_coefficient(),
            feature_sparsity_coefficient: default_feature_sparsity_coefficient(),
            feature_entropy_coefficient: default_feature_entropy_coefficient(),
        }
    }

    /// Enable the feature mask.
    #[must_use]
    pub fn with_feature_mask(mut self, init: f32) -> Self {
        self.feature_mask_init = Some(init);
        self
    }

    /// Set the adjacency mask regularization weights.
    #[must_use]
    pub fn with_regularization(mut self, sparsity: f32, entropy: f32) -> Self {
        self.sparsity_coefficient = sparsity;
        self.entropy_coefficient = entropy;
        self
    }

    /// Set the adjacency mask initial value.
    #[must_use]
    pub fn with_adjacency_mask_init(mut self, init: f32) -> Self {
        self.adjacency_mask_init = init;
        self
    }

    /// Parse the `explainer` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Configuration`] when `adj_thresh` is missing or
    /// a field has the wrong type.
    pub fn from_value(section: &Value) -> Result<Self> {
        serde_json::from_value(section.clone())
            .map_err(|e| ExplainError::Configuration(format!("invalid 'explainer' section: {e}")))
    }
}
