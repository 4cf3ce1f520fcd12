//! Model registry for creating model variants by name.
//!
//! The set of variants is closed ([`ModelType`]); the registry maps each
//! variant name to a constructor that reads the `model_params` section of the
//! pipeline configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use histo_models::registry::{default_registry, ModelRequest};
//! use serde_json::json;
//!
//! let registry = default_registry::<NdArray>();
//! let params = json!({ "n_classes": 3, "hidden_dim": 64 });
//! let request = ModelRequest::new(&params, graph.num_node_features());
//! let model = registry.create("cell_graph_model", &request, &device)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::checkpoint::{load_checkpoint, CheckpointError};
use crate::readout::Readout;
use crate::traits::GraphClassificationModel;
use crate::{CellGraphModelConfig, GcnGraphModelConfig};

/// Error type for model registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Model not found in registry.
    #[error("Model '{name}' not recognized. Options are: {options:?}")]
    ModelNotFound {
        /// Requested name.
        name: String,
        /// Registered names.
        options: Vec<String>,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Checkpoint could not be applied.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// The closed set of model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// [`CellGraphModel`](crate::CellGraphModel).
    CellGraphModel,
    /// [`GcnGraphModel`](crate::GcnGraphModel).
    GcnGraphModel,
}

impl ModelType {
    /// Every variant.
    pub const ALL: [ModelType; 2] = [ModelType::CellGraphModel, ModelType::GcnGraphModel];

    /// Registered name of the variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CellGraphModel => "cell_graph_model",
            Self::GcnGraphModel => "gcn_graph_model",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RegistryError::ModelNotFound {
                name: s.to_string(),
                options: Self::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            })
    }
}

/// Everything a constructor needs besides the device.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// The `model_params` configuration section.
    pub params: &'a Value,
    /// Node feature width of the graphs the model will see.
    pub num_features: usize,
    /// Optional checkpoint to load into the fresh model.
    pub checkpoint: Option<&'a Path>,
}

impl<'a> ModelRequest<'a> {
    /// Create a request without a checkpoint.
    pub fn new(params: &'a Value, num_features: usize) -> Self {
        Self {
            params,
            num_features,
            checkpoint: None,
        }
    }

    /// Load weights from `path` after construction.
    #[must_use]
    pub fn with_checkpoint(mut self, path: &'a Path) -> Self {
        self.checkpoint = Some(path);
        self
    }
}

/// Boxed model as handed out by the registry.
pub type BoxedModel<B> = Box<dyn GraphClassificationModel<B>>;

/// Type alias for model constructor.
pub type ModelConstructor<B> = Arc<
    dyn Fn(&ModelRequest<'_>, &<B as Backend>::Device) -> Result<BoxedModel<B>> + Send + Sync,
>;

/// Registry for creating models by name.
pub struct ModelRegistry<B: Backend> {
    models: HashMap<String, ModelConstructor<B>>,
}

impl<B: Backend> Default for ModelRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> ModelRegistry<B> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register a model constructor.
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(&ModelRequest<'_>, &<B as Backend>::Device) -> Result<BoxedModel<B>>
            + Send
            + Sync
            + 'static,
    {
        self.models.insert(name.to_string(), Arc::new(constructor));
    }

    /// Create a model by name.
    pub fn create(
        &self,
        name: &str,
        request: &ModelRequest<'_>,
        device: &<B as Backend>::Device,
    ) -> Result<BoxedModel<B>> {
        let constructor = self
            .models
            .get(name)
            .ok_or_else(|| RegistryError::ModelNotFound {
                name: name.to_string(),
                options: self.list().into_iter().map(str::to_string).collect(),
            })?;
        let model = constructor(request, device)?;
        tracing::info!(
            "Created model '{}' ({} features -> {} classes)",
            model.name(),
            model.num_features(),
            model.num_classes()
        );
        Ok(model)
    }

    /// List all registered model names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a model is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }
}

// ============================================================================
// Helper functions for parsing configs
// ============================================================================

fn get_usize(config: &Value, key: &str) -> Result<usize> {
    config
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| RegistryError::InvalidConfig(format!("Missing or invalid '{}'", key)))
}

fn get_usize_or(config: &Value, key: &str, default: usize) -> usize {
    config
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(default)
}

fn get_f64_or(config: &Value, key: &str, default: f64) -> f64 {
    config
        .get(key)
        .and_then(|v| v.as_f64())
        .unwrap_or(default)
}

fn get_readout_or(config: &Value, default: Readout) -> Result<Readout> {
    match config.get("readout").and_then(|v| v.as_str()) {
        Some(name) => Readout::from_name(name)
            .ok_or_else(|| RegistryError::InvalidConfig(format!("Unknown readout '{}'", name))),
        None => Ok(default),
    }
}

fn check_num_features(request: &ModelRequest<'_>) -> Result<()> {
    if request.num_features == 0 {
        return Err(RegistryError::InvalidConfig(
            "num_features must be > 0".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Default registry with all models
// ============================================================================

/// Create a registry with every [`ModelType`] pre-registered.
///
/// # Required Config Fields
///
/// All models require `n_classes`. Optional: `hidden_dim` (32), `n_layers`
/// (2), `dropout` (0.0), `readout` (`"sum"` / `"mean"`), and for
/// `cell_graph_model` also `eps` (0.0).
pub fn default_registry<B: Backend>() -> ModelRegistry<B> {
    let mut registry = ModelRegistry::new();

    registry.register(ModelType::CellGraphModel.as_str(), |request, device| {
        check_num_features(request)?;
        let params = request.params;

        let model_config = CellGraphModelConfig::new(request.num_features, get_usize(params, "n_classes")?)
            .with_hidden_dim(get_usize_or(params, "hidden_dim", 32))
            .with_n_layers(get_usize_or(params, "n_layers", 2))
            .with_eps(get_f64_or(params, "eps", 0.0) as f32)
            .with_dropout(get_f64_or(params, "dropout", 0.0))
            .with_readout(get_readout_or(params, Readout::Sum)?);

        let mut model = model_config.init::<B>(device);
        if let Some(path) = request.checkpoint {
            model = load_checkpoint(model, path, device)?;
        }
        Ok(Box::new(model) as BoxedModel<B>)
    });

    registry.register(ModelType::GcnGraphModel.as_str(), |request, device| {
        check_num_features(request)?;
        let params = request.params;

        let model_config = GcnGraphModelConfig::new(request.num_features, get_usize(params, "n_classes")?)
            .with_hidden_dim(get_usize_or(params, "hidden_dim", 32))
            .with_n_layers(get_usize_or(params, "n_layers", 2))
            .with_dropout(get_f64_or(params, "dropout", 0.0))
            .with_readout(get_readout_or(params, Readout::Mean)?);

        let mut model = model_config.init::<B>(device);
        if let Some(path) = request.checkpoint {
            model = load_checkpoint(model, path, device)?;
        }
        Ok(Box::new(model) as BoxedModel<B>)
    });

    registry
}
