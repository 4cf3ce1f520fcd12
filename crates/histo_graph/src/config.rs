//! Graph builder configuration.

use histo_core::{CoreError, EdgeKernel, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of the threshold graph builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphBuilderConfig {
    /// Pairs whose kernel weight exceeds this value are connected.
    pub edge_threshold: f32,
    /// Whether to attach `[distance, weight]` features to every edge.
    pub edge_encoding: bool,
    /// Distance-to-weight kernel.
    #[serde(default)]
    pub kernel: EdgeKernel,
}

impl GraphBuilderConfig {
    /// Create a config with the default inverse-distance kernel.
    pub fn new(edge_threshold: f32, edge_encoding: bool) -> Self {
        Self {
            edge_threshold,
            edge_encoding,
            kernel: EdgeKernel::default(),
        }
    }

    /// Set the kernel.
    #[must_use]
    pub fn with_kernel(mut self, kernel: EdgeKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Read the builder keys from the pipeline configuration.
    ///
    /// `edge_threshold` and `edge_encoding` are required; `kernel` is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] when a required key is missing or
    /// has the wrong type, or when the kernel parameters are invalid.
    pub fn from_value(config: &Value) -> Result<Self> {
        let edge_threshold = config
            .get("edge_threshold")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("edge_threshold", "a number"))? as f32;
        let edge_encoding = config
            .get("edge_encoding")
            .and_then(Value::as_bool)
            .ok_or_else(|| missing("edge_encoding", "a boolean"))?;
        let kernel = match config.get("kernel") {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| CoreError::Configuration(format!("invalid 'kernel': {e}")))?,
            None => EdgeKernel::default(),
        };

        let config = Self {
            edge_threshold,
            edge_encoding,
            kernel,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.edge_threshold.is_finite() {
            return Err(CoreError::Configuration(format!(
                "edge_threshold must be finite, got {}",
                self.edge_threshold
            )));
        }
        self.kernel.validate()
    }
}

fn missing(key: &str, kind: &str) -> CoreError {
    CoreError::Configuration(format!("Missing or invalid '{key}' (expected {kind})"))
}
