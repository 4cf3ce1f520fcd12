//! Pipeline configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use histo_explain::ExplainerParams;
use histo_graph::GraphBuilderConfig;
use histo_models::registry::ModelType;
use serde_json::Value;

/// Parsed pipeline configuration.
///
/// ```json
/// {
///   "model_type": "cell_graph_model",
///   "model_params": { "n_classes": 3 },
///   "explainer": { "adj_thresh": 0.1 },
///   "edge_threshold": 0.05,
///   "edge_encoding": false
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model_type: ModelType,
    pub model_params: Value,
    pub explainer_section: Value,
    pub explainer: ExplainerParams,
    pub graph: GraphBuilderConfig,
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Config {} is not valid JSON", path.display()))?;
        Self::from_value(&value).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let model_type: ModelType = value
            .get("model_type")
            .and_then(Value::as_str)
            .context("missing 'model_type'")?
            .parse()?;
        let model_params = value
            .get("model_params")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        let explainer_section = value
            .get("explainer")
            .cloned()
            .context("missing 'explainer' section")?;
        let explainer = ExplainerParams::from_value(&explainer_section)?;
        let graph = GraphBuilderConfig::from_value(value)?;

        Ok(Self {
            model_type,
            model_params,
            explainer_section,
            explainer,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        let config = PipelineConfig::from_value(&json!({
            "model_type": "gcn_graph_model",
            "model_params": { "n_classes": 2 },
            "explainer": { "adj_thresh": 0.2 },
            "edge_threshold": 0.3,
            "edge_encoding": true
        }))
        .unwrap();
        assert_eq!(config.model_type, ModelType::GcnGraphModel);
        assert_eq!(config.explainer.adj_thresh, 0.2);
        assert!(config.graph.edge_encoding);
    }

    #[test]
    fn test_missing_sections() {
        assert!(PipelineConfig::from_value(&json!({
            "model_type": "cell_graph_model",
            "edge_threshold": 0.3,
            "edge_encoding": false
        }))
        .is_err());

        let err = PipelineConfig::from_value(&json!({
            "model_type": "cell_graph_model",
            "explainer": { "adj_thresh": 0.2 },
            "edge_encoding": false
        }))
        .unwrap_err();
        assert!(format!("{err:#}").contains("edge_threshold"));
    }

    #[test]
    fn test_unknown_model_type() {
        assert!(PipelineConfig::from_value(&json!({
            "model_type": "unknown",
            "explainer": { "adj_thresh": 0.2 },
            "edge_threshold": 0.3,
            "edge_encoding": false
        }))
        .is_err());
    }
}
