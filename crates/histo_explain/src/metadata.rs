//! JSON summary of one explanation run.
//!
//! The written document has the layout
//!
//! ```json
//! {
//!   "config": { "adj_thresh": 0.1, ..., "number_of_epochs": 500, "learning_rate": 0.01 },
//!   "output": {
//!     "original": { "prediction": [0.12, 0.88], "number_of_nodes": 40, "number_of_edges": 212 },
//!     "explanation": { "number_of_nodes": 40, "number_of_edges": 31, "explanation_prediction": [0.2, 0.8] }
//!   }
//! }
//! ```
//!
//! The original edge count is the number of directed edges of the cell graph,
//! the explanation edge count the number of undirected explanation edges.

use std::fs;
use std::path::Path;

use burn::prelude::Backend;
use histo_core::CellGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::TrainParams;
use crate::error::{ExplainError, Result};
use crate::explainer::ExplanationOutput;
use crate::postprocess::ExplanationGraph;

/// Metadata document for one explained instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationMetadata {
    /// Explainer section plus `number_of_epochs` and `learning_rate`.
    pub config: Value,
    /// Properties of the original and explanation graphs.
    pub output: MetadataOutput,
}

/// The `output` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataOutput {
    /// The original graph.
    pub original: OriginalSummary,
    /// The explanation graph.
    pub explanation: ExplanationSummary,
}

/// Summary of the original graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalSummary {
    /// Class probabilities, rounded to two decimals.
    pub prediction: Vec<f32>,
    /// Node count.
    pub number_of_nodes: usize,
    /// Directed edge count.
    pub number_of_edges: usize,
}

/// Summary of the explanation graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationSummary {
    /// Kept node count.
    pub number_of_nodes: usize,
    /// Kept undirected edge count.
    pub number_of_edges: usize,
    /// Class probabilities on the masked graph, rounded to two decimals.
    pub explanation_prediction: Vec<f32>,
}

impl ExplanationMetadata {
    /// Assemble the metadata of one run.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::Configuration`] if `explainer_section` is not a
    /// JSON object.
    pub fn new<B: Backend>(
        explainer_section: &Value,
        train_params: &TrainParams,
        graph: &CellGraph,
        output: &ExplanationOutput<B>,
        explanation: &ExplanationGraph,
    ) -> Result<Self> {
        let mut config = explainer_section.clone();
        let section = config.as_object_mut().ok_or_else(|| {
            ExplainError::Configuration("'explainer' section must be an object".to_string())
        })?;
        section.insert("number_of_epochs".into(), train_params.num_epochs.into());
        section.insert("learning_rate".into(), train_params.lr.into());

        Ok(Self {
            config,
            output: MetadataOutput {
                original: OriginalSummary {
                    prediction: round2(&output.original_prediction),
                    number_of_nodes: graph.number_of_nodes(),
                    number_of_edges: graph.number_of_edges(),
                },
                explanation: ExplanationSummary {
                    number_of_nodes: explanation.number_of_nodes(),
                    number_of_edges: explanation.number_of_edges(),
                    explanation_prediction: round2(&output.explanation_prediction),
                },
            },
        })
    }

    /// Write pretty JSON to `path`, creating parent directories.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Wrote explanation metadata to {:?}", path);
        Ok(())
    }

    /// Read a metadata document back.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

fn round2(values: &[f32]) -> Vec<f32> {
    values.iter().map(|v| (v * 100.0).round() / 100.0).collect()
}
