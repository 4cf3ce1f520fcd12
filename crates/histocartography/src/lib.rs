//! # histocartography
//!
//! Cell graph construction and graph neural network explanations for
//! histopathology images.
//!
//! - **Graphs**: detected objects become nodes, a distance kernel decides edges
//! - **Models**: dense message-passing graph classifiers on burn
//! - **Explainability**: single-instance GNN-Explainer masks and their
//!   thresholded explanation subgraphs
//! - **Data**: instance files and lazy graph loaders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use histocartography::prelude::*;
//! use burn_autodiff::Autodiff;
//! use burn_ndarray::NdArray;
//!
//! type B = Autodiff<NdArray>;
//!
//! let builder = KnnGraphBuilder::new(GraphBuilderConfig::new(0.1, false))?;
//! let graph = builder.build(&objects, [1024, 1024])?;
//!
//! let context = ExecutionContext::<B>::default();
//! let params = serde_json::json!({ "n_classes": 3 });
//! let model = default_registry::<B>()
//!     .create("cell_graph_model", &ModelRequest::new(&params, graph.num_node_features()), context.device())?;
//!
//! let explainer = SingleInstanceExplainer::new(TrainParams::new(500, 0.01), ExplainerParams::new(0.1), context)?;
//! let output = explainer.explain(model.as_ref(), &graph, label)?;
//! let explanation = ExplanationGraph::from_output(&output, &graph, 0.1)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `backend-ndarray` (default): CPU backend using ndarray

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub use histo_core as core;
pub use histo_data as data;
pub use histo_explain as explain;
pub use histo_graph as graph;
pub use histo_models as models;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use histocartography::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use histo_core::{CellGraph, CoreError, EdgeKernel, ExecutionContext, GraphTensors, Object};

    // Graph building
    pub use histo_graph::{GraphBuilder, GraphBuilderConfig, KnnGraphBuilder};

    // Models
    pub use histo_models::{
        default_registry, load_checkpoint, save_checkpoint, CellGraphModel, CellGraphModelConfig,
        GcnGraphModel, GcnGraphModelConfig, GraphClassificationModel, ModelRegistry, ModelRequest,
        ModelType, Readout,
    };

    // Explain
    pub use histo_explain::{
        ExplainError, ExplainerParams, ExplanationGraph, ExplanationMetadata, ExplanationOutput,
        SingleInstanceExplainer, TrainParams,
    };

    // Data
    pub use histo_data::{DataError, GraphDataLoader, GraphSample, Instance, InstanceDataset};
}
