//! # histo_models
//!
//! Graph neural network classifiers for histocartography-rs.
//!
//! The explainer only needs one capability from a model: map a dense graph
//! (adjacency + node features) to class logits. That capability is the
//! [`GraphClassificationModel`] trait. Concrete variants form a closed set,
//! [`ModelType`], resolved by name through a [`ModelRegistry`].
//!
//! ## Models
//! - [`CellGraphModel`] - GIN-style sum aggregation over the cell graph
//! - [`GcnGraphModel`] - symmetric-normalized graph convolution
//!
//! ## Checkpoints
//!
//! Weights are stored as typed Burn records (`*.mpk`) and loaded into a freshly
//! constructed model of the matching variant; see [`checkpoint`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
mod error;
mod gcn;
mod gin;
mod readout;
pub mod registry;
mod traits;

pub use checkpoint::{load_checkpoint, save_checkpoint, CheckpointError};
pub use error::{ModelError, Result};
pub use gcn::{GcnGraphModel, GcnGraphModelConfig};
pub use gin::{CellGraphModel, CellGraphModelConfig};
pub use readout::Readout;
pub use registry::{
    default_registry, BoxedModel, ModelRegistry, ModelRequest, ModelType, RegistryError,
};
pub use traits::{check_graph_input, GraphClassificationModel};
