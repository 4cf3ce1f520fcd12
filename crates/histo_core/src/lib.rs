//! # histo_core
//!
//! Core types for histocartography-rs graph-based histopathology analysis.
//!
//! This crate provides:
//! - [`Object`] for detected cells / tissue superpixels
//! - [`CellGraph`] for the graph built over a set of objects
//! - [`EdgeKernel`] and [`l2_distance`] for distance-to-weight transforms
//! - [`GraphTensors`] for the dense tensor view consumed by GNN models
//! - [`ExecutionContext`] for explicit device selection
//! - Error types and common utilities
//!
//! ## Graph Convention
//!
//! Graphs are undirected but stored with paired directed edges: whenever
//! `(u, v)` is present, so is `(v, u)`. Dense tensors follow the convention
//! `(B, N, N)` for adjacency and `(B, N, F)` for node features:
//! - `B`: Batch size (always 1 for single-instance explanation)
//! - `N`: Number of nodes
//! - `F`: Node feature width
//!
//! ## Example
//!
//! ```rust,ignore
//! use histo_core::{Object, CellGraph, GraphTensors};
//!
//! let objects = vec![Object::new([0.0, 0.0], 1), Object::new([1.0, 0.0], 2)];
//! let graph = CellGraph::from_objects(&objects, [64, 64])?;
//! let tensors = GraphTensors::<NdArray>::from_graph(&graph, &device);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod context;
mod error;
mod graph;
mod kernel;
mod object;
mod tensor;

pub use context::ExecutionContext;
pub use error::{CoreError, Result};
pub use graph::{CellGraph, CENTROID, LABEL, VISUAL};
pub use kernel::{l2_distance, EdgeKernel};
pub use object::Object;
pub use tensor::GraphTensors;

/// Backend type aliases for convenience
pub mod backend {
    #[cfg(feature = "backend-ndarray")]
    pub use burn_ndarray::NdArray;
}
