//! # histo_data
//!
//! Instance datasets and graph data loaders for histocartography-rs.
//!
//! This crate provides:
//! - [`Instance`] the on-disk description of one image's detected objects
//! - [`InstanceDataset`] for directory-backed or in-memory instances
//! - [`GraphDataLoader`] for lazily building `(GraphSample, label)` pairs
//!
//! ## Example
//!
//! ```rust,ignore
//! use histo_data::{GraphDataLoader, InstanceDataset};
//! use histo_graph::{GraphBuilderConfig, KnnGraphBuilder};
//!
//! let builder = KnnGraphBuilder::new(GraphBuilderConfig::new(0.1, false))?;
//! let loader = GraphDataLoader::new(InstanceDataset::from_dir("data/")?, builder);
//! for item in &loader {
//!     let (sample, label) = item?;
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod dataset;
mod error;
mod loader;

pub use dataset::{Instance, InstanceDataset};
pub use error::{DataError, Result};
pub use loader::{GraphDataLoader, GraphDataLoaderIter, GraphSample};
