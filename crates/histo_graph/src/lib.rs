//! # histo_graph
//!
//! Geometric graph builders for histocartography-rs.
//!
//! This crate provides:
//! - [`GraphBuilder`] trait for turning detected objects into a [`CellGraph`]
//! - [`KnnGraphBuilder`] threshold builder over a monotone distance kernel
//! - [`GraphBuilderConfig`] parsed from the pipeline's JSON configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use histo_graph::{GraphBuilder, GraphBuilderConfig, KnnGraphBuilder};
//! use serde_json::json;
//!
//! let config = GraphBuilderConfig::from_value(&json!({
//!     "edge_threshold": 0.4,
//!     "edge_encoding": false
//! }))?;
//! let builder = KnnGraphBuilder::new(config)?;
//! let graph = builder.build(&objects, [1024, 1024])?;
//! ```
//!
//! [`CellGraph`]: histo_core::CellGraph

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod config;
mod knn;

pub use builder::GraphBuilder;
pub use config::GraphBuilderConfig;
pub use knn::KnnGraphBuilder;
