//! # histo_explain
//!
//! Post-hoc explanations for graph classifiers in the style of GNN-Explainer
//! (Ying et al., NeurIPS 2019).
//!
//! This crate provides:
//! - [`ExplanationMask`] learnable soft masks over adjacency and features
//! - [`ExplanationLoss`] fidelity + sparsity + entropy objective
//! - [`SingleInstanceExplainer`] the per-instance mask optimizer
//! - [`ExplanationGraph`] thresholded subgraph extracted from a learned mask
//! - [`ExplanationMetadata`] JSON summary of one explanation run
//!
//! ## Example
//!
//! ```rust,ignore
//! use histo_explain::{ExplainerParams, ExplanationGraph, SingleInstanceExplainer, TrainParams};
//!
//! let explainer = SingleInstanceExplainer::new(train_params, params, context)?;
//! let output = explainer.explain(model.as_ref(), &graph, label)?;
//! let explanation = ExplanationGraph::from_output(&output, &graph, params.adj_thresh)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod explainer;
mod losses;
mod mask;
pub mod metadata;
mod postprocess;

pub use config::{ExplainerParams, TrainParams};
pub use error::{ExplainError, Result};
pub use explainer::{ExplanationOutput, SingleInstanceExplainer};
pub use losses::{binary_entropy, fidelity_loss, masked_mean, ExplanationLoss};
pub use mask::ExplanationMask;
pub use metadata::ExplanationMetadata;
pub use postprocess::ExplanationGraph;
