//! Graph-level readout.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

/// How node embeddings are pooled into one graph embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readout {
    /// Sum over nodes.
    #[default]
    Sum,
    /// Mean over nodes.
    Mean,
}

impl Readout {
    /// Pool `(batch, nodes, dim)` into `(batch, dim)`.
    pub fn pool<B: Backend>(&self, h: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, _, dim] = h.dims();
        let pooled = match self {
            Self::Sum => h.sum_dim(1),
            Self::Mean => h.mean_dim(1),
        };
        pooled.reshape([batch, dim])
    }

    /// Parse a readout name, as found in model parameters.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(Self::Sum),
            "mean" => Some(Self::Mean),
            _ => None,
        }
    }
}
