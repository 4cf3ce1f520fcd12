//! Learnable explanation masks.

use burn::module::Param;
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

/// Soft masks over one graph's adjacency and (optionally) feature dimensions.
///
/// Raw values are unconstrained; [`adjacency_weights`](Self::adjacency_weights)
/// and [`feature_weights`](Self::feature_weights) squash them through a
/// sigmoid, so every applied weight lies in [0, 1]. The adjacency weights are
/// symmetrized, keeping the masked graph undirected.
#[derive(Module, Debug)]
pub struct ExplanationMask<B: Backend> {
    adjacency: Param<Tensor<B, 2>>,
    features: Option<Param<Tensor<B, 1>>>,
}

impl<B: Backend> ExplanationMask<B> {
    /// Create a mask for a graph with `num_nodes` nodes.
    ///
    /// Every adjacency cell starts at `adjacency_init`. When `feature_init` is
    /// `Some((width, value))` a feature mask of that width is created too.
    pub fn new(
        num_nodes: usize,
        adjacency_init: f32,
        feature_init: Option<(usize, f32)>,
        device: &B::Device,
    ) -> Self {
        let adjacency = Param::from_tensor(Tensor::full([num_nodes, num_nodes], adjacency_init, device));
        let features = feature_init
            .map(|(width, value)| Param::from_tensor(Tensor::full([width], value, device)));

        Self {
            adjacency,
            features,
        }
    }

    /// Squashed, symmetrized adjacency weights `(N, N)`.
    pub fn adjacency_weights(&self) -> Tensor<B, 2> {
        let squashed = squash(self.adjacency.val());
        (squashed.clone() + squashed.transpose()) / 2.0
    }

    /// Squashed feature weights `(F)`, if the feature mask is enabled.
    pub fn feature_weights(&self) -> Option<Tensor<B, 1>> {
        self.features.as_ref().map(|f| squash(f.val()))
    }

    /// Whether a feature mask is present.
    pub fn has_feature_mask(&self) -> bool {
        self.features.is_some()
    }

    /// Multiply the masks into a `(1, N, N)` adjacency and `(1, N, F)` features.
    pub fn apply(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> (Tensor<B, 3>, Tensor<B, 3>) {
        let masked_adjacency = adjacency * self.adjacency_weights().unsqueeze::<3>();
        let masked_features = match self.feature_weights() {
            Some(weights) => {
                let [width] = weights.dims();
                features * weights.reshape([1, 1, width])
            }
            None => features,
        };
        (masked_adjacency, masked_features)
    }
}

fn squash<B: Backend, const D: usize>(raw: Tensor<B, D>) -> Tensor<B, D> {
    sigmoid(raw)
}
