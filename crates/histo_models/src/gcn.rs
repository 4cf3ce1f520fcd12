//! GcnGraphModel: graph convolutional classifier.

use burn::module::Ignored;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::readout::Readout;
use crate::traits::{check_graph_input, GraphClassificationModel};

/// Configuration for [`GcnGraphModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcnGraphModelConfig {
    /// Node feature width.
    pub num_features: usize,
    /// Number of output classes.
    pub n_classes: usize,
    /// Hidden embedding size.
    pub hidden_dim: usize,
    /// Number of graph convolutions.
    pub n_layers: usize,
    /// Dropout before the classifier head.
    pub dropout: f64,
    /// Graph-level pooling.
    pub readout: Readout,
}

impl Default for GcnGraphModelConfig {
    fn default() -> Self {
        Self {
            num_features: 3,
            n_classes: 2,
            hidden_dim: 32,
            n_layers: 2,
            dropout: 0.0,
            readout: Readout::Mean,
        }
    }
}

impl GcnGraphModelConfig {
    /// Create a new config.
    pub fn new(num_features: usize, n_classes: usize) -> Self {
        Self {
            num_features,
            n_classes,
            ..Default::default()
        }
    }

    /// Set hidden embedding size.
    #[must_use]
    pub fn with_hidden_dim(mut self, hidden_dim: usize) -> Self {
        self.hidden_dim = hidden_dim;
        self
    }

    /// Set number of layers.
    #[must_use]
    pub fn with_n_layers(mut self, n_layers: usize) -> Self {
        self.n_layers = n_layers;
        self
    }

    /// Set dropout rate.
    #[must_use]
    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    /// Set readout.
    #[must_use]
    pub fn with_readout(mut self, readout: Readout) -> Self {
        self.readout = readout;
        self
    }

    /// Initialize the model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> GcnGraphModel<B> {
        GcnGraphModel::new(self.clone(), device)
    }
}

/// Graph convolutional classifier.
///
/// Each layer computes `relu(D^-1/2 (A + I) D^-1/2 H W)` where `D` is the
/// row sum of `A + I`. The self loop keeps every degree at least 1, so a fully
/// masked adjacency is still well defined.
#[derive(Module, Debug)]
pub struct GcnGraphModel<B: Backend> {
    layers: Vec<Linear<B>>,
    dropout: Dropout,
    head: Linear<B>,
    config: Ignored<GcnGraphModelConfig>,
}

impl<B: Backend> GcnGraphModel<B> {
    /// Create a new model.
    pub fn new(config: GcnGraphModelConfig, device: &B::Device) -> Self {
        let mut layers = Vec::with_capacity(config.n_layers);
        let mut in_dim = config.num_features;
        for _ in 0..config.n_layers {
            layers.push(LinearConfig::new(in_dim, config.hidden_dim).init(device));
            in_dim = config.hidden_dim;
        }

        Self {
            layers,
            dropout: DropoutConfig::new(config.dropout).init(),
            head: LinearConfig::new(in_dim, config.n_classes).init(device),
            config: Ignored(config),
        }
    }

    /// Pooled graph embedding `(B, H)`.
    fn embed(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        check_graph_input(&adjacency, &features, self.config.num_features)?;

        let norm = Self::normalize(adjacency);
        let mut h = features;
        for layer in &self.layers {
            h = Relu::new().forward(norm.clone().matmul(layer.forward(h)));
        }
        Ok(self.config.readout.pool(h))
    }

    /// The configuration the model was built from.
    pub fn config(&self) -> &GcnGraphModelConfig {
        &self.config
    }

    fn normalize(adjacency: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, n, _] = adjacency.dims();
        let device = adjacency.device();

        let eye = Tensor::<B, 2>::eye(n, &device)
            .unsqueeze::<3>()
            .repeat_dim(0, batch);
        let a_hat = adjacency + eye;

        // (batch, n, 1)
        let d_inv_sqrt = a_hat.clone().sum_dim(2).powf_scalar(-0.5);
        d_inv_sqrt.clone() * a_hat * d_inv_sqrt.swap_dims(1, 2)
    }
}

impl<B: Backend> GraphClassificationModel<B> for GcnGraphModel<B> {
    fn forward(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let pooled = self.embed(adjacency, features)?;
        Ok(self.head.forward(self.dropout.forward(pooled)))
    }

    fn forward_eval(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let pooled = self.embed(adjacency, features)?;
        Ok(self.head.forward(pooled))
    }

    fn name(&self) -> &str {
        "gcn_graph_model"
    }

    fn num_features(&self) -> usize {
        self.config.num_features
    }

    fn num_classes(&self) -> usize {
        self.config.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_config_default() {
        let config = GcnGraphModelConfig::default();
        assert_eq!(config.hidden_dim, 32);
        assert_eq!(config.readout, Readout::Mean);
    }

    #[test]
    fn test_normalize_isolated_nodes() {
        let device = Default::default();
        let adj = Tensor::<TestBackend, 3>::zeros([1, 3, 3], &device);
        let norm: Vec<f32> = GcnGraphModel::<TestBackend>::normalize(adj)
            .into_data()
            .to_vec()
            .unwrap();
        // isolated nodes only keep their self loop
        assert_eq!(norm, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_normalize_pair() {
        let device = Default::default();
        let adj = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 1.0, 0.0], &device)
            .reshape([1, 2, 2]);
        let norm: Vec<f32> = GcnGraphModel::<TestBackend>::normalize(adj)
            .into_data()
            .to_vec()
            .unwrap();
        for v in norm {
            assert!((v - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = GcnGraphModelConfig::new(4, 3)
            .with_n_layers(3)
            .init::<TestBackend>(&device);

        let adj = Tensor::<TestBackend, 3>::ones([1, 5, 5], &device);
        let feats = Tensor::<TestBackend, 3>::ones([1, 5, 4], &device);
        let logits = model.forward(adj, feats).unwrap();
        assert_eq!(logits.dims(), [1, 3]);
        assert_eq!(model.name(), "gcn_graph_model");
    }
}
