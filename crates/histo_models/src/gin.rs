//! CellGraphModel: GIN-style classifier over cell graphs.

use burn::module::Ignored;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::readout::Readout;
use crate::traits::{check_graph_input, GraphClassificationModel};

/// Configuration for [`CellGraphModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellGraphModelConfig {
    /// Node feature width.
    pub num_features: usize,
    /// Number of output classes.
    pub n_classes: usize,
    /// Hidden embedding size.
    pub hidden_dim: usize,
    /// Number of message-passing layers.
    pub n_layers: usize,
    /// Learnable-free self weight `eps` in `(1 + eps) h + A h`.
    pub eps: f32,
    /// Dropout before the classifier head.
    pub dropout: f64,
    /// Graph-level pooling.
    pub readout: Readout,
}

impl Default for CellGraphModelConfig {
    fn default() -> Self {
        Self {
            num_features: 3,
            n_classes: 2,
            hidden_dim: 32,
            n_layers: 2,
            eps: 0.0,
            dropout: 0.0,
            readout: Readout::Sum,
        }
    }
}

impl CellGraphModelConfig {
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

    /// Set `eps`.
    #[must_use]
    pub fn with_eps(mut self, eps: f32) -> Self {
        self.eps = eps;
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
    pub fn init<B: Backend>(&self, device: &B::Device) -> CellGraphModel<B> {
        CellGraphModel::new(self.clone(), device)
    }
}

/// One GIN layer: `MLP((1 + eps) h + A h)`.
#[derive(Module, Debug)]
pub struct GinLayer<B: Backend> {
    linear1: Linear<B>,
    linear2: Linear<B>,
}

impl<B: Backend> GinLayer<B> {
    fn new(in_dim: usize, out_dim: usize, device: &B::Device) -> Self {
        Self {
            linear1: LinearConfig::new(in_dim, out_dim).init(device),
            linear2: LinearConfig::new(out_dim, out_dim).init(device),
        }
    }

    fn forward(&self, adjacency: Tensor<B, 3>, h: Tensor<B, 3>, eps: f32) -> Tensor<B, 3> {
        let aggregated = adjacency.matmul(h.clone()) + h * (1.0 + eps);
        let out = Relu::new().forward(self.linear1.forward(aggregated));
        Relu::new().forward(self.linear2.forward(out))
    }
}

/// GIN-style graph classifier.
///
/// # Architecture
///
/// ```text
/// Adjacency (B, N, N), Features (B, N, F)
///       |
///       +---> [GIN layer] x n_layers -> (B, N, H)
///       |
///       +---> [Readout] -> (B, H)
///       |
///       +---> [Dropout + Linear] -> Output (B, n_classes)
/// ```
///
/// The adjacency is used as given, so a soft (masked) adjacency scales each
/// neighbour's message continuously.
#[derive(Module, Debug)]
pub struct CellGraphModel<B: Backend> {
    layers: Vec<GinLayer<B>>,
    dropout: Dropout,
    head: Linear<B>,
    config: Ignored<CellGraphModelConfig>,
}

impl<B: Backend> CellGraphModel<B> {
    /// Create a new model.
    pub fn new(config: CellGraphModelConfig, device: &B::Device) -> Self {
        let mut layers = Vec::with_capacity(config.n_layers);
        let mut in_dim = config.num_features;
        for _ in 0..config.n_layers {
            layers.push(GinLayer::new(in_dim, config.hidden_dim, device));
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

        let mut h = features;
        for layer in &self.layers {
            h = layer.forward(adjacency.clone(), h, self.config.eps);
        }
        Ok(self.config.readout.pool(h))
    }

    /// The configuration the model was built from.
    pub fn config(&self) -> &CellGraphModelConfig {
        &self.config
    }
}

impl<B: Backend> GraphClassificationModel<B> for CellGraphModel<B> {
    fn forward(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let pooled = self.embed(adjacency, features)?;
        Ok(self.head.forward(self.dropout.forward(pooled)))
    }

    fn forward_eval(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let pooled = self.embed(adjacency, features)?;
        Ok(self.head.forward(pooled))
    }

    fn name(&self) -> &str {
        "cell_graph_model"
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
    fn test_config_builder() {
        let config = CellGraphModelConfig::new(8, 4)
            .with_hidden_dim(16)
            .with_n_layers(3)
            .with_readout(Readout::Mean);
        assert_eq!(config.num_features, 8);
        assert_eq!(config.n_classes, 4);
        assert_eq!(config.hidden_dim, 16);
        assert_eq!(config.n_layers, 3);
        assert_eq!(config.readout, Readout::Mean);
    }

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 5).init::<TestBackend>(&device);

        let adj = Tensor::<TestBackend, 3>::ones([2, 6, 6], &device);
        let feats = Tensor::<TestBackend, 3>::ones([2, 6, 3], &device);
        let logits = model.forward(adj, feats).unwrap();
        assert_eq!(logits.dims(), [2, 5]);
    }

    #[test]
    fn test_forward_rejects_wrong_feature_width() {
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 2).init::<TestBackend>(&device);

        let adj = Tensor::<TestBackend, 3>::zeros([1, 4, 4], &device);
        let feats = Tensor::<TestBackend, 3>::zeros([1, 4, 7], &device);
        assert!(model.forward(adj, feats).is_err());
    }

    #[test]
    fn test_forward_probs_sum_to_one() {
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 3).init::<TestBackend>(&device);

        let adj = Tensor::<TestBackend, 3>::ones([1, 4, 4], &device);
        let feats = Tensor::<TestBackend, 3>::ones([1, 4, 3], &device);
        let probs: Vec<f32> = model
            .forward_probs(adj, feats)
            .unwrap()
            .into_data()
            .to_vec()
            .unwrap();
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_eval_ignores_dropout() {
        type AdBackend = burn_autodiff::Autodiff<NdArray>;
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 3)
            .with_dropout(0.5)
            .init::<AdBackend>(&device);

        let adj = Tensor::<AdBackend, 3>::ones([1, 4, 4], &device);
        let feats = Tensor::<AdBackend, 3>::ones([1, 4, 3], &device);
        let run = || -> Vec<f32> {
            model
                .forward_eval(adj.clone(), feats.clone())
                .unwrap()
                .into_data()
                .to_vec()
                .unwrap()
        };
        let first = run();
        for _ in 0..5 {
            assert_eq!(run(), first);
        }
    }
}
