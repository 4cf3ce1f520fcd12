//! Single-instance mask optimization.

use burn::optim::decay::WeightDecayConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use histo_core::{CellGraph, ExecutionContext, GraphTensors};
use histo_models::GraphClassificationModel;

use crate::config::{ExplainerParams, TrainParams};
use crate::error::{ExplainError, Result};
use crate::losses::ExplanationLoss;
use crate::mask::ExplanationMask;

/// Result of explaining one graph.
#[derive(Debug, Clone)]
pub struct ExplanationOutput<B: Backend> {
    /// Adjacency with the learned edge mask applied `(N, N)`.
    pub masked_adjacency: Tensor<B, 2>,
    /// Node features with the learned feature mask applied `(N, F)`.
    pub masked_features: Tensor<B, 2>,
    /// Class probabilities on the unmasked graph.
    pub original_prediction: Vec<f32>,
    /// Class probabilities on the masked graph.
    pub explanation_prediction: Vec<f32>,
    /// Loss value of every optimization step.
    pub loss_history: Vec<f32>,
    /// Label of the explained instance.
    pub label: usize,
}

impl<B: Backend> ExplanationOutput<B> {
    /// Number of nodes of the explained graph.
    pub fn num_nodes(&self) -> usize {
        self.masked_adjacency.dims()[0]
    }

    /// Masked adjacency values, row-major.
    pub fn adjacency_values(&self) -> Result<Vec<f32>> {
        to_vec(self.masked_adjacency.clone())
    }

    /// Masked feature values, row-major.
    pub fn feature_values(&self) -> Result<Vec<f32>> {
        to_vec(self.masked_features.clone())
    }

    /// Class with the highest original probability.
    pub fn predicted_class(&self) -> Option<usize> {
        argmax(&self.original_prediction)
    }

    /// Class with the highest probability on the masked graph.
    pub fn explanation_class(&self) -> Option<usize> {
        argmax(&self.explanation_prediction)
    }
}

/// GNN-Explainer for a single graph.
///
/// Learns a soft adjacency mask (and optionally a feature mask) such that the
/// frozen model still predicts what it predicted on the full graph, while the
/// mask stays sparse and close to binary. Only the mask is ever updated.
///
/// # Example
///
/// ```rust,ignore
/// use burn_autodiff::Autodiff;
/// use burn_ndarray::NdArray;
///
/// let explainer = SingleInstanceExplainer::<Autodiff<NdArray>>::new(
///     TrainParams::new(500, 0.01),
///     ExplainerParams::new(0.1),
///     ExecutionContext::default(),
/// )?;
/// let output = explainer.explain(&model, &graph, label)?;
/// ```
#[derive(Debug, Clone)]
pub struct SingleInstanceExplainer<B: AutodiffBackend> {
    train_params: TrainParams,
    params: ExplainerParams,
    context: ExecutionContext<B>,
}

impl<B: AutodiffBackend> SingleInstanceExplainer<B> {
    /// Create an explainer.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidConfig`] for unusable train params.
    pub fn new(
        train_params: TrainParams,
        params: ExplainerParams,
        context: ExecutionContext<B>,
    ) -> Result<Self> {
        train_params.validate()?;
        Ok(Self {
            train_params,
            params,
            context,
        })
    }

    /// Optimizer settings.
    pub fn train_params(&self) -> &TrainParams {
        &self.train_params
    }

    /// Mask hyperparameters.
    pub fn params(&self) -> &ExplainerParams {
        &self.params
    }

    /// Explain the model's prediction on `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidInput`] for an empty graph and
    /// [`ExplainError::ModelInvocation`] if any forward pass fails.
    pub fn explain<M>(
        &self,
        model: &M,
        graph: &CellGraph,
        label: usize,
    ) -> Result<ExplanationOutput<B::InnerBackend>>
    where
        M: GraphClassificationModel<B> + ?Sized,
    {
        let num_nodes = graph.number_of_nodes();
        if num_nodes == 0 {
            return Err(ExplainError::InvalidInput(
                "cannot explain an empty graph".to_string(),
            ));
        }
        let num_features = graph.num_node_features();
        let num_edges = graph.number_of_edges();
        let device = self.context.device();

        let (adjacency, features) = GraphTensors::<B>::from_graph(graph, device).into_parts();
        let support = adjacency.clone().reshape([num_nodes, num_nodes]);

        let original = model
            .forward_eval_probs(adjacency.clone(), features.clone())?
            .detach();
        let original_prediction = to_vec(original.clone().inner())?;

        let feature_init = self
            .params
            .feature_mask_init
            .map(|init| (num_features, init));
        let mut mask = ExplanationMask::<B>::new(
            num_nodes,
            self.params.adjacency_mask_init,
            feature_init,
            device,
        );

        let mut optim = AdamConfig::new()
            .with_weight_decay(Some(WeightDecayConfig::new(self.train_params.weight_decay)))
            .init::<B, ExplanationMask<B>>();
        let objective = ExplanationLoss::from(&self.params);

        tracing::debug!(
            nodes = num_nodes,
            edges = num_edges,
            epochs = self.train_params.num_epochs,
            "optimizing explanation mask"
        );

        let mut loss_history = Vec::with_capacity(self.train_params.num_epochs);
        for epoch in 0..self.train_params.num_epochs {
            let (masked_adjacency, masked_features) =
                mask.apply(adjacency.clone(), features.clone());
            let logits = model.forward_eval(masked_adjacency, masked_features)?;
            let loss = objective.forward(original.clone(), logits, &mask, support.clone(), num_edges);

            let loss_value: f32 = loss.clone().into_scalar().elem();
            tracing::debug!(epoch, loss = loss_value, "explainer step");
            loss_history.push(loss_value);

            // Gradients are collected for the mask only, so the model stays frozen.
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &mask);
            mask = optim.step(self.train_params.lr, mask, grads);
        }

        let (masked_adjacency, masked_features) = mask.apply(adjacency, features);
        let explanation = model.forward_eval_probs(masked_adjacency.clone(), masked_features.clone())?;
        let explanation_prediction = to_vec(explanation.inner())?;

        Ok(ExplanationOutput {
            masked_adjacency: masked_adjacency.inner().reshape([num_nodes, num_nodes]),
            masked_features: masked_features.inner().reshape([num_nodes, num_features]),
            original_prediction,
            explanation_prediction,
            loss_history,
            label,
        })
    }
}

fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| ExplainError::Tensor(format!("{e:?}")))
}

fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use histo_core::Object;
    use histo_models::{CellGraphModelConfig, ModelError};

    type TestBackend = Autodiff<NdArray>;

    struct ConstantModel;

    impl<B: Backend> GraphClassificationModel<B> for ConstantModel {
        fn forward(
            &self,
            adjacency: Tensor<B, 3>,
            _features: Tensor<B, 3>,
        ) -> histo_models::Result<Tensor<B, 2>> {
            let device = adjacency.device();
            Ok(Tensor::<B, 1>::from_floats([10.0, -10.0], &device).reshape([1, 2]))
        }

        fn name(&self) -> &str {
            "constant"
        }

        fn num_features(&self) -> usize {
            3
        }

        fn num_classes(&self) -> usize {
            2
        }
    }

    fn line_graph(n: usize) -> CellGraph {
        let objects: Vec<Object> = (0..n)
            .map(|i| Object::new([i as f32 * 10.0, 5.0], i % 2))
            .collect();
        let mut graph = CellGraph::from_objects(&objects, [100, 100]).unwrap();
        for i in 1..n {
            graph.add_undirected_edge(i - 1, i, None).unwrap();
        }
        graph
    }

    fn explainer(epochs: usize) -> SingleInstanceExplainer<TestBackend> {
        SingleInstanceExplainer::new(
            TrainParams::new(epochs, 0.05),
            ExplainerParams::new(0.1),
            ExecutionContext::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_runs_exactly_num_epochs() {
        let graph = line_graph(5);
        let output = explainer(7).explain(&ConstantModel, &graph, 1).unwrap();
        assert_eq!(output.loss_history.len(), 7);
        assert_eq!(output.label, 1);
        assert_eq!(output.masked_adjacency.dims(), [5, 5]);
        assert_eq!(output.masked_features.dims(), [5, 3]);
    }

    #[test]
    fn test_zero_epochs_rejected() {
        let result = SingleInstanceExplainer::<TestBackend>::new(
            TrainParams::new(0, 0.01),
            ExplainerParams::new(0.1),
            ExecutionContext::default(),
        );
        assert!(matches!(result, Err(ExplainError::InvalidConfig(_))));
    }

    #[test]
    fn test_constant_model_prediction_unchanged() {
        let graph = line_graph(4);
        let output = explainer(5).explain(&ConstantModel, &graph, 0).unwrap();
        assert_eq!(output.original_prediction.len(), 2);
        for (a, b) in output
            .original_prediction
            .iter()
            .zip(&output.explanation_prediction)
        {
            assert!((a - b).abs() < 1e-6);
        }
        assert_eq!(output.predicted_class(), Some(0));
        assert_eq!(output.explanation_class(), Some(0));
    }

    #[test]
    fn test_masked_tensors_bounded_by_originals() {
        let graph = line_graph(6);
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 2).init::<TestBackend>(&device);
        let output = explainer(10).explain(&model, &graph, 0).unwrap();

        let adjacency = graph.adjacency();
        let masked = output.adjacency_values().unwrap();
        for (m, a) in masked.iter().zip(&adjacency) {
            assert!(*m >= 0.0 && *m <= *a);
        }

        let features = graph.node_features();
        let masked = output.feature_values().unwrap();
        for (m, f) in masked.iter().zip(&features) {
            assert!(m.abs() <= f.abs() + 1e-6);
        }
        assert!(output.loss_history.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_feature_mask_shrinks_features() {
        let graph = line_graph(3);
        let explainer = SingleInstanceExplainer::<TestBackend>::new(
            TrainParams::new(3, 0.01),
            ExplainerParams::new(0.1).with_feature_mask(0.0),
            ExecutionContext::default(),
        )
        .unwrap();
        let output = explainer.explain(&ConstantModel, &graph, 0).unwrap();

        let features = graph.node_features();
        let masked = output.feature_values().unwrap();
        for (m, f) in masked.iter().zip(&features) {
            assert!(m.abs() < f.abs() || *f == 0.0);
        }
    }

    #[test]
    fn test_loss_decreases_with_regularization() {
        let graph = line_graph(5);
        let explainer = SingleInstanceExplainer::<TestBackend>::new(
            TrainParams::new(50, 0.1).with_weight_decay(0.0),
            ExplainerParams::new(0.1).with_regularization(1.0, 0.0),
            ExecutionContext::default(),
        )
        .unwrap();
        let output = explainer.explain(&ConstantModel, &graph, 0).unwrap();
        let first = output.loss_history[0];
        let last = output.loss_history[output.loss_history.len() - 1];
        assert!(last < first);
    }

    #[test]
    fn test_shape_mismatch_is_model_invocation_error() {
        let graph = line_graph(4);
        let device = Default::default();
        let model = CellGraphModelConfig::new(8, 2).init::<TestBackend>(&device);
        let err = explainer(3).explain(&model, &graph, 0).unwrap_err();
        assert!(matches!(
            err,
            ExplainError::ModelInvocation(ModelError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_predictions_deterministic_with_dropout() {
        let graph = line_graph(6);
        let device = Default::default();
        let model = CellGraphModelConfig::new(3, 2)
            .with_dropout(0.5)
            .init::<TestBackend>(&device);
        let explainer = explainer(5);

        let first = explainer.explain(&model, &graph, 0).unwrap();
        let second = explainer.explain(&model, &graph, 0).unwrap();
        assert_eq!(first.original_prediction, second.original_prediction);
        assert_eq!(first.explanation_prediction, second.explanation_prediction);
        assert_eq!(first.loss_history, second.loss_history);
    }
}
