//! Model capability trait.

use burn::prelude::*;
use burn::tensor::activation::softmax;

use crate::error::{ModelError, Result};

/// A model that classifies dense graphs.
///
/// Note: We don't require Send + Sync here because Burn's Module types
/// use interior mutability (OnceCell) that doesn't implement Sync.
pub trait GraphClassificationModel<B: Backend> {
    /// Forward pass returning class logits.
    ///
    /// # Arguments
    ///
    /// * `adjacency` - Weighted adjacency of shape (batch, nodes, nodes)
    /// * `features` - Node features of shape (batch, nodes, num_features)
    ///
    /// # Returns
    ///
    /// Logits tensor of shape (batch, n_classes)
    fn forward(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>>;

    /// Forward pass returning probabilities.
    fn forward_probs(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let logits = self.forward(adjacency, features)?;
        Ok(softmax(logits, 1))
    }

    /// Forward pass in inference mode (no dropout) returning class logits.
    ///
    /// Deterministic for fixed inputs even on an autodiff backend, where
    /// [`forward`](Self::forward) keeps stochastic layers active. Models
    /// without stochastic layers can rely on the default.
    fn forward_eval(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        self.forward(adjacency, features)
    }

    /// Inference-mode probabilities.
    fn forward_eval_probs(&self, adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Tensor<B, 2>> {
        let logits = self.forward_eval(adjacency, features)?;
        Ok(softmax(logits, 1))
    }

    /// Get the model name.
    fn name(&self) -> &str;

    /// Node feature width the model was constructed for.
    fn num_features(&self) -> usize;

    /// Number of output classes.
    fn num_classes(&self) -> usize;
}

/// Validate a dense graph batch against a model's expected feature width.
///
/// # Errors
///
/// Returns [`ModelError::ShapeMismatch`] for a non-square adjacency, batch or
/// node counts that differ between adjacency and features, a wrong feature
/// width, or an empty graph.
pub fn check_graph_input<B: Backend>(
    adjacency: &Tensor<B, 3>,
    features: &Tensor<B, 3>,
    num_features: usize,
) -> Result<()> {
    let [ab, an, am] = adjacency.dims();
    let [fb, fn_, ff] = features.dims();
    if an != am {
        return Err(ModelError::ShapeMismatch(format!(
            "adjacency must be square, got [{ab}, {an}, {am}]"
        )));
    }
    if ab != fb || an != fn_ {
        return Err(ModelError::ShapeMismatch(format!(
            "adjacency [{ab}, {an}, {am}] and features [{fb}, {fn_}, {ff}] disagree"
        )));
    }
    if an == 0 {
        return Err(ModelError::ShapeMismatch("graph has no nodes".to_string()));
    }
    if ff != num_features {
        return Err(ModelError::ShapeMismatch(format!(
            "expected {num_features} node features, got {ff}"
        )));
    }
    Ok(())
}
