//! Explanation objective.
//!
//! The loss rewards masks whose masked-graph prediction agrees with the
//! model's prediction on the full graph, while keeping the mask small and
//! close to hard 0/1 decisions:
//!
//! L = CE(p_orig, logits_masked)
//!   + λ_size · mean(m) + λ_ent · mean(H(m))
//!   [+ μ_size · mean(f) + μ_ent · mean(H(f))]
//!
//! where `m` are the edge mask weights, `f` the feature mask weights and `H`
//! the binary entropy.

use burn::prelude::*;
use burn::tensor::activation::log_softmax;

use crate::config::ExplainerParams;
use crate::mask::ExplanationMask;

/// Clamp used inside logarithms.
const LOG_EPS: f32 = 1e-7;

/// Soft-target cross entropy between the original probabilities and the
/// logits on the masked graph, averaged over the batch.
///
/// # Arguments
///
/// * `target_probs` - Original prediction (batch, n_classes), not tracked
/// * `logits` - Logits on the masked graph (batch, n_classes)
pub fn fidelity_loss<B: Backend>(target_probs: Tensor<B, 2>, logits: Tensor<B, 2>) -> Tensor<B, 1> {
    let log_probs = log_softmax(logits, 1);
    (target_probs * log_probs).sum_dim(1).mean().neg()
}

/// Element-wise binary entropy `-m ln m - (1 - m) ln(1 - m)`.
pub fn binary_entropy<B: Backend, const D: usize>(mask: Tensor<B, D>) -> Tensor<B, D> {
    let m = mask.clamp(LOG_EPS, 1.0 - LOG_EPS);
    let complement = m.clone().neg() + 1.0;
    (m.clone() * m.log() + complement.clone() * complement.log()).neg()
}

/// Mean of `values` over the cells where `support` is 1.
///
/// Returns zero when the support is empty.
pub fn masked_mean<B: Backend>(values: Tensor<B, 2>, support: Tensor<B, 2>, count: usize) -> Tensor<B, 1> {
    (values * support).sum() / count.max(1) as f32
}

/// The full explanation objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplanationLoss {
    /// Weight of the mean edge mask.
    pub sparsity: f32,
    /// Weight of the mean edge mask entropy.
    pub entropy: f32,
    /// Weight of the mean feature mask.
    pub feature_sparsity: f32,
    /// Weight of the mean feature mask entropy.
    pub feature_entropy: f32,
}

impl From<&ExplainerParams> for ExplanationLoss {
    fn from(params: &ExplainerParams) -> Self {
        Self {
            sparsity: params.sparsity_coefficient,
            entropy: params.entropy_coefficient,
            feature_sparsity: params.feature_sparsity_coefficient,
            feature_entropy: params.feature_entropy_coefficient,
        }
    }
}

impl ExplanationLoss {
    /// Compute the loss.
    ///
    /// # Arguments
    ///
    /// * `target_probs` - Original prediction (1, n_classes)
    /// * `logits` - Logits on the masked graph (1, n_classes)
    /// * `mask` - The mask being optimized
    /// * `edges` - Binary adjacency (N, N) selecting the cells regularized
    /// * `num_edges` - Number of ones in `edges`
    pub fn forward<B: Backend>(
        &self,
        target_probs: Tensor<B, 2>,
        logits: Tensor<B, 2>,
        mask: &ExplanationMask<B>,
        edges: Tensor<B, 2>,
        num_edges: usize,
    ) -> Tensor<B, 1> {
        let mut loss = fidelity_loss(target_probs, logits);

        let edge_weights = mask.adjacency_weights();
        loss = loss + masked_mean(edge_weights.clone(), edges.clone(), num_edges) * self.sparsity;
        loss = loss + masked_mean(binary_entropy(edge_weights), edges, num_edges) * self.entropy;

        if let Some(feature_weights) = mask.feature_weights() {
            loss = loss + feature_weights.clone().mean() * self.feature_sparsity;
            loss = loss + binary_entropy(feature_weights).mean() * self.feature_entropy;
        }

        loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    fn scalar(t: Tensor<TestBackend, 1>) -> f32 {
        t.into_scalar().elem::<f32>()
    }

    #[test]
    fn test_fidelity_minimum_is_target_entropy() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 1>::from_floats([0.5, 0.5], &device).reshape([1, 2]);
        let logits = Tensor::<TestBackend, 1>::from_floats([1.0, 1.0], &device).reshape([1, 2]);
        let loss = scalar(fidelity_loss(target, logits));
        assert!((loss - 2.0f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_fidelity_penalizes_disagreement() {
        let device = Default::default();
        let target = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device).reshape([1, 2]);
        let agree = Tensor::<TestBackend, 1>::from_floats([5.0, -5.0], &device).reshape([1, 2]);
        let disagree = Tensor::<TestBackend, 1>::from_floats([-5.0, 5.0], &device).reshape([1, 2]);
        assert!(scalar(fidelity_loss(target.clone(), agree)) < scalar(fidelity_loss(target, disagree)));
    }

    #[test]
    fn test_binary_entropy_values() {
        let device = Default::default();
        let m = Tensor::<TestBackend, 1>::from_floats([0.5, 0.0, 1.0], &device);
        let h: Vec<f32> = binary_entropy(m).into_data().to_vec().unwrap();
        assert!((h[0] - 2.0f32.ln()).abs() < 1e-5);
        assert!(h[1] < 1e-4);
        assert!(h[2] < 1e-4);
    }

    #[test]
    fn test_masked_mean_uses_support_only() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 1>::from_floats([0.2, 0.8, 0.4, 100.0], &device).reshape([2, 2]);
        let support = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 1.0, 0.0], &device).reshape([2, 2]);
        let mean = scalar(masked_mean(values, support, 2));
        assert!((mean - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_masked_mean_empty_support_is_zero() {
        let device = Default::default();
        let values = Tensor::<TestBackend, 2>::ones([2, 2], &device);
        let support = Tensor::<TestBackend, 2>::zeros([2, 2], &device);
        assert_eq!(scalar(masked_mean(values, support, 0)), 0.0);
    }

    #[test]
    fn test_regularizers_add_to_fidelity() {
        let device = Default::default();
        let mask = ExplanationMask::<TestBackend>::new(2, 0.0, None, &device);
        let target = Tensor::<TestBackend, 1>::from_floats([0.5, 0.5], &device).reshape([1, 2]);
        let logits = Tensor::<TestBackend, 1>::from_floats([0.0, 0.0], &device).reshape([1, 2]);
        let edges = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 1.0, 0.0], &device).reshape([2, 2]);

        let loss = ExplanationLoss {
            sparsity: 1.0,
            entropy: 1.0,
            feature_sparsity: 0.0,
            feature_entropy: 0.0,
        };
        let value = scalar(loss.forward(target, logits, &mask, edges, 2));
        // ln 2 (fidelity) + 0.5 (size) + ln 2 (entropy at 0.5)
        assert!((value - (2.0 * 2.0f32.ln() + 0.5)).abs() < 1e-5);
    }
}
