//! Thresholding learned masks into an explanation subgraph.

use std::collections::BTreeMap;

use burn::prelude::*;
use histo_core::CellGraph;
use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, Result};
use crate::explainer::ExplanationOutput;

/// The subgraph kept by an explanation.
///
/// Nodes keep their index in the original graph. Edges are undirected,
/// stored once as `(u, v, weight)` with `u < v`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationGraph {
    nodes: Vec<usize>,
    centroids: Vec<[f32; 2]>,
    edges: Vec<(usize, usize, f32)>,
}

impl ExplanationGraph {
    /// Build the explanation graph from dense masked tensors.
    ///
    /// A node is dropped when masking zeroed its feature row: the masked row
    /// sums to zero while the row in `original_features` (row-major, same
    /// shape as `masked_features`) does not. Rows that already summed to zero
    /// before masking, such as an object at the image origin with label 0,
    /// are kept. An edge `(u, v)` between kept nodes is kept when
    /// `max(A[u][v], A[v][u]) > adj_thresh`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidInput`] when the tensor shapes disagree
    /// with each other, with `original_features` or with `centroids`.
    pub fn from_masks<B: Backend>(
        masked_adjacency: Tensor<B, 2>,
        masked_features: Tensor<B, 2>,
        original_features: &[f32],
        centroids: &[[f32; 2]],
        adj_thresh: f32,
    ) -> Result<Self> {
        let [n, m] = masked_adjacency.dims();
        let [fn_, f] = masked_features.dims();
        if n != m || n != fn_ || n != centroids.len() {
            return Err(ExplainError::InvalidInput(format!(
                "masked adjacency [{n}, {m}], features [{fn_}, {f}] and {} centroids disagree",
                centroids.len()
            )));
        }
        if original_features.len() != n * f {
            return Err(ExplainError::InvalidInput(format!(
                "expected {} original feature values, got {}",
                n * f,
                original_features.len()
            )));
        }

        let adjacency = read(masked_adjacency)?;
        let features = read(masked_features)?;

        let row_sum = |values: &[f32], i: usize| -> f32 { values[i * f..(i + 1) * f].iter().sum() };
        let keep: Vec<bool> = (0..n)
            .map(|i| row_sum(&features, i) != 0.0 || row_sum(original_features, i) == 0.0)
            .collect();

        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                if !(keep[u] && keep[v]) {
                    continue;
                }
                let weight = adjacency[u * n + v].max(adjacency[v * n + u]);
                if weight > adj_thresh {
                    edges.push((u, v, weight));
                }
            }
        }

        let nodes: Vec<usize> = (0..n).filter(|&i| keep[i]).collect();
        let centroids = nodes.iter().map(|&i| centroids[i]).collect();

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            adj_thresh,
            "extracted explanation graph"
        );

        Ok(Self {
            nodes,
            centroids,
            edges,
        })
    }

    /// Build the explanation graph for an [`ExplanationOutput`] of `graph`.
    pub fn from_output<B: Backend>(
        output: &ExplanationOutput<B>,
        graph: &CellGraph,
        adj_thresh: f32,
    ) -> Result<Self> {
        Self::from_masks(
            output.masked_adjacency.clone(),
            output.masked_features.clone(),
            &graph.node_features(),
            graph.centroids(),
            adj_thresh,
        )
    }

    /// Build the explanation graph from explicit edge weights.
    ///
    /// All `num_nodes` nodes are kept. Weights given for both directions of a
    /// pair are combined with `max`.
    ///
    /// # Errors
    ///
    /// Returns [`ExplainError::InvalidInput`] for out-of-range indices.
    pub fn from_edge_weights(
        num_nodes: usize,
        weights: &[((usize, usize), f32)],
        threshold: f32,
    ) -> Result<Self> {
        let mut combined: BTreeMap<(usize, usize), f32> = BTreeMap::new();
        for &((u, v), w) in weights {
            if u >= num_nodes || v >= num_nodes {
                return Err(ExplainError::InvalidInput(format!(
                    "edge ({u}, {v}) out of range for {num_nodes} nodes"
                )));
            }
            if u == v {
                continue;
            }
            let key = (u.min(v), u.max(v));
            let entry = combined.entry(key).or_insert(w);
            *entry = entry.max(w);
        }

        let edges = combined
            .into_iter()
            .filter(|&(_, w)| w > threshold)
            .map(|((u, v), w)| (u, v, w))
            .collect();

        Ok(Self {
            nodes: (0..num_nodes).collect(),
            centroids: Vec::new(),
            edges,
        })
    }

    /// Number of kept nodes.
    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of kept undirected edges.
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Indices of kept nodes in the original graph.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Centroids of kept nodes; empty when built from edge weights.
    pub fn centroids(&self) -> &[[f32; 2]] {
        &self.centroids
    }

    /// Kept edges as `(u, v, weight)`, `u < v`.
    pub fn edges(&self) -> &[(usize, usize, f32)] {
        &self.edges
    }
}

fn read<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| ExplainError::Tensor(format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use histo_core::Object;

    type TestBackend = NdArray;

    fn tensor(values: &[f32], shape: [usize; 2]) -> Tensor<TestBackend, 2> {
        Tensor::<TestBackend, 1>::from_floats(values, &Default::default()).reshape(shape)
    }

    #[test]
    fn test_literal_mask_keeps_strong_edge() {
        let graph =
            ExplanationGraph::from_edge_weights(3, &[((0, 1), 0.9), ((1, 2), 0.1)], 0.5).unwrap();
        assert_eq!(graph.number_of_nodes(), 3);
        assert_eq!(graph.number_of_edges(), 1);
        assert_eq!(graph.edges(), &[(0, 1, 0.9)]);
    }

    #[test]
    fn test_edge_weights_combine_directions() {
        let graph =
            ExplanationGraph::from_edge_weights(3, &[((2, 1), 0.7), ((1, 2), 0.2)], 0.5).unwrap();
        assert_eq!(graph.edges(), &[(1, 2, 0.7)]);
        assert!(ExplanationGraph::from_edge_weights(2, &[((0, 5), 1.0)], 0.5).is_err());
    }

    #[test]
    fn test_from_masks_threshold_and_symmetry() {
        #[rustfmt::skip]
        let adjacency = tensor(&[
            0.0, 0.9, 0.0,
            0.3, 0.0, 0.2,
            0.0, 0.6, 0.0,
        ], [3, 3]);
        let features = tensor(&[1.0, 0.0, 0.0, 2.0, 3.0, 3.0], [3, 2]);
        let centroids = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];

        let original = [1.0, 0.0, 0.0, 2.0, 3.0, 3.0];

        let graph =
            ExplanationGraph::from_masks(adjacency, features, &original, &centroids, 0.5).unwrap();
        assert_eq!(graph.nodes(), &[0, 1, 2]);
        assert_eq!(graph.edges(), &[(0, 1, 0.9), (1, 2, 0.6)]);
    }

    #[test]
    fn test_from_masks_drops_masked_out_nodes() {
        let adjacency = tensor(&[0.0, 0.9, 0.9, 0.0], [2, 2]);
        let features = tensor(&[0.0, 0.0, 1.0, 1.0], [2, 2]);
        let original = [2.0, 3.0, 1.0, 1.0];
        let centroids = [[0.0, 0.0], [5.0, 5.0]];

        let graph =
            ExplanationGraph::from_masks(adjacency, features, &original, &centroids, 0.5).unwrap();
        assert_eq!(graph.nodes(), &[1]);
        assert_eq!(graph.centroids(), &[[5.0, 5.0]]);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn test_from_masks_shape_mismatch() {
        let adjacency = tensor(&[0.0; 4], [2, 2]);
        let features = tensor(&[1.0; 3], [3, 1]);
        let result =
            ExplanationGraph::from_masks(adjacency, features, &[1.0; 3], &[[0.0, 0.0]; 2], 0.5);
        assert!(matches!(result, Err(ExplainError::InvalidInput(_))));

        let adjacency = tensor(&[0.0; 4], [2, 2]);
        let features = tensor(&[1.0; 2], [2, 1]);
        let result =
            ExplanationGraph::from_masks(adjacency, features, &[1.0; 3], &[[0.0, 0.0]; 2], 0.5);
        assert!(matches!(result, Err(ExplainError::InvalidInput(_))));
    }

    #[test]
    fn test_from_masks_uses_row_sum() {
        let adjacency = tensor(&[0.0, 0.8, 0.8, 0.0], [2, 2]);
        // Feature weights [0.25, 0.5] cancel the first row but not the second.
        let features = tensor(&[0.5, -0.5, 0.25, -0.5], [2, 2]);
        let original = [2.0, -1.0, 1.0, -1.0];
        let centroids = [[0.0, 0.0], [1.0, 0.0]];

        let graph =
            ExplanationGraph::from_masks(adjacency, features, &original, &centroids, 0.5).unwrap();
        assert_eq!(graph.nodes(), &[1]);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn test_object_at_origin_is_kept() {
        let objects = [
            Object::new([0.0, 0.0], 0),
            Object::new([1.0, 0.0], 1),
            Object::new([2.0, 0.0], 1),
        ];
        let mut graph = CellGraph::from_objects(&objects, [10, 10]).unwrap();
        graph.add_undirected_edge(0, 1, None).unwrap();
        graph.add_undirected_edge(1, 2, None).unwrap();

        let features = graph.node_features();
        assert!(features[..3].iter().all(|&x| x == 0.0));

        let output = ExplanationOutput::<TestBackend> {
            masked_adjacency: tensor(&graph.adjacency(), [3, 3]) * 0.95,
            masked_features: tensor(&features, [3, 3]),
            original_prediction: vec![0.5, 0.5],
            explanation_prediction: vec![0.5, 0.5],
            loss_history: vec![1.0],
            label: 0,
        };

        let explanation = ExplanationGraph::from_output(&output, &graph, 0.0).unwrap();
        assert_eq!(explanation.nodes(), &[0, 1, 2]);
        assert_eq!(explanation.centroids()[0], [0.0, 0.0]);
        let edges: Vec<(usize, usize)> = explanation.edges().iter().map(|&(u, v, _)| (u, v)).collect();
        assert_eq!(edges, vec![(0, 1), (1, 2)]);
    }
}
