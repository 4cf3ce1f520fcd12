//! Dense tensor view of a cell graph.

use burn::prelude::*;

use crate::error::{CoreError, Result};
use crate::graph::CellGraph;

/// Adjacency and node features of one or more graphs as dense Burn tensors.
///
/// Shapes follow the `(B, N, N)` / `(B, N, F)` convention. For explanation the
/// batch dimension is always 1.
///
/// # Example
///
/// ```rust,ignore
/// use histo_core::GraphTensors;
///
/// let tensors = GraphTensors::<NdArray>::from_graph(&graph, &device);
/// assert_eq!(tensors.num_nodes(), graph.number_of_nodes());
/// ```
#[derive(Debug, Clone)]
pub struct GraphTensors<B: Backend> {
    adjacency: Tensor<B, 3>,
    features: Tensor<B, 3>,
}

impl<B: Backend> GraphTensors<B> {
    /// Wrap existing tensors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShapeMismatch`] if the adjacency is not square, or
    /// if batch or node counts disagree with the features.
    pub fn new(adjacency: Tensor<B, 3>, features: Tensor<B, 3>) -> Result<Self> {
        let [ab, an, am] = adjacency.dims();
        let [fb, fn_, _] = features.dims();
        if an != am {
            return Err(CoreError::ShapeMismatch(format!(
                "adjacency must be square, got [{ab}, {an}, {am}]"
            )));
        }
        if ab != fb || an != fn_ {
            return Err(CoreError::ShapeMismatch(format!(
                "adjacency [{ab}, {an}, {am}] does not match features batch/nodes [{fb}, {fn_}]"
            )));
        }
        Ok(Self {
            adjacency,
            features,
        })
    }

    /// Build the dense view of a single graph (batch of one).
    pub fn from_graph(graph: &CellGraph, device: &B::Device) -> Self {
        let n = graph.number_of_nodes();
        let f = graph.num_node_features();

        let adjacency =
            Tensor::<B, 1>::from_floats(graph.adjacency().as_slice(), device).reshape([1, n, n]);
        let features =
            Tensor::<B, 1>::from_floats(graph.node_features().as_slice(), device).reshape([1, n, f]);

        Self {
            adjacency,
            features,
        }
    }

    /// Adjacency tensor `(B, N, N)`.
    pub fn adjacency(&self) -> &Tensor<B, 3> {
        &self.adjacency
    }

    /// Node feature tensor `(B, N, F)`.
    pub fn features(&self) -> &Tensor<B, 3> {
        &self.features
    }

    /// Consume self and return `(adjacency, features)`.
    pub fn into_parts(self) -> (Tensor<B, 3>, Tensor<B, 3>) {
        (self.adjacency, self.features)
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.dims()[1]
    }

    /// Node feature width.
    pub fn num_features(&self) -> usize {
        self.features.dims()[2]
    }

    /// Device the tensors live on.
    pub fn device(&self) -> B::Device {
        self.adjacency.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NdArray;
    use crate::object::Object;

    type TestBackend = NdArray;

    #[test]
    fn test_from_graph_shapes() {
        let device = Default::default();
        let objects = vec![
            Object::new([0.0, 0.0], 0),
            Object::new([1.0, 0.0], 1),
            Object::new([2.0, 0.0], 0),
            Object::new([3.0, 0.0], 1),
        ];
        let mut graph = CellGraph::from_objects(&objects, [4, 4]).unwrap();
        graph.add_undirected_edge(0, 1, None).unwrap();

        let tensors = GraphTensors::<TestBackend>::from_graph(&graph, &device);
        assert_eq!(tensors.adjacency().dims(), [1, 4, 4]);
        assert_eq!(tensors.features().dims(), [1, 4, 3]);
        assert_eq!(tensors.num_nodes(), 4);
        assert_eq!(tensors.num_features(), 3);

        let adj: Vec<f32> = tensors.adjacency().clone().into_data().to_vec().unwrap();
        assert_eq!(adj[1], 1.0);
        assert_eq!(adj[4], 1.0);
        assert_eq!(adj.iter().sum::<f32>(), 2.0);
    }

    #[test]
    fn test_new_rejects_mismatched_shapes() {
        let device = Default::default();
        let adj = Tensor::<TestBackend, 3>::zeros([1, 3, 3], &device);
        let feats = Tensor::<TestBackend, 3>::zeros([1, 4, 2], &device);
        assert!(GraphTensors::new(adj, feats).is_err());

        let adj = Tensor::<TestBackend, 3>::zeros([1, 3, 2], &device);
        let feats = Tensor::<TestBackend, 3>::zeros([1, 3, 2], &device);
        assert!(GraphTensors::new(adj, feats).is_err());
    }
}
