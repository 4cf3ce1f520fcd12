//! Threshold graph builder over centroid distances.

use histo_core::{l2_distance, CellGraph, CoreError, Object, Result};

use crate::builder::GraphBuilder;
use crate::config::GraphBuilderConfig;

/// Connects every pair of objects whose kernel weight exceeds a threshold.
///
/// For each unordered pair `(i, j)` the Euclidean distance between centroids
/// is mapped through the configured [`EdgeKernel`](histo_core::EdgeKernel);
/// both `(i, j)` and `(j, i)` are added iff the weight is strictly greater
/// than `edge_threshold`. The scan is O(n²), which is fine for the object
/// count of a single tile.
#[derive(Debug, Clone)]
pub struct KnnGraphBuilder {
    config: GraphBuilderConfig,
}

impl KnnGraphBuilder {
    /// Create a builder.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Configuration`] if the config is invalid.
    pub fn new(config: GraphBuilderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The builder configuration.
    pub fn config(&self) -> &GraphBuilderConfig {
        &self.config
    }

    /// Kernel weight between two objects.
    pub fn edge_weight(&self, a: &Object, b: &Object) -> f32 {
        self.config.kernel.weight(l2_distance(a.centroid, b.centroid))
    }

    fn build_topology(&self, objects: &[Object], graph: &mut CellGraph) -> Result<()> {
        for i in 0..objects.len() {
            for j in (i + 1)..objects.len() {
                let distance = l2_distance(objects[i].centroid, objects[j].centroid);
                let weight = self.config.kernel.weight(distance);
                if weight > self.config.edge_threshold {
                    let features = self
                        .config
                        .edge_encoding
                        .then(|| vec![distance, weight]);
                    graph.add_undirected_edge(i, j, features)?;
                }
            }
        }
        Ok(())
    }
}

impl GraphBuilder for KnnGraphBuilder {
    fn build(&self, objects: &[Object], image_size: [u32; 2]) -> Result<CellGraph> {
        if let Some(idx) = objects.iter().position(|o| !o.has_finite_centroid()) {
            return Err(CoreError::InvalidInput(format!(
                "object {idx} has a non-finite centroid {:?}",
                objects[idx].centroid
            )));
        }

        let mut graph = CellGraph::from_objects(objects, image_size)?;
        self.build_topology(objects, &mut graph)?;

        tracing::debug!(
            "Built graph with {} nodes and {} edges (threshold {})",
            graph.number_of_nodes(),
            graph.number_of_edges(),
            self.config.edge_threshold
        );
        Ok(graph)
    }

    fn name(&self) -> &str {
        "KnnGraphBuilder"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histo_core::EdgeKernel;

    fn line(n: usize) -> Vec<Object> {
        (0..n).map(|i| Object::new([i as f32, 0.0], i % 3)).collect()
    }

    fn builder(threshold: f32, encoding: bool) -> KnnGraphBuilder {
        KnnGraphBuilder::new(GraphBuilderConfig::new(threshold, encoding)).unwrap()
    }

    #[test]
    fn test_unit_line_connects_only_neighbours() {
        // inverse kernel: w(1) = 0.5, w(2) = 1/3
        let graph = builder(0.4, false).build(&line(5), [10, 10]).unwrap();
        assert_eq!(graph.number_of_nodes(), 5);
        assert_eq!(graph.number_of_edges(), 8);
        for i in 0..4 {
            assert!(graph.has_edge(i, i + 1));
            assert!(graph.has_edge(i + 1, i));
        }
        assert!(!graph.has_edge(0, 2));
    }

    #[test]
    fn test_nodes_follow_input_order() {
        let objects = vec![
            Object::new([5.0, 5.0], 7),
            Object::new([0.0, 0.0], 1),
            Object::new([9.0, 1.0], 4),
        ];
        let graph = builder(0.1, false).build(&objects, [10, 10]).unwrap();
        assert_eq!(graph.number_of_nodes(), objects.len());
        assert_eq!(graph.labels(), &[7, 1, 4]);
        for (node, obj) in graph.centroids().iter().zip(&objects) {
            assert_eq!(*node, obj.centroid);
        }
    }

    #[test]
    fn test_edges_are_symmetric_without_self_loops() {
        let objects: Vec<Object> = (0..12)
            .map(|i| Object::new([(i * 7 % 11) as f32, (i * 3 % 5) as f32], 0))
            .collect();
        let graph = builder(0.2, false).build(&objects, [16, 16]).unwrap();
        assert!(graph.number_of_edges() > 0);
        for &(u, v) in graph.edges() {
            assert_ne!(u, v);
            assert!(graph.has_edge(v, u));
        }
    }

    #[test]
    fn test_weight_monotone_in_distance() {
        let b = builder(0.5, false);
        let a = Object::new([0.0, 0.0], 0);
        let near = Object::new([1.0, 1.0], 0);
        let far = Object::new([4.0, 3.0], 0);
        assert!(b.edge_weight(&a, &near) >= b.edge_weight(&a, &far));
    }

    #[test]
    fn test_build_is_deterministic() {
        let objects: Vec<Object> = (0..20)
            .map(|i| Object::new([(i * 13 % 17) as f32, (i * 5 % 9) as f32], i % 4))
            .collect();
        let b = KnnGraphBuilder::new(
            GraphBuilderConfig::new(0.3, true).with_kernel(EdgeKernel::Gaussian { sigma: 3.0 }),
        )
        .unwrap();
        let first = b.build(&objects, [32, 32]).unwrap();
        let second = b.build(&objects, [32, 32]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_edge_encoding_attaches_distance_and_weight() {
        let graph = builder(0.4, true).build(&line(3), [10, 10]).unwrap();
        let feats = graph.edge_features().unwrap();
        assert_eq!(feats.len(), graph.number_of_edges());
        assert_eq!(feats[0], vec![1.0, 0.5]);
        assert_eq!(feats[0], feats[1]);
    }

    #[test]
    fn test_no_edge_features_without_encoding() {
        let graph = builder(0.4, false).build(&line(3), [10, 10]).unwrap();
        assert!(graph.edge_features().is_none());
    }

    #[test]
    fn test_single_object_gives_edgeless_graph() {
        let graph = builder(0.0, false).build(&line(1), [10, 10]).unwrap();
        assert_eq!(graph.number_of_nodes(), 1);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn test_empty_objects_rejected() {
        let err = builder(0.4, false).build(&[], [10, 10]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_centroid_rejected() {
        let objects = vec![Object::new([0.0, 0.0], 0), Object::new([f32::NAN, 1.0], 0)];
        let err = builder(0.4, false).build(&objects, [10, 10]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
