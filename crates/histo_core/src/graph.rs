//! Cell / tissue graph representation.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::object::Object;

/// Node attribute key for centroids.
pub const CENTROID: &str = "centroid";
/// Node attribute key for class labels.
pub const LABEL: &str = "label";
/// Node attribute key for visual descriptors.
pub const VISUAL: &str = "visual";

/// Graph over the objects detected in one image region.
///
/// Nodes are index-addressed in detection order. Node attributes are kept as
/// parallel arrays ([`CENTROID`], [`LABEL`] and optionally [`VISUAL`]).
/// Edges are undirected but stored as paired directed edges, so `(u, v)` is
/// present iff `(v, u)` is. Self loops are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellGraph {
    image_size: [u32; 2],
    centroids: Vec<[f32; 2]>,
    labels: Vec<usize>,
    visual: Option<Vec<Vec<f32>>>,
    edges: Vec<(usize, usize)>,
    edge_features: Option<Vec<Vec<f32>>>,
}

impl CellGraph {
    /// Create an edgeless graph whose nodes copy the objects' attributes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if `objects` is empty, if the image
    /// size has a zero side, or if only some objects carry a visual descriptor
    /// (or their lengths differ).
    pub fn from_objects(objects: &[Object], image_size: [u32; 2]) -> Result<Self> {
        if objects.is_empty() {
            return Err(CoreError::InvalidInput(
                "cannot build a graph from an empty object list".to_string(),
            ));
        }
        if image_size.contains(&0) {
            return Err(CoreError::InvalidInput(format!(
                "image size must be non-zero, got {image_size:?}"
            )));
        }

        let centroids = objects.iter().map(|o| o.centroid).collect();
        let labels = objects.iter().map(|o| o.label).collect();

        let with_visual = objects.iter().filter(|o| o.visual.is_some()).count();
        let visual = if with_visual == 0 {
            None
        } else if with_visual == objects.len() {
            let rows: Vec<Vec<f32>> = objects
                .iter()
                .filter_map(|o| o.visual.clone())
                .collect();
            let width = rows[0].len();
            if width == 0 || rows.iter().any(|r| r.len() != width) {
                return Err(CoreError::InvalidInput(
                    "visual descriptors must be non-empty and share one length".to_string(),
                ));
            }
            Some(rows)
        } else {
            return Err(CoreError::InvalidInput(format!(
                "{} of {} objects carry a visual descriptor",
                with_visual,
                objects.len()
            )));
        };

        Ok(Self {
            image_size,
            centroids,
            labels,
            visual,
            edges: Vec::new(),
            edge_features: None,
        })
    }

    /// Connect `u` and `v` in both directions.
    ///
    /// `features`, when given, is attached to both directed edges. A graph is
    /// either fully edge-encoded or not at all.
    pub fn add_undirected_edge(
        &mut self,
        u: usize,
        v: usize,
        features: Option<Vec<f32>>,
    ) -> Result<()> {
        let n = self.number_of_nodes();
        if u >= n || v >= n {
            return Err(CoreError::InvalidInput(format!(
                "edge ({u}, {v}) out of bounds for {n} nodes"
            )));
        }
        if u == v {
            return Err(CoreError::InvalidInput(format!("self loop on node {u}")));
        }

        match (features, self.edges.is_empty()) {
            (Some(f), true) => self.edge_features = Some(vec![f.clone(), f]),
            (None, true) => self.edge_features = None,
            (Some(f), false) => match self.edge_features.as_mut() {
                Some(all) => {
                    all.push(f.clone());
                    all.push(f);
                }
                None => {
                    return Err(CoreError::InvalidInput(
                        "edge features given for a graph without edge encoding".to_string(),
                    ))
                }
            },
            (None, false) => {
                if self.edge_features.is_some() {
                    return Err(CoreError::InvalidInput(
                        "missing edge features on an edge-encoded graph".to_string(),
                    ));
                }
            }
        }

        self.edges.push((u, v));
        self.edges.push((v, u));
        Ok(())
    }

    /// Number of nodes.
    pub fn number_of_nodes(&self) -> usize {
        self.centroids.len()
    }

    /// Number of directed edges (twice the number of connected pairs).
    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    /// Image size `[width, height]` the graph was built for.
    pub fn image_size(&self) -> [u32; 2] {
        self.image_size
    }

    /// Directed edges in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Whether the directed edge `(u, v)` exists.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.edges.contains(&(u, v))
    }

    /// Node centroids.
    pub fn centroids(&self) -> &[[f32; 2]] {
        &self.centroids
    }

    /// Node labels.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Node visual descriptors, if every object carried one.
    pub fn visual(&self) -> Option<&[Vec<f32>]> {
        self.visual.as_deref()
    }

    /// Per-edge features, parallel to [`edges`](Self::edges).
    pub fn edge_features(&self) -> Option<&[Vec<f32>]> {
        self.edge_features.as_deref()
    }

    /// Width of the model input feature rows.
    pub fn num_node_features(&self) -> usize {
        match &self.visual {
            Some(rows) => rows[0].len(),
            None => 3,
        }
    }

    /// Model input features, row-major `(N, F)`.
    ///
    /// Visual descriptors when present; otherwise the centroid normalized by
    /// the image size followed by the label.
    pub fn node_features(&self) -> Vec<f32> {
        match &self.visual {
            Some(rows) => rows.iter().flatten().copied().collect(),
            None => {
                let [w, h] = self.image_size;
                self.centroids
                    .iter()
                    .zip(&self.labels)
                    .flat_map(|(c, &l)| [c[0] / w as f32, c[1] / h as f32, l as f32])
                    .collect()
            }
        }
    }

    /// Dense binary adjacency, row-major `(N, N)`.
    pub fn adjacency(&self) -> Vec<f32> {
        let n = self.number_of_nodes();
        let mut adj = vec![0.0; n * n];
        for &(u, v) in &self.edges {
            adj[u * n + v] = 1.0;
        }
        adj
    }
}
