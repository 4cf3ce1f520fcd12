//! Lazy graph loading.

use histo_core::CellGraph;
use histo_graph::GraphBuilder;

use crate::dataset::InstanceDataset;
use crate::error::Result;

/// A built graph together with the instance it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSample {
    /// The cell graph.
    pub graph: CellGraph,
    /// Instance name.
    pub name: String,
}

/// Iterates `(GraphSample, label)` pairs, building each graph on demand.
///
/// # Example
///
/// ```rust,ignore
/// use histo_data::{GraphDataLoader, InstanceDataset};
///
/// let loader = GraphDataLoader::new(InstanceDataset::from_dir("data/")?, builder);
/// for item in &loader {
///     let (sample, label) = item?;
/// }
/// ```
pub struct GraphDataLoader<G: GraphBuilder> {
    dataset: InstanceDataset,
    builder: G,
}

impl<G: GraphBuilder> GraphDataLoader<G> {
    /// Create a loader.
    pub fn new(dataset: InstanceDataset, builder: G) -> Self {
        Self { dataset, builder }
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Check if there is nothing to load.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// The underlying dataset.
    pub fn dataset(&self) -> &InstanceDataset {
        &self.dataset
    }

    /// Load and build sample `index`.
    pub fn load(&self, index: usize) -> Result<(GraphSample, usize)> {
        let instance = self.dataset.get(index)?;
        let graph = self.builder.build(&instance.objects, instance.image_size)?;
        tracing::debug!(
            name = %instance.name,
            nodes = graph.number_of_nodes(),
            edges = graph.number_of_edges(),
            "built graph"
        );
        Ok((
            GraphSample {
                graph,
                name: instance.name,
            },
            instance.label,
        ))
    }

    /// Iterate over all samples in order.
    pub fn iter(&self) -> GraphDataLoaderIter<'_, G> {
        GraphDataLoaderIter {
            loader: self,
            current: 0,
        }
    }
}

impl<'a, G: GraphBuilder> IntoIterator for &'a GraphDataLoader<G> {
    type Item = Result<(GraphSample, usize)>;
    type IntoIter = GraphDataLoaderIter<'a, G>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`GraphDataLoader`].
pub struct GraphDataLoaderIter<'a, G: GraphBuilder> {
    loader: &'a GraphDataLoader<G>,
    current: usize,
}

impl<'a, G: GraphBuilder> Iterator for GraphDataLoaderIter<'a, G> {
    type Item = Result<(GraphSample, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.loader.len() {
            return None;
        }
        let item = self.loader.load(self.current);
        self.current += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.loader.len() - self.current;
        (remaining, Some(remaining))
    }
}

impl<'a, G: GraphBuilder> ExactSizeIterator for GraphDataLoaderIter<'a, G> {}
