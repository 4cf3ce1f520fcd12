//! Graph builder trait.

use histo_core::{CellGraph, Object, Result};

/// Turns the objects detected in one image region into a graph.
///
/// # Implementation Notes
///
/// - Node `i` of the returned graph must correspond to `objects[i]`
/// - The edge set must be symmetric and free of self loops
/// - Builders must be deterministic: identical inputs give identical graphs
///
/// # Example
///
/// ```rust,ignore
/// use histo_core::{CellGraph, Object, Result};
/// use histo_graph::GraphBuilder;
///
/// struct EdgelessBuilder;
///
/// impl GraphBuilder for EdgelessBuilder {
///     fn build(&self, objects: &[Object], image_size: [u32; 2]) -> Result<CellGraph> {
///         CellGraph::from_objects(objects, image_size)
///     }
/// }
/// ```
pub trait GraphBuilder: Send + Sync {
    /// Build the graph for `objects` found in an image of `image_size`
    /// (`[width, height]`).
    fn build(&self, objects: &[Object], image_size: [u32; 2]) -> Result<CellGraph>;

    /// Get the name of this builder for logging/debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
