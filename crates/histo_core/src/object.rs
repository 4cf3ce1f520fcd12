//! Detected objects (cells, superpixels).

use serde::{Deserialize, Serialize};

/// One detected entity in an image region.
///
/// Objects are produced by an upstream detection step and handed to a graph
/// builder as-is. The builder copies their attributes; it never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Centroid in pixel coordinates `[x, y]`.
    pub centroid: [f32; 2],
    /// Categorical class id.
    pub label: usize,
    /// Visual descriptor (reserved; not used for topology).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual: Option<Vec<f32>>,
}

impl Object {
    /// Create an object without a visual descriptor.
    pub fn new(centroid: [f32; 2], label: usize) -> Self {
        Self {
            centroid,
            label,
            visual: None,
        }
    }

    /// Attach a visual descriptor.
    #[must_use]
    pub fn with_visual(mut self, visual: Vec<f32>) -> Self {
        self.visual = Some(visual);
        self
    }

    /// Whether both centroid coordinates are finite.
    pub fn has_finite_centroid(&self) -> bool {
        self.centroid.iter().all(|c| c.is_finite())
    }
}
