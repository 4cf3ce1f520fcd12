//! Distance and edge-weight functions.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Euclidean distance between two centroids.
pub fn l2_distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Monotone kernel mapping a centroid distance to an edge weight.
///
/// Every variant satisfies `weight(0) = 1`, is strictly decreasing in the
/// distance, and stays positive for any finite distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeKernel {
    /// `1 / (1 + d / scale)`.
    Inverse {
        /// Distance at which the weight halves.
        scale: f32,
    },
    /// `exp(-d² / (2σ²))`.
    Gaussian {
        /// Kernel bandwidth.
        sigma: f32,
    },
}

impl Default for EdgeKernel {
    fn default() -> Self {
        Self::Inverse { scale: 1.0 }
    }
}

impl EdgeKernel {
    /// Check that the kernel parameters are usable.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Inverse { scale } if !(scale.is_finite() && scale > 0.0) => Err(
                CoreError::Configuration(format!("inverse kernel scale must be > 0, got {scale}")),
            ),
            Self::Gaussian { sigma } if !(sigma.is_finite() && sigma > 0.0) => Err(
                CoreError::Configuration(format!("gaussian kernel sigma must be > 0, got {sigma}")),
            ),
            _ => Ok(()),
        }
    }

    /// Edge weight for a given distance.
    pub fn weight(&self, distance: f32) -> f32 {
        match *self {
            Self::Inverse { scale } => 1.0 / (1.0 + distance / scale),
            Self::Gaussian { sigma } => (-(distance * distance) / (2.0 * sigma * sigma)).exp(),
        }
    }
}
