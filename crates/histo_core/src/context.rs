//! Explicit execution context.

use burn::prelude::*;

/// Device on which graphs, models and masks live.
///
/// Passed to every component constructor instead of probing for an
/// accelerator behind the caller's back.
#[derive(Debug, Clone)]
pub struct ExecutionContext<B: Backend> {
    device: B::Device,
}

impl<B: Backend> ExecutionContext<B> {
    /// Create a context for the given device.
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// The device tensors are allocated on.
    pub fn device(&self) -> &B::Device {
        &self.device
    }
}

impl<B: Backend> Default for ExecutionContext<B> {
    fn default() -> Self {
        Self::new(Default::default())
    }
}
