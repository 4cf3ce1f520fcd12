//! Model checkpointing.
//!
//! Weights are saved and loaded through Burn's record system with the named
//! MessagePack recorder. Every model variant has a statically-typed record
//! (derived alongside its `Module`), so a checkpoint can only be loaded into a
//! model whose parameter layout matches it. Parameter names are never
//! interpreted at runtime.
//!
//! # Example
//!
//! ```rust,ignore
//! use histo_models::checkpoint::{save_checkpoint, load_checkpoint};
//! use histo_models::CellGraphModelConfig;
//!
//! let model = CellGraphModelConfig::new(3, 4).init::<NdArray>(&device);
//! save_checkpoint(&model, "runs/cell_graph_model.mpk")?;
//!
//! let fresh = CellGraphModelConfig::new(3, 4).init::<NdArray>(&device);
//! let restored = load_checkpoint(fresh, "runs/cell_graph_model.mpk", &device)?;
//! ```

use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};

/// File extension used by the named MessagePack recorder.
pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Checkpoint-related errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// Checkpoint file does not exist.
    #[error("Checkpoint not found: {0}")]
    NotFound(PathBuf),

    /// Error saving checkpoint.
    #[error("Failed to save checkpoint: {0}")]
    Save(String),

    /// Error loading checkpoint.
    #[error("Failed to load checkpoint: {0}")]
    Load(String),
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Path the recorder actually reads/writes for `path`.
pub fn checkpoint_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension(CHECKPOINT_EXTENSION)
}

/// Save a model to a checkpoint file.
///
/// The extension is forced to `.mpk`.
pub fn save_checkpoint<B, M>(model: &M, path: impl AsRef<Path>) -> Result<()>
where
    B: Backend,
    M: Module<B>,
{
    let path = checkpoint_path(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CheckpointError::Save(e.to_string()))?;
    }
    model
        .clone()
        .save_file(path.clone(), &recorder())
        .map_err(|e| CheckpointError::Save(e.to_string()))?;

    tracing::info!("Saved checkpoint to {:?}", path);
    Ok(())
}

/// Load checkpoint weights into a freshly constructed model.
///
/// # Errors
///
/// Returns [`CheckpointError::NotFound`] if the file does not exist and
/// [`CheckpointError::Load`] if its record does not fit the model.
pub fn load_checkpoint<B, M>(model: M, path: impl AsRef<Path>, device: &B::Device) -> Result<M>
where
    B: Backend,
    M: Module<B>,
{
    let path = checkpoint_path(path);
    if !path.is_file() {
        return Err(CheckpointError::NotFound(path));
    }

    let model = model
        .load_file(path.clone(), &recorder(), device)
        .map_err(|e| CheckpointError::Load(e.to_string()))?;

    tracing::info!("Loaded checkpoint from {:?}", path);
    Ok(model)
}
