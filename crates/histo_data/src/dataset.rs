//! Instance files and datasets.

use std::fs;
use std::path::{Path, PathBuf};

use histo_core::Object;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// One annotated image reduced to its detected objects.
///
/// Stored on disk as
///
/// ```json
/// { "name": "img_0", "label": 1, "image_size": [1024, 768], "objects": [...] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Identifier used for output file names.
    pub name: String,
    /// Class label.
    pub label: usize,
    /// Image `[width, height]` in pixels.
    pub image_size: [u32; 2],
    /// Detected objects.
    pub objects: Vec<Object>,
}

impl Instance {
    /// Read an instance file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| DataError::FormatError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write the instance as pretty JSON.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self).map_err(|source| DataError::FormatError {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(Instance),
}

/// An ordered collection of instances.
///
/// Directory-backed datasets only list their files up front; each file is
/// read when the sample is requested.
#[derive(Debug, Clone, Default)]
pub struct InstanceDataset {
    sources: Vec<Source>,
}

impl InstanceDataset {
    /// List the `*.json` files of `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ResourceNotFound`] if `dir` is not a directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DataError::ResourceNotFound(format!(
                "data directory {} does not exist",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        tracing::info!("Found {} instance files in {:?}", files.len(), dir);
        Ok(Self {
            sources: files.into_iter().map(Source::File).collect(),
        })
    }

    /// Wrap in-memory instances.
    pub fn from_instances(instances: Vec<Instance>) -> Self {
        Self {
            sources: instances.into_iter().map(Source::Memory).collect(),
        }
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Keep only the first `n` instances.
    #[must_use]
    pub fn take(mut self, n: usize) -> Self {
        self.sources.truncate(n);
        self
    }

    /// Get the instance at `index`, reading it from disk if needed.
    pub fn get(&self, index: usize) -> Result<Instance> {
        match self.sources.get(index) {
            Some(Source::File(path)) => Instance::from_file(path),
            Some(Source::Memory(instance)) => Ok(instance.clone()),
            None => Err(DataError::IndexOutOfBounds {
                index,
                length: self.len(),
            }),
        }
    }
}
