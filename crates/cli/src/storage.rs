//! Object store seam. The job only needs prefix listing (arrival gate) and
//! whole-object reads (CSV load).

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub trait ObjectStore {
    /// Keys in `bucket` starting with `prefix`, sorted.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PipelineError>;

    /// Full object body as UTF-8 text.
    fn get(&self, bucket: &str, key: &str) -> Result<String, PipelineError>;
}

/// Directory-backed store: bucket `b` is `<root>/b/`, keys are file names.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, PipelineError> {
        if !is_plain_name(bucket) {
            return Err(PipelineError::Storage(format!("invalid bucket name '{bucket}'")));
        }
        let dir = self.root.join(bucket);
        if !dir.is_dir() {
            return Err(PipelineError::Storage(format!(
                "bucket '{bucket}' not found under {}",
                self.root.display()
            )));
        }
        Ok(dir)
    }
}

impl ObjectStore for LocalObjectStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, PipelineError> {
        let dir = self.bucket_dir(bucket)?;
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| PipelineError::Storage(format!("cannot list {}: {e}", dir.display())))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::Storage(e.to_string()))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<String, PipelineError> {
        if !is_plain_name(key) {
            return Err(PipelineError::Storage(format!("invalid object key '{key}'")));
        }
        let path = self.bucket_dir(bucket)?.join(key);
        std::fs::read_to_string(&path)
            .map_err(|e| PipelineError::Storage(format!("cannot read {}: {e}", path.display())))
    }
}

/// Single path component, no traversal.
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
