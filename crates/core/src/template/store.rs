//! Directory-backed template store with an optional byte cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::error::TemplateError;

/// Loads template images from a directory.
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    cache: Option<RwLock<HashMap<String, Arc<Vec<u8>>>>>,
}

impl TemplateStore {
    /// Creates a store rooted at `dir`. With `cache` set, each template is read
    /// from disk at most once per process.
    pub fn new(dir: impl Into<PathBuf>, cache: bool) -> Self {
        Self {
            dir: dir.into(),
            cache: cache.then(|| RwLock::new(HashMap::new())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads the raw bytes of template `id`.
    pub fn load(&self, id: &str) -> Result<Arc<Vec<u8>>, TemplateError> {
        validate_id(id)?;

        if let Some(cache) = &self.cache {
            if let Some(bytes) = cache.read().ok().and_then(|c| c.get(id).cloned()) {
                return Ok(bytes);
            }
        }

        let path = self.dir.join(id);
        let bytes = std::fs::read(&path)
            .map(Arc::new)
            .map_err(|e| TemplateError::from_io(id, e))?;
        debug!(template = id, path = %path.display(), size = bytes.len(), "Template loaded");

        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.write() {
                cache.insert(id.to_string(), Arc::clone(&bytes));
            }
        }

        Ok(bytes)
    }

    /// Pixel dimensions of template `id`, read from the image header.
    pub fn dimensions(&self, id: &str) -> Result<(u32, u32), TemplateError> {
        let bytes = self.load(id)?;
        image::ImageReader::new(std::io::Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|e| TemplateError::from_io(id, e))?
            .into_dimensions()
            .map_err(|e| TemplateError::Decode {
                id: id.to_string(),
                reason: e.to_string(),
            })
    }

    /// Drops every cached template.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.write() {
                cache.clear();
            }
        }
    }
}

fn validate_id(id: &str) -> Result<(), TemplateError> {
    let trimmed = id.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
        || trimmed.contains('\0')
    {
        return Err(TemplateError::InvalidId(id.to_string()));
    }
    Ok(())
}
