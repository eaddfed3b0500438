use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::loader::{load_upload, LoaderOptions, Upload};
use super::model::Dataset;
use crate::error::LoadError;

/// Identity of an upload: same name, same bytes, same options.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadKey {
    name: String,
    len: usize,
    digest: u64,
    options: LoaderOptions,
}

impl UploadKey {
    fn of(upload: &Upload, options: &LoaderOptions) -> Self {
        let mut hasher = DefaultHasher::new();
        upload.bytes.hash(&mut hasher);
        Self {
            name: upload.name.clone(),
            len: upload.bytes.len(),
            digest: hasher.finish(),
            options: *options,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadCache – memoizes the last ingestion
// ---------------------------------------------------------------------------

/// Remembers the result of the most recent load so re-opening the same file
/// does not parse it again. Failures are remembered too.
#[derive(Debug, Default)]
pub struct LoadCache {
    last: Option<(UploadKey, Result<Dataset, LoadError>)>,
    parses: usize,
}

impl LoadCache {
    pub fn load(&mut self, upload: &Upload, options: &LoaderOptions) -> Result<&Dataset, &LoadError> {
        let key = UploadKey::of(upload, options);
        let entry = match self.last.take() {
            Some((cached, result)) if cached == key => {
                log::debug!("Load cache hit for '{}'", upload.name);
                (cached, result)
            }
            _ => {
                self.parses += 1;
                (key, load_upload(upload, options))
            }
        };
        let (_, result) = self.last.insert(entry);
        result.as_ref()
    }

    /// How many times the cache had to run the loader.
    pub fn parses(&self) -> usize {
        self.parses
    }
}
