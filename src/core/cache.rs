use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::trace;

use super::signature::{PixelGrid, Signature};
use crate::decoder::ImageSource;

/// Decode outcome of one reference image, kept across mystery images
#[derive(Debug)]
pub enum CachedReference {
    Decoded {
        dimensions: (u32, u32),
        signature: Arc<Signature>,
    },
    Failed(String),
}

/// Reference signatures keyed by file path.
///
/// Signatures are pure functions of file content, so reusing them does not
/// change any match result.
#[derive(Default)]
pub struct SignatureCache {
    entries: Mutex<HashMap<PathBuf, Arc<CachedReference>>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<S: ImageSource + ?Sized>(&self, source: &S, path: &Path) -> Arc<CachedReference> {
        if let Some(hit) = self.lock().get(path) {
            trace!("signature cache hit for {}", path.display());
            return Arc::clone(hit);
        }

        // Decode outside the lock; other workers keep going meanwhile
        let loaded = Arc::new(match source.decode(path) {
            Ok(image) => CachedReference::Decoded {
                dimensions: PixelGrid::dimensions(&image),
                signature: Arc::new(Signature::build(&image)),
            },
            Err(e) => CachedReference::Failed(e.to_string()),
        });

        self.lock()
            .entry(path.to_path_buf())
            .or_insert(loaded)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<CachedReference>>> {
        // Entries are only ever inserted whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
