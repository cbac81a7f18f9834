//! Per-language-pair index cache
//!
//! Each pair owns a slot with a build lock. The first caller for a pair builds
//! the index while concurrent callers for the same pair wait on that lock;
//! callers for other pairs are never blocked. A built index is shared as
//! `Arc<DictionaryIndex>` and never mutated again. Failed builds are not cached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::error::Result;
use crate::types::LanguagePair;

use super::{BuiltinSource, DictionaryIndex, DictionarySource};

#[derive(Default)]
struct Slot {
    index: OnceLock<Arc<DictionaryIndex>>,
    build: Mutex<()>,
}

pub struct DictionaryCache {
    source: Box<dyn DictionarySource>,
    slots: Mutex<HashMap<LanguagePair, Arc<Slot>>>,
    builds: AtomicUsize,
}

impl DictionaryCache {
    pub fn new(source: impl DictionarySource + 'static) -> Self {
        Self {
            source: Box::new(source),
            slots: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// Cache over the bundled word lists
    pub fn builtin() -> Self {
        Self::new(BuiltinSource)
    }

    /// Returns the pair's index, building it on first use
    pub fn get_or_load(&self, pair: LanguagePair) -> Result<Arc<DictionaryIndex>> {
        let slot = Arc::clone(self.slots.lock().entry(pair).or_default());

        if let Some(index) = slot.index.get() {
            return Ok(Arc::clone(index));
        }

        let _guard = slot.build.lock();
        if let Some(index) = slot.index.get() {
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(DictionaryIndex::load(self.source.as_ref(), pair)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%pair, words = index.len(), "dictionary index built");

        let _ = slot.index.set(Arc::clone(&index));
        Ok(index)
    }

    /// Index for `pair` if it was already built
    pub fn get(&self, pair: LanguagePair) -> Option<Arc<DictionaryIndex>> {
        self.slots
            .lock()
            .get(&pair)
            .and_then(|slot| slot.index.get().cloned())
    }

    /// Number of successful index builds so far
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl Default for DictionaryCache {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for DictionaryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryCache")
            .field("pairs", &self.slots.lock().len())
            .field("builds", &self.build_count())
            .finish()
    }
}
