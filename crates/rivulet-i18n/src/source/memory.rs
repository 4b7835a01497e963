// Bundles held in memory. Handy for embedding and for tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rivulet_core::Map;

use super::BundleSource;
use crate::error::I18nError;

#[derive(Debug, Clone, Default)]
pub struct MemoryBundles {
    bundles: BTreeMap<(String, String), Map>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryBundles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(
        mut self,
        lang: impl Into<String>,
        namespace: impl Into<String>,
        bundle: Map,
    ) -> Self {
        self.bundles.insert((lang.into(), namespace.into()), bundle);
        self
    }

    /// Number of `fetch` calls served so far, across clones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl BundleSource for MemoryBundles {
    async fn fetch(&self, lang: &str, namespace: &str) -> Result<Option<Map>, I18nError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .bundles
            .get(&(lang.to_owned(), namespace.to_owned()))
            .cloned())
    }
}
