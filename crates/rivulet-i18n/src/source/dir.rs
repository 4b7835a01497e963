// Bundles laid out on disk as `{root}/{lang}/{namespace}.json`.

use std::io;
use std::path::{Path, PathBuf};

use rivulet_core::Map;
use serde_json::Value;
use tracing::debug;

use super::{BundleSource, bundle_from_json, check_segment};
use crate::error::I18nError;

#[derive(Debug, Clone)]
pub struct DirBundles {
    root: PathBuf,
}

impl DirBundles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{lang}/{namespace}.json`. Segments that would leave the
    /// root are rejected.
    pub fn bundle_path(&self, lang: &str, namespace: &str) -> Result<PathBuf, I18nError> {
        let lang = check_segment(lang)?;
        let namespace = check_segment(namespace)?;
        Ok(self.root.join(lang).join(format!("{namespace}.json")))
    }
}

impl BundleSource for DirBundles {
    async fn fetch(&self, lang: &str, namespace: &str) -> Result<Option<Map>, I18nError> {
        let path = self.bundle_path(lang, namespace)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "translation bundle not found");
                return Ok(None);
            }
            Err(source) => return Err(I18nError::Io { path, source }),
        };

        let location = path.display().to_string();
        let body: Value =
            serde_json::from_str(&text).map_err(|e| I18nError::InvalidBundle {
                location: location.clone(),
                message: e.to_string(),
            })?;
        bundle_from_json(&location, body).map(Some)
    }
}
