// ── Bundle sources ──
//
// Where translation bundles come from. A bundle is the JSON object
// stored at `{base}/{lang}/{namespace}.json`.

mod dir;
mod http;
mod memory;

use std::future::Future;

use rivulet_core::Map;
use serde_json::Value;

use crate::error::I18nError;

pub use dir::DirBundles;
pub use http::{HttpBundles, HttpOptions};
pub use memory::MemoryBundles;

/// Fetches one `(language, namespace)` bundle.
pub trait BundleSource: Send + Sync {
    /// `Ok(None)` when the bundle does not exist.
    fn fetch(
        &self,
        lang: &str,
        namespace: &str,
    ) -> impl Future<Output = Result<Option<Map>, I18nError>> + Send;
}

/// A source chosen from a base URI at runtime: `http(s)://` URIs go over
/// HTTP, anything else (including `file://`) is read from disk.
#[derive(Debug, Clone)]
pub enum AnyBundles {
    Http(HttpBundles),
    Dir(DirBundles),
}

impl AnyBundles {
    pub fn from_base_uri(base_uri: &str, options: &HttpOptions) -> Result<Self, I18nError> {
        if base_uri.starts_with("http://") || base_uri.starts_with("https://") {
            return HttpBundles::with_options(base_uri, options).map(Self::Http);
        }
        let path = base_uri.strip_prefix("file://").unwrap_or(base_uri);
        Ok(Self::Dir(DirBundles::new(path)))
    }
}

impl BundleSource for AnyBundles {
    async fn fetch(&self, lang: &str, namespace: &str) -> Result<Option<Map>, I18nError> {
        match self {
            Self::Http(source) => source.fetch(lang, namespace).await,
            Self::Dir(source) => source.fetch(lang, namespace).await,
        }
    }
}

/// Strip trailing slashes from a base URI.
pub fn normalize_base_uri(base_uri: &str) -> &str {
    base_uri.trim_end_matches('/')
}

/// Accept `segment` only if it names one directory or file: non-empty, no
/// separators, no `..`.
pub(crate) fn check_segment(segment: &str) -> Result<&str, I18nError> {
    let escapes = segment == "." || segment.contains("..");
    if segment.is_empty() || escapes || segment.contains(['/', '\\']) {
        return Err(I18nError::InvalidSegment {
            segment: segment.to_owned(),
        });
    }
    Ok(segment)
}

pub(crate) fn bundle_from_json(location: &str, value: Value) -> Result<Map, I18nError> {
    Map::try_from(value).map_err(|e| I18nError::InvalidBundle {
        location: location.to_owned(),
        message: e.to_string(),
    })
}
