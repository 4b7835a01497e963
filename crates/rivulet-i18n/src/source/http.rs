// Bundles served over HTTP.

use std::time::Duration;

use rivulet_core::Map;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{BundleSource, bundle_from_json, check_segment, normalize_base_uri};
use crate::error::I18nError;

/// Settings for the HTTP client behind [`HttpBundles`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("rivulet/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl HttpOptions {
    pub fn build_client(&self) -> Result<reqwest::Client, I18nError> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| I18nError::Client(e.to_string()))
    }
}

/// Fetches `GET {base_uri}/{lang}/{namespace}.json`.
///
/// Any non-2xx status means the bundle is absent.
#[derive(Debug, Clone)]
pub struct HttpBundles {
    client: reqwest::Client,
    base_uri: String,
    base: Url,
}

impl HttpBundles {
    pub fn new(base_uri: &str) -> Result<Self, I18nError> {
        Self::with_options(base_uri, &HttpOptions::default())
    }

    pub fn with_options(base_uri: &str, options: &HttpOptions) -> Result<Self, I18nError> {
        Self::with_client(options.build_client()?, base_uri)
    }

    /// Use an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: reqwest::Client, base_uri: &str) -> Result<Self, I18nError> {
        let base_uri = normalize_base_uri(base_uri).to_owned();
        let base = Url::parse(&base_uri)?;
        if base.cannot_be_a_base() {
            return Err(I18nError::NotABase { uri: base_uri });
        }
        Ok(Self {
            client,
            base_uri,
            base,
        })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// `{base_uri}/{lang}/{namespace}.json`, with both segments
    /// percent-encoded.
    pub fn bundle_url(&self, lang: &str, namespace: &str) -> Result<Url, I18nError> {
        let lang = check_segment(lang)?;
        let file = format!("{}.json", check_segment(namespace)?);
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| I18nError::NotABase {
                uri: self.base_uri.clone(),
            })?
            .pop_if_empty()
            .push(lang)
            .push(&file);
        Ok(url)
    }
}

impl BundleSource for HttpBundles {
    async fn fetch(&self, lang: &str, namespace: &str) -> Result<Option<Map>, I18nError> {
        let url = self.bundle_url(lang, namespace)?;
        debug!(%url, "fetching translation bundle");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!(%url, status = status.as_u16(), "translation bundle not available");
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| I18nError::InvalidBundle {
                location: url.to_string(),
                message: e.to_string(),
            })?;
        bundle_from_json(url.as_str(), body).map(Some)
    }
}
