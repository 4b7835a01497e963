// ── Locale resolver ──
//
// Owns the resolver configuration, the bundle cache and the translator
// currently in effect. Every configuration change reloads the bundles for
// the selected language's fallback chain and publishes a new translator
// once all of them have settled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use rivulet_core::Map;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::locale::fallback_chain;
use crate::source::{BundleSource, normalize_base_uri};
use crate::translator::Translator;

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Root bundles are fetched from, without trailing slashes.
    pub base_uri: String,
    /// Namespaces to load. The first one is the default for lookups.
    pub namespaces: Vec<String>,
    pub default_lang: String,
    /// Selected language; the default language when unset.
    pub lang: Option<String>,
    /// Keep fetched bundles for later loads.
    pub caching: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_uri: "locales".into(),
            namespaces: vec!["translation".into()],
            default_lang: "en".into(),
            lang: None,
            caching: true,
        }
    }
}

impl ResolverConfig {
    pub fn new(base_uri: &str) -> Self {
        Self {
            base_uri: normalize_base_uri(base_uri).to_owned(),
            ..Self::default()
        }
    }

    pub fn with_namespaces<I>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    /// The selected language, falling back to the default.
    pub fn current_lang(&self) -> &str {
        self.lang
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&self.default_lang)
    }

    /// Fallback chain for the selected language.
    pub fn candidates(&self) -> Vec<String> {
        fallback_chain(self.current_lang(), &self.default_lang)
    }
}

/// Resolves translation keys for a selected language.
///
/// Loads for every `(language, namespace)` pair of the fallback chain run
/// concurrently. Pairs that are missing or fail to load are skipped.
#[derive(Debug)]
pub struct LocaleResolver<S> {
    source: S,
    config: Mutex<ResolverConfig>,
    /// `lang -> namespace -> bundle`
    cache: Mutex<Map>,
    current: ArcSwap<Translator>,
    generation: AtomicU64,
}

impl<S: BundleSource> LocaleResolver<S> {
    /// Create a resolver. Nothing is loaded until a language is selected;
    /// until then lookups go through the placeholder translator.
    pub fn new(source: S, mut config: ResolverConfig) -> Self {
        config.base_uri = normalize_base_uri(&config.base_uri).to_owned();
        let placeholder = Translator::placeholder(config.namespaces.clone());
        Self {
            source,
            config: Mutex::new(config),
            cache: Mutex::new(Map::new()),
            current: ArcSwap::from_pointee(placeholder),
            generation: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> ResolverConfig {
        self.lock_config().clone()
    }

    pub fn lang(&self) -> String {
        self.lock_config().current_lang().to_owned()
    }

    /// The fallback chain the next load would search.
    pub fn candidates(&self) -> Vec<String> {
        self.lock_config().candidates()
    }

    // ── Configuration changes ────────────────────────────────────────

    /// Select `lang` and load its bundles. An empty `lang` selects the
    /// default language.
    pub async fn select(&self, lang: &str) -> Arc<Translator> {
        let lang = (!lang.is_empty()).then(|| lang.to_owned());
        let config = self.update(|config| config.lang = lang);
        self.load(&config).await
    }

    /// Reload with the current configuration.
    pub async fn reload(&self) -> Arc<Translator> {
        let config = self.config();
        self.load(&config).await
    }

    pub async fn set_default_language(&self, lang: &str) -> Arc<Translator> {
        let config = self.update(|config| config.default_lang = lang.to_owned());
        self.load(&config).await
    }

    /// Replace the namespace list.
    pub async fn set_namespaces<I>(&self, namespaces: I) -> Arc<Translator>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let namespaces: Vec<String> = namespaces.into_iter().map(Into::into).collect();
        let config = self.update(|config| config.namespaces = namespaces);
        self.load(&config).await
    }

    /// Append `namespace` unless it is already configured.
    pub async fn add_namespace(&self, namespace: &str) -> Arc<Translator> {
        let config = self.update(|config| {
            if !config.namespaces.iter().any(|ns| ns == namespace) {
                config.namespaces.push(namespace.to_owned());
            }
        });
        self.load(&config).await
    }

    // ── Lookup ───────────────────────────────────────────────────────

    /// Translate with the most recently published translator.
    pub fn translate(&self, key: &str, namespace: Option<&str>) -> String {
        self.current.load().t(key, namespace)
    }

    /// The most recently published translator.
    pub fn translator(&self) -> Arc<Translator> {
        self.current.load_full()
    }

    /// Snapshot of the bundle cache, keyed by language then namespace.
    pub fn cached(&self) -> Map {
        self.lock_cache().clone()
    }

    // ── Loading ──────────────────────────────────────────────────────

    async fn load(&self, config: &ResolverConfig) -> Arc<Translator> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let chain = config.candidates();
        debug!(?chain, namespaces = ?config.namespaces, "loading translation bundles");

        let pairs: Vec<(&str, &str)> = chain
            .iter()
            .flat_map(|lang| {
                config
                    .namespaces
                    .iter()
                    .map(move |ns| (lang.as_str(), ns.as_str()))
            })
            .collect();
        let results = join_all(
            pairs
                .iter()
                .map(|&(lang, ns)| self.load_pair(lang, ns, config.caching)),
        )
        .await;

        let mut bundles = Map::new();
        for (&(lang, ns), bundle) in pairs.iter().zip(results) {
            if let Some(bundle) = bundle {
                bundles = bundles.deep_merge(&nest(lang, ns, bundle));
            }
        }

        let translator = Arc::new(Translator::new(
            chain,
            config.namespaces.clone(),
            bundles,
        ));
        if self.generation.load(Ordering::Acquire) == generation {
            self.current.store(Arc::clone(&translator));
            debug!(lang = config.current_lang(), "translator published");
        } else {
            debug!(
                lang = config.current_lang(),
                "newer load in flight; translator not published"
            );
        }
        translator
    }

    async fn load_pair(&self, lang: &str, namespace: &str, caching: bool) -> Option<Map> {
        if let Some(bundle) = self.cached_bundle(lang, namespace) {
            debug!(lang, namespace, "translation bundle served from cache");
            return Some(bundle);
        }
        match self.source.fetch(lang, namespace).await {
            Ok(Some(bundle)) => {
                if caching {
                    let mut cache = self.lock_cache();
                    *cache = cache.deep_merge(&nest(lang, namespace, bundle.clone()));
                }
                Some(bundle)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(lang, namespace, %error, "failed to load translation bundle");
                None
            }
        }
    }

    fn cached_bundle(&self, lang: &str, namespace: &str) -> Option<Map> {
        self.lock_cache()
            .get(lang)?
            .get(namespace)?
            .as_map()
            .cloned()
    }

    fn update(&self, change: impl FnOnce(&mut ResolverConfig)) -> ResolverConfig {
        let mut config = self.lock_config();
        change(&mut config);
        config.clone()
    }

    fn lock_config(&self) -> std::sync::MutexGuard<'_, ResolverConfig> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Map> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn nest(lang: &str, namespace: &str, bundle: Map) -> Map {
    Map::new().put(lang, Map::new().put(namespace, bundle))
}
