// ── Translator ──
//
// An immutable key lookup over the bundles of one fallback chain.

use std::borrow::Cow;

use rivulet_core::{Map, State};

/// A resolved `t(key, namespace)` function.
///
/// Cheap to clone; bundles are shared with the resolver that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct Translator {
    chain: Vec<String>,
    namespaces: Vec<String>,
    /// `lang -> namespace -> bundle`
    bundles: Map,
    placeholder: bool,
}

impl Translator {
    pub(crate) fn new(chain: Vec<String>, namespaces: Vec<String>, bundles: Map) -> Self {
        Self {
            chain,
            namespaces,
            bundles,
            placeholder: false,
        }
    }

    /// The translator in effect before any load has finished. It returns
    /// the key itself, qualified as `"{namespace}.{key}"` when a namespace
    /// is passed explicitly and several are configured.
    pub(crate) fn placeholder(namespaces: Vec<String>) -> Self {
        Self {
            chain: Vec::new(),
            namespaces,
            bundles: Map::new(),
            placeholder: true,
        }
    }

    /// Translate `key`.
    ///
    /// `namespace` defaults to the first configured namespace. The chain is
    /// searched in order and the first non-empty string wins; when nothing
    /// matches the key is returned unchanged.
    pub fn t(&self, key: &str, namespace: Option<&str>) -> String {
        if self.placeholder {
            return match namespace {
                Some(ns) if self.namespaces.len() > 1 => format!("{ns}.{key}"),
                _ => key.to_owned(),
            };
        }
        self.lookup(key, namespace)
            .map_or_else(|| key.to_owned(), Cow::into_owned)
    }

    /// The translation for `key`, if any language in the chain has one.
    ///
    /// Non-empty strings count as is; numbers and booleans are rendered
    /// as text. Nulls, empty strings, lists and maps are skipped.
    pub fn lookup(&self, key: &str, namespace: Option<&str>) -> Option<Cow<'_, str>> {
        let namespace = namespace.or_else(|| self.namespaces.first().map(String::as_str))?;
        self.chain.iter().find_map(|lang| {
            self.bundles
                .get(lang)?
                .get(namespace)?
                .get(key)
                .and_then(render)
        })
    }

    /// Selected language first, default language last.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// The selected language, `None` for the placeholder.
    pub fn lang(&self) -> Option<&str> {
        self.chain.first().map(String::as_str)
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// The loaded bundles keyed by language then namespace.
    pub fn bundles(&self) -> &Map {
        &self.bundles
    }
}

fn render(value: &State) -> Option<Cow<'_, str>> {
    match value {
        State::String(text) if !text.is_empty() => Some(Cow::Borrowed(&**text)),
        State::Number(number) => Some(Cow::Owned(number.to_string())),
        State::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}
