//! Translation lookup for the rivulet toolkit.
//!
//! A [`LocaleResolver`] loads JSON bundles for a selected language, its
//! parent locale and the default language, and publishes a
//! [`Translator`] that resolves keys along that chain. Bundles come from
//! any [`BundleSource`]: HTTP ([`HttpBundles`]), a directory tree
//! ([`DirBundles`]) or memory ([`MemoryBundles`]).

pub mod error;
pub mod locale;
pub mod resolver;
pub mod source;
pub mod translator;

pub use error::I18nError;
pub use locale::{fallback_chain, parent_locale};
pub use resolver::{LocaleResolver, ResolverConfig};
pub use source::{
    AnyBundles, BundleSource, DirBundles, HttpBundles, HttpOptions, MemoryBundles,
    normalize_base_uri,
};
pub use translator::Translator;
