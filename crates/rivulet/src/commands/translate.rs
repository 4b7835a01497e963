//! `rivulet translate`: resolve keys against the configured bundles.

use rivulet_i18n::{AnyBundles, LocaleResolver};
use serde_json::Value;
use tracing::{debug, info};

use crate::cli::{GlobalOpts, TranslateArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: TranslateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = config::resolve(global)?;
    let locale = &config.locale;

    if let Some(ns) = &args.ns {
        if !locale.namespaces.contains(ns) {
            return Err(CliError::Validation {
                field: "--ns".into(),
                reason: format!(
                    "namespace '{ns}' is not loaded (loaded: {})",
                    locale.namespaces.join(", ")
                ),
            });
        }
    }

    let source = AnyBundles::from_base_uri(&locale.base_uri, &locale.http_options())
        .map_err(|source| CliError::Bundles { source })?;
    let resolver = LocaleResolver::new(source, locale.resolver_config());

    let lang = args.lang.unwrap_or_else(|| resolver.lang());
    let translator = resolver.select(&lang).await;
    info!(lang = %lang, chain = ?translator.chain(), "bundles loaded");

    let mut lines = Vec::with_capacity(args.keys.len());
    let mut json = serde_json::Map::new();
    for key in args.keys {
        let text = translator.t(&key, args.ns.as_deref());
        if text == key {
            debug!(key = %key, "no translation found");
        }
        lines.push(text.clone());
        json.insert(key, Value::String(text));
    }

    let out = output::render_list(&global.output, &lines, &Value::Object(json));
    output::print_output(&out, global.quiet);
    Ok(())
}
