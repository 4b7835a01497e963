//! `rivulet chain`: the languages a selection resolves through.

use rivulet_i18n::fallback_chain;
use serde_json::Value;

use crate::cli::{ChainArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ChainArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.lang.trim().is_empty() {
        return Err(CliError::Validation {
            field: "LANG".into(),
            reason: "must not be empty".into(),
        });
    }
    let config = config::resolve(global)?;
    let chain = fallback_chain(&args.lang, &config.locale.default_lang);

    let json = Value::from(chain.clone());
    let out = output::render_list(&global.output, &chain, &json);
    output::print_output(&out, global.quiet);
    Ok(())
}
