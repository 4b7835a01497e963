//! `rivulet merge`: fold JSON object documents through a model.
//!
//! Each file is dispatched to a model as one `merge` (or `deep_merge`)
//! action, so the documents combine in argument order and the final
//! state is what gets printed.

use std::path::Path;

use rivulet_core::{ActionContext, ActionError, Actions, Map, Model, State};
use serde_json::Value;
use tracing::debug;

use crate::cli::{GlobalOpts, MergeArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &MergeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let model = folder();
    let action = if args.deep { "deep_merge" } else { "merge" };

    for path in &args.files {
        let document = read_document(path).await?;
        debug!(path = %path.display(), keys = document.len(), action, "folding document");
        model.dispatch(action, [document]).await?;
    }

    let merged = model.state().unwrap_or_else(State::empty_map);
    let out = output::render_document(&global.output, &merged.to_json());
    output::print_output(&out, global.quiet);
    Ok(())
}

/// A model whose actions fold their map arguments into the current state.
fn folder() -> Model {
    Model::new(
        Actions::new()
            .on("merge", |ctx: &ActionContext, args: Vec<State>| {
                Ok::<_, ActionError>(fold(ctx, &args, Map::merge))
            })
            .on("deep_merge", |ctx: &ActionContext, args: Vec<State>| {
                Ok::<_, ActionError>(fold(ctx, &args, Map::deep_merge))
            }),
    )
}

fn fold(ctx: &ActionContext, args: &[State], join: fn(&Map, &Map) -> Map) -> Map {
    args.iter()
        .filter_map(State::as_map)
        .fold(ctx.state_map(), |acc, doc| join(&acc, doc))
}

async fn read_document(path: &Path) -> Result<Map, CliError> {
    let display = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: display.clone(),
            source,
        })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: display.clone(),
        source,
    })?;
    Map::try_from(value).map_err(|_| CliError::NotAnObject { path: display })
}
