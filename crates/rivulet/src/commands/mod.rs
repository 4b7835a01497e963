//! Command dispatch: bridges CLI args to the toolkit crates and output
//! formatting.

pub mod chain;
pub mod merge;
pub mod translate;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Translate(args) => translate::handle(args, global).await,
        Command::Chain(args) => chain::handle(&args, global),
        Command::Merge(args) => merge::handle(&args, global).await,
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
