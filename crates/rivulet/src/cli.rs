//! Clap derive structures for the `rivulet` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rivulet -- translations, locale chains and state documents
#[derive(Debug, Parser)]
#[command(
    name = "rivulet",
    version,
    about = "Resolve translations and fold state documents from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "RIVULET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Bundle root: an http(s) URL or a directory (overrides config)
    #[arg(long, short = 'b', global = true)]
    pub base_uri: Option<String>,

    /// Default language (overrides config)
    #[arg(long, global = true)]
    pub default_lang: Option<String>,

    /// Namespace to load; repeat for several (overrides config)
    #[arg(long = "namespace", short = 'n', global = true)]
    pub namespaces: Vec<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "plain", global = true)]
    pub output: OutputFormat,

    /// Suppress normal output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// One value per line
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate keys for a language
    #[command(alias = "t")]
    Translate(TranslateArgs),

    /// Print the fallback chain for a language
    Chain(ChainArgs),

    /// Fold JSON object documents left to right
    Merge(MergeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// Keys to translate
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Language to select (defaults to the configured language)
    #[arg(long, short = 'l')]
    pub lang: Option<String>,

    /// Namespace to look keys up in (defaults to the first loaded namespace)
    #[arg(long)]
    pub ns: Option<String>,
}

#[derive(Debug, Args)]
pub struct ChainArgs {
    /// Language to resolve
    pub lang: String,
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// JSON files, each holding an object
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Merge nested objects recursively instead of replacing them
    #[arg(long)]
    pub deep: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
