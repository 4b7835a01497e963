//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use rivulet_config::ConfigError;
use rivulet_core::ModelError;
use rivulet_i18n::I18nError;

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const IO: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(rivulet::no_config),
        help("Pass an existing file with --config, or omit it to use {default}")
    )]
    NoConfig { path: String, default: String },

    #[error(transparent)]
    #[diagnostic(
        code(rivulet::config),
        help("Check the [locale] section of your config file and RIVULET_* variables.")
    )]
    Config(#[from] ConfigError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rivulet::validation))]
    Validation { field: String, reason: String },

    // ── Loading ──────────────────────────────────────────────────────
    #[error("Cannot load translation bundles")]
    #[diagnostic(
        code(rivulet::bundles),
        help("Check --base-uri: it must be an http(s) URL or a directory.")
    )]
    Bundles {
        #[source]
        source: I18nError,
    },

    #[error("Failed to read {path}")]
    #[diagnostic(code(rivulet::io))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}")]
    #[diagnostic(code(rivulet::json), help("Check the JSON file contents and try again."))]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── State ────────────────────────────────────────────────────────
    #[error("{path} does not hold a JSON object")]
    #[diagnostic(code(rivulet::not_an_object), help("Only objects can be merged."))]
    NotAnObject { path: String },

    #[error(transparent)]
    #[diagnostic(code(rivulet::model))]
    Model(#[from] ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Bundles { .. } | Self::Read { .. } | Self::Io(_) => exit_code::IO,
            Self::Json { .. } | Self::NotAnObject { .. } | Self::Model(_) => exit_code::GENERAL,
        }
    }
}
