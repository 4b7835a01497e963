use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building bundle sources or loading bundles.
///
/// A bundle that simply does not exist is not an error; sources report it
/// as `Ok(None)`. The resolver logs these errors and treats the pair as
/// absent.
#[derive(Debug, Error)]
pub enum I18nError {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The base URI or a derived bundle URL did not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URI cannot have path segments appended (e.g. `mailto:`).
    #[error("Base URI cannot hold bundle paths: {uri}")]
    NotABase { uri: String },

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    // ── Filesystem ──────────────────────────────────────────────────
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A language or namespace that is not a single path segment.
    #[error("Invalid bundle path segment: {segment:?}")]
    InvalidSegment { segment: String },

    /// The bundle was found but is not a JSON object.
    #[error("Invalid translation bundle at {location}: {message}")]
    InvalidBundle { location: String, message: String },
}
