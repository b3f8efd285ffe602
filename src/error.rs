// Error types for the uploader. Each concern gets its own enum; `Error`
// wraps them for the entry point.

use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Problems locating, reading or saving the INI configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The OS gave no per-user configuration directory.
    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    #[error("no configuration found at {}; run with --login first", .path.display())]
    NotFound { path: PathBuf },

    #[error("malformed configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ini::ParseError,
    },

    #[error("failed to read configuration file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// INI values lose leading and trailing whitespace, so such values are
    /// refused rather than silently changed.
    #[error("{key} must not start or end with whitespace")]
    Unrepresentable { key: &'static str },

    #[error("failed to save configuration to {}: {source}", .path.display())]
    Save { path: PathBuf, source: io::Error },
}

/// Failures of the interactive credential prompt.
#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("not a terminal; --login needs an interactive terminal on stdin")]
    NotATerminal,

    #[error("failed to switch terminal mode: {0}")]
    RawMode(#[source] io::Error),

    #[error("failed to read from terminal: {0}")]
    Read(#[source] io::Error),

    #[error("input cancelled")]
    Interrupted,
}

/// Errors talking to the Paperless API, including local file problems that
/// stop an upload before it is sent.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("server URL is empty; run with --login first")]
    MissingServerUrl,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    /// The server answered with an unexpected status. The raw response text
    /// is part of the message for diagnostics.
    #[error("{url} answered {status}{}", body_suffix(.body))]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    LocalFile { path: PathBuf, source: io::Error },
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

/// Top-level error returned to the entry point.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Usage(String),
}

/// Result type alias for uploader operations.
pub type Result<T> = std::result::Result<T, Error>;
