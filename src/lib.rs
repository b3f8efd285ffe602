// Library root
// -----------
// This crate exposes a small library surface for the uploader. The binary
// (`main.rs`) only parses arguments and hands over to `cli::run`.
//
// Module responsibilities:
// - `api`: HTTP interactions with the Paperless REST API (connectivity
//   test, tag listing/creation, document upload).
// - `config`: reading and writing the per-user INI configuration file.
// - `ui`: the interactive credential prompt on a raw-mode terminal.
// - `upload`: tag resolution and the per-file upload loop.
// - `cli`: argument parsing and dispatch to login or upload mode.
// - `error`: the error types shared by all of the above.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;
pub mod upload;

pub use api::{ApiClient, PaperlessApi, Tag};
pub use config::{Config, ConfigStore};
pub use error::{ApiError, ConfigError, Error, TerminalError};
