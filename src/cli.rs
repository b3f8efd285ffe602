// Command-line surface: `--login` captures and stores credentials, otherwise
// the positional arguments are uploaded.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::api::ApiClient;
use crate::config::ConfigStore;
use crate::error::Result;
use crate::{ui, upload};

#[derive(Parser, Debug)]
#[command(
    name = "paperless-uploader",
    version,
    about = "Upload documents to a Paperless server"
)]
pub struct Cli {
    /// Provide credentials to Paperless
    #[arg(long)]
    pub login: bool,

    /// A tag to set on the uploaded files
    #[arg(long, value_name = "NAME")]
    pub tag: Option<String>,

    /// Configuration file to use instead of the per-user default
    #[arg(long, value_name = "PATH", env = "PAPERLESS_UPLOADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Files to upload
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    fn store(&self) -> Result<ConfigStore> {
        match &self.config {
            Some(path) => Ok(ConfigStore::at(path)),
            None => Ok(ConfigStore::locate()?),
        }
    }
}

pub fn run() -> Result<()> {
    dispatch(Cli::parse())
}

pub fn dispatch(cli: Cli) -> Result<()> {
    let store = cli.store()?;
    debug!(config = %store.path().display(), "using configuration file");

    if cli.login {
        let config = ui::prompt_credentials()?;
        let api = ApiClient::new(&config)?;
        upload::login(&store, &api, config)?;
    } else {
        upload::upload_files(&store, &cli.files, cli.tag.as_deref())?;
    }
    Ok(())
}
