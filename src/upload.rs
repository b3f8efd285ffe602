// Upload flow: resolve the tag once, then upload every file in order.
// A failing file is reported and skipped; the batch always runs to the end.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::api::{ApiClient, PaperlessApi, Tag};
use crate::config::{Config, ConfigStore};
use crate::error::{ApiError, Error, Result};

/// Per-batch outcome counts.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: Vec<PathBuf>,
}

/// First tag named exactly `name` (case-sensitive).
pub fn find_tag(tags: &[Tag], name: &str) -> Option<u64> {
    tags.iter().find(|t| t.name == name).map(|t| t.id)
}

/// Id of the tag called `name`, creating it when the server has none.
pub fn ensure_tag(api: &dyn PaperlessApi, name: &str) -> std::result::Result<u64, ApiError> {
    let tags = api.list_tags()?;
    match find_tag(&tags, name) {
        Some(id) => Ok(id),
        None => {
            info!(tag = name, "tag not found, creating it");
            api.create_tag(name)
        }
    }
}

/// Load the configuration and upload `files` to the configured server.
pub fn upload_files(
    store: &ConfigStore,
    files: &[PathBuf],
    tag: Option<&str>,
) -> Result<UploadSummary> {
    ensure_files(files)?;
    let config = store.read()?;
    let api = ApiClient::new(&config)?;
    upload_batch(&api, files, tag)
}

/// Upload each file independently. Only usage and tag errors abort.
pub fn upload_batch(
    api: &dyn PaperlessApi,
    files: &[PathBuf],
    tag: Option<&str>,
) -> Result<UploadSummary> {
    ensure_files(files)?;

    let tag_id = match tag.filter(|t| !t.is_empty()) {
        Some(name) => {
            let id = ensure_tag(api, name)?;
            println!("Found/Made Tag {name} with id {id}");
            Some(id)
        }
        None => None,
    };

    let mut summary = UploadSummary::default();
    for path in files {
        match upload_one(api, path, tag_id) {
            Ok(()) => summary.uploaded += 1,
            Err(e) => {
                warn!(path = %path.display(), "upload failed: {e}");
                println!("ERROR {}: {}", path.display(), e);
                summary.failed.push(path.clone());
            }
        }
    }
    info!(
        uploaded = summary.uploaded,
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}

fn upload_one(
    api: &dyn PaperlessApi,
    path: &Path,
    tag_id: Option<u64>,
) -> std::result::Result<(), ApiError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Uploading {name}..."));
    let result = api.upload_document(path, tag_id);
    spinner.finish_and_clear();

    if result.is_ok() {
        println!("File {name} successfully uploaded");
    }
    result
}

/// Check the credentials against the server, then persist them.
pub fn login(store: &ConfigStore, api: &dyn PaperlessApi, config: Config) -> Result<Config> {
    config.check_storable()?;
    api.test_connection()?;
    println!("Config successfully tested, writing to disk");
    let saved = store.write(&config)?;
    println!("Config successfully written to {}", store.path().display());
    Ok(saved)
}

fn ensure_files(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        return Err(Error::Usage("no files given".to_string()));
    }
    Ok(())
}
