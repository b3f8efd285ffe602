// Configuration storage: the server URL and credentials live in an INI file
// under the user's configuration directory, section `server`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::{EscapePolicy, Ini, ParseOption};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// File name inside the per-user configuration directory.
pub const CONFIG_FILE_NAME: &str = "paperless-uploader.ini";

const SECTION: &str = "server";
const KEY_URL: &str = "url";
const KEY_USERNAME: &str = "username";
const KEY_PASSWORD: &str = "password";

/// Connection settings for one Paperless server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub server_url: String,
    pub username: String,
    pub password: String,
}

impl Config {
    pub fn new(
        server_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server_url: server_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Refuse values the INI file cannot hold unchanged.
    pub fn check_storable(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            (KEY_URL, &self.server_url),
            (KEY_USERNAME, &self.username),
            (KEY_PASSWORD, &self.password),
        ] {
            if value.trim() != value.as_str() {
                return Err(ConfigError::Unrepresentable { key });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"EXPUNGED")
            .finish()
    }
}

/// Reads and writes a [`Config`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by `<user config dir>/paperless-uploader.ini`.
    pub fn locate() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dir.join(CONFIG_FILE_NAME)))
    }

    /// Store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration. Absent keys read as empty strings.
    pub fn read(&self) -> Result<Config, ConfigError> {
        let doc = self.load()?;
        let get = |key: &str| doc.get_from(Some(SECTION), key).unwrap_or_default().to_owned();
        let config = Config {
            server_url: get(KEY_URL),
            username: get(KEY_USERNAME),
            password: get(KEY_PASSWORD),
        };
        debug!(path = %self.path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Save the three server keys, keeping anything else already in the file.
    /// A missing or unreadable existing file is replaced by a fresh document.
    pub fn write(&self, config: &Config) -> Result<Config, ConfigError> {
        config.check_storable()?;
        let mut doc = match self.load() {
            Ok(doc) => doc,
            Err(ConfigError::NotFound { .. }) => Ini::new(),
            Err(err) => {
                warn!("starting from an empty configuration: {err}");
                Ini::new()
            }
        };

        doc.with_section(Some(SECTION))
            .set(KEY_URL, config.server_url.as_str())
            .set(KEY_USERNAME, config.username.as_str())
            .set(KEY_PASSWORD, config.password.as_str());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Save {
                path: self.path.clone(),
                source,
            })?;
        }
        doc.write_to_file_policy(&self.path, EscapePolicy::Reserved)
            .map_err(|source| ConfigError::Save {
                path: self.path.clone(),
                source,
            })?;

        info!(path = %self.path.display(), "configuration written");
        Ok(config.clone())
    }

    fn load(&self) -> Result<Ini, ConfigError> {
        // Quotes are part of the value: passwords may legitimately contain them.
        let opt = ParseOption {
            enabled_quote: false,
            ..ParseOption::default()
        };
        Ini::load_from_file_opt(&self.path, opt).map_err(|err| match err {
            ini::Error::Io(source) if source.kind() == io::ErrorKind::NotFound => {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            }
            ini::Error::Io(source) => ConfigError::Read {
                path: self.path.clone(),
                source,
            },
            ini::Error::Parse(source) => ConfigError::Parse {
                path: self.path.clone(),
                source,
            },
        })
    }
}
