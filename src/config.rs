//! Configuration file handling for spendlog.
//!
//! The configuration file is stored at `$SPENDLOG_HOME/config.json` and contains the base URL
//! of the expense API and the default page size. The `.secrets` subdirectory holds the saved
//! session.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "spendlog";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";

pub(crate) const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5001/api";
pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

/// The `Config` object represents the configuration of the app. You instantiate it by
/// providing the path to `$SPENDLOG_HOME` and from there it loads
/// `$SPENDLOG_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory and its `.secrets` subdirectory, and writes an initial
    /// `config.json` pointing at `api_base_url`.
    ///
    /// # Errors
    /// - Returns an error if `api_base_url` does not parse as a URL.
    /// - Returns an error if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        api_base_url: &str,
        page_size: u32,
    ) -> Result<Self> {
        let _ = Url::parse(api_base_url)
            .with_context(|| format!("'{api_base_url}' is not a valid API base URL"))?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the spendlog home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_base_url: api_base_url.to_string(),
            page_size,
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            config_path,
            config_file,
        })
    }

    /// Validates that the home directory, config file and secrets directory exist, and loads
    /// the configuration.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Spendlog home is missing, run 'spendlog init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'spendlog init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_base_url(&self) -> &str {
        &self.config_file.api_base_url
    }

    pub fn page_size(&self) -> u32 {
        self.config_file.page_size
    }

    /// Where the saved session lives.
    pub(crate) fn session_path(&self) -> PathBuf {
        self.secrets.join(SESSION_JSON)
    }

    /// The key identifying this home's in-memory test-store state.
    pub(crate) fn store_key(&self) -> String {
        self.root.to_string_lossy().to_string()
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spendlog",
///   "config_version": 1,
///   "api_base_url": "http://127.0.0.1:5001/api",
///   "page_size": 10
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spendlog"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the expense API, e.g. http://127.0.0.1:5001/api
    api_base_url: String,

    /// Default number of records per page for list requests
    #[serde(default = "default_page_size")]
    page_size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
