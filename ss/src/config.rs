//! semsync configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dispatch::DispatchConfig;

/// Main semsync configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rate limit, timeout and retry settings
    pub dispatch: DispatchConfig,

    /// Notion API settings
    pub notion: NotionConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Dispatch parameters are always checked. Notion credentials and database
    /// ids are only required when records will really be created.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        self.dispatch.validate().map_err(|e| eyre::eyre!(e))?;

        if dry_run {
            return Ok(());
        }

        self.notion.get_api_key()?;
        if self.notion.task_database.trim().is_empty() {
            return Err(eyre::eyre!("notion.task-database is not set"));
        }
        if self.notion.course_database.trim().is_empty() {
            return Err(eyre::eyre!("notion.course-database is not set"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .semsync.yml
        let local_config = PathBuf::from(".semsync.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/semsync/semsync.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("semsync").join("semsync.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Notion API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Environment variable containing the integration token
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Value sent in the Notion-Version header
    #[serde(rename = "notion-version")]
    pub notion_version: String,

    /// Database that receives one page per work item
    #[serde(rename = "task-database")]
    pub task_database: String,

    /// Database that receives the course page
    #[serde(rename = "course-database")]
    pub course_database: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// IANA zone name attached to page dates, e.g. "America/Los_Angeles"
    #[serde(rename = "time-zone")]
    pub time_zone: Option<String>,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key_env: "NOTION_API_KEY".to_string(),
            base_url: "https://api.notion.com".to_string(),
            notion_version: "2022-06-28".to_string(),
            task_database: String::new(),
            course_database: String::new(),
            timeout_ms: 30_000,
            time_zone: None,
        }
    }
}

impl NotionConfig {
    /// Read the integration token from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        let key = std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Notion API key not found. Set the {} environment variable.", self.api_key_env))?;
        if key.trim().is_empty() {
            return Err(eyre::eyre!("{} is set but empty", self.api_key_env));
        }
        Ok(key.trim().to_string())
    }
}
