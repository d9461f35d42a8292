//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::project::Project;
use crate::core::session::UserId;

/// User id recorded when nothing else is configured
const DEFAULT_USER_ID: i64 = 1;

/// Inventory configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Acting user id for created_by / last_updated_by
    pub user_id: Option<i64>,

    /// Database file override
    pub database: Option<PathBuf>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/invman/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.invman/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.state_dir().join("config.yaml"))
            {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Some(user_id) = std::env::var("INVMAN_USER_ID")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            config.user_id = Some(user_id);
        }
        if let Ok(database) = std::env::var("INVMAN_DATABASE") {
            if !database.trim().is_empty() {
                config.database = Some(PathBuf::from(database));
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // A file of only comments is an empty document
        if contents
            .lines()
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'))
        {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "invman")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.user_id.is_some() {
            self.user_id = other.user_id;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Acting user for mutating operations
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id.unwrap_or(DEFAULT_USER_ID))
    }

    /// Database location, relative paths resolved against the project root
    pub fn database_path(&self, project: &Project) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => project.root().join(path),
            None => project.database_path(),
        }
    }
}
