//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project state directory
pub const PROJECT_DIR: &str = ".invman";

/// Default database file inside the project directory
const DATABASE_FILE: &str = "inventory.db";

/// Represents an inventory project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .invman/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Initialize even if .invman/ exists (rewrites the default config)
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let state_dir = root.join(PROJECT_DIR);

        std::fs::create_dir_all(&state_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(state_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    pub(crate) fn default_config() -> &'static str {
        r#"# Inventory Manager project configuration

# Acting user id recorded in created_by / last_updated_by
# user_id: 1

# Database location (default: .invman/inventory.db)
# database: ""

# Default output format (auto, yaml, json, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .invman state directory
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Default database location for this project
    pub fn database_path(&self) -> PathBuf {
        self.state_dir().join(DATABASE_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an inventory project (searched from {searched_from:?}). Run 'invman init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("inventory project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.state_dir().is_dir());
        assert!(project.state_dir().join("config.yaml").exists());
        assert_eq!(
            project.database_path(),
            project.state_dir().join("inventory.db")
        );
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_from_nested_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(project.root(), tmp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_project_discover_fails_outside_project() {
        let tmp = tempdir().unwrap();

        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
