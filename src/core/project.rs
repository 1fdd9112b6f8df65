//! Portal project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Represents an HSP portal data directory
#[derive(Debug)]
pub struct Project {
    /// Root directory of the portal (parent of .hsp/)
    root: PathBuf,
}

impl Project {
    /// Find portal root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find portal root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            let hsp_dir = current.join(".hsp");
            if hsp_dir.is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new portal structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let hsp_dir = root.join(".hsp");
        if hsp_dir.exists() {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        Self::write_structure(&root)?;
        Ok(Self { root })
    }

    /// Force initialization even if .hsp/ exists
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::write_structure(&root)?;
        Ok(Self { root })
    }

    fn write_structure(root: &Path) -> Result<(), ProjectError> {
        let hsp_dir = root.join(".hsp");
        std::fs::create_dir_all(&hsp_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = hsp_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Self::create_entity_dirs(root)
    }

    fn default_config() -> &'static str {
        r#"# HSP Portal Configuration

# Default author for new records (can be overridden by global config)
# author: ""

# Editor to use for `hsp <entity> edit` commands (default: $EDITOR)
# editor: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Default timezone attached to hospital registrations
# timezone: "UTC"
"#
    }

    fn create_entity_dirs(root: &Path) -> Result<(), ProjectError> {
        let dirs = [
            "hospital",
            "patients",
            "staff/directory",
            "staff/credentials",
            "billing/claims",
            "billing/invoices",
            "records/notes",
        ];

        for dir in dirs {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    /// Get the portal root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .hsp configuration directory
    pub fn hsp_dir(&self) -> PathBuf {
        self.root.join(".hsp")
    }

    /// Get the path for a new entity file
    pub fn entity_path(&self, prefix: EntityPrefix, id: &EntityId) -> PathBuf {
        let subdir = Self::entity_directory(prefix);
        self.root.join(subdir).join(format!("{}.hsp.yaml", id))
    }

    /// Get the directory for a given entity prefix
    pub fn entity_directory(prefix: EntityPrefix) -> &'static str {
        match prefix {
            EntityPrefix::Hosp => "hospital",
            EntityPrefix::Pat => "patients",
            EntityPrefix::Stf => "staff/directory",
            EntityPrefix::Cred => "staff/credentials",
            EntityPrefix::Clm => "billing/claims",
            EntityPrefix::Inv => "billing/invoices",
            EntityPrefix::Note => "records/notes",
        }
    }

    /// Iterate all entity files of a given prefix type
    pub fn iter_entity_files(&self, prefix: EntityPrefix) -> impl Iterator<Item = PathBuf> {
        let dir = self.root.join(Self::entity_directory(prefix));
        walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".hsp.yaml"))
            .map(|e| e.path().to_path_buf())
    }

    /// Iterate all entity files in the portal, regardless of type
    pub fn iter_all_entity_files(&self) -> impl Iterator<Item = PathBuf> {
        let root = self.root.clone();
        EntityPrefix::all()
            .iter()
            .flat_map(move |prefix| {
                let dir = root.join(Self::entity_directory(*prefix));
                walkdir::WalkDir::new(dir)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| e.path().to_string_lossy().ends_with(".hsp.yaml"))
                    .map(|e| e.path().to_path_buf())
            })
    }
}

/// Errors that can occur during portal operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not an HSP portal (searched from {searched_from:?}). Run 'hsp init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("HSP portal already exists at {0:?}")]
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

        assert!(project.hsp_dir().exists());
        assert!(project.hsp_dir().join("config.yaml").exists());
        assert!(project.root().join("patients").is_dir());
        assert!(project.root().join("staff/directory").is_dir());
        assert!(project.root().join("staff/credentials").is_dir());
        assert!(project.root().join("billing/claims").is_dir());
        assert!(project.root().join("billing/invoices").is_dir());
        assert!(project.root().join("records/notes").is_dir());
        assert!(project.root().join("hospital").is_dir());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_discover_finds_hsp_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        // Create a subdirectory
        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        // Discover from subdirectory should find root
        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_hsp_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_entity_path_lands_in_typed_directory() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let id = EntityId::new(EntityPrefix::Clm);
        let path = project.entity_path(EntityPrefix::Clm, &id);
        assert!(path.to_string_lossy().contains("billing/claims"));
        assert!(path.to_string_lossy().ends_with(".hsp.yaml"));
    }
}
