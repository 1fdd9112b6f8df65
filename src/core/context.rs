//! Application context - portal plus configuration, built once per command
//!
//! Commands that operate on a portal build an `AppContext` at startup and
//! pass it down explicitly. Nothing in the crate reads shared mutable state.

use crate::core::config::Config;
use crate::core::project::{Project, ProjectError};
use crate::core::team::TeamRoster;

/// Everything a command needs: the discovered portal and merged config.
pub struct AppContext {
    pub project: Project,
    pub config: Config,
}

impl AppContext {
    /// Discover the portal from the current directory and load config.
    pub fn discover() -> Result<Self, ProjectError> {
        let project = Project::discover()?;
        let config = Config::load();
        Ok(Self { project, config })
    }

    /// Discover the portal from an explicit root override.
    pub fn discover_at(root: Option<&std::path::Path>) -> Result<Self, ProjectError> {
        let project = match root {
            Some(path) => Project::discover_from(path)?,
            None => Project::discover()?,
        };
        let config = Config::load();
        Ok(Self { project, config })
    }

    /// Load the team roster, if one is configured.
    pub fn roster(&self) -> Option<TeamRoster> {
        TeamRoster::load(&self.project).ok().flatten()
    }
}
