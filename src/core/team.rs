//! Staff roster and role management for billing authorization

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::Project;

/// Portal roles for authorization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Physician,
    Nursing,
    Billing,
    Records,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Physician => write!(f, "physician"),
            Role::Nursing => write!(f, "nursing"),
            Role::Billing => write!(f, "billing"),
            Role::Records => write!(f, "records"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "physician" => Ok(Role::Physician),
            "nursing" => Ok(Role::Nursing),
            "billing" => Ok(Role::Billing),
            "records" => Ok(Role::Records),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A roster member with their roles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TeamMember {
    /// Check if member has a specific role
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if member has any of the specified roles
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.roles.contains(r))
    }

    /// Check if member is an admin (can bypass authorization)
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Check if member may drive the billing pipeline
    pub fn can_process_billing(&self) -> bool {
        self.is_admin() || self.has_role(Role::Billing)
    }
}

/// The portal roster stored in .hsp/team.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl TeamRoster {
    /// Load the roster from the portal, if one exists
    pub fn load(project: &Project) -> Result<Option<Self>, serde_yml::Error> {
        let path = project.hsp_dir().join("team.yaml");
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Ok(None);
        };
        serde_yml::from_str(&contents).map(Some)
    }

    /// Save the roster into the portal
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.hsp_dir().join("team.yaml");
        let yaml = serde_yml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(path, yaml)
    }

    /// Find a member by name or email (case-insensitive)
    pub fn find(&self, who: &str) -> Option<&TeamMember> {
        let who = who.to_lowercase();
        self.members
            .iter()
            .filter(|m| m.active)
            .find(|m| m.name.to_lowercase() == who || m.email.to_lowercase() == who)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(roles: &[Role]) -> TeamMember {
        TeamMember {
            name: "Dana Osei".to_string(),
            email: "dana@example.org".to_string(),
            roles: roles.to_vec(),
            active: true,
        }
    }

    #[test]
    fn test_billing_role_gates_pipeline() {
        assert!(member(&[Role::Billing]).can_process_billing());
        assert!(member(&[Role::Admin]).can_process_billing());
        assert!(!member(&[Role::Nursing]).can_process_billing());
        assert!(!member(&[]).can_process_billing());
    }

    #[test]
    fn test_roster_find_matches_name_and_email() {
        let roster = TeamRoster {
            members: vec![member(&[Role::Physician])],
        };
        assert!(roster.find("dana osei").is_some());
        assert!(roster.find("DANA@example.org").is_some());
        assert!(roster.find("nobody").is_none());
    }

    #[test]
    fn test_inactive_members_are_skipped() {
        let mut m = member(&[Role::Billing]);
        m.active = false;
        let roster = TeamRoster { members: vec![m] };
        assert!(roster.find("dana osei").is_none());
    }
}
