//! Staff directory entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::Role;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StaffStatus {
    #[default]
    Active,
    OnLeave,
    Suspended,
    Departed,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::OnLeave => "on-leave",
            StaffStatus::Suspended => "suspended",
            StaffStatus::Departed => "departed",
        }
    }
}

impl std::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StaffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(StaffStatus::Active),
            "on-leave" | "on_leave" => Ok(StaffStatus::OnLeave),
            "suspended" => Ok(StaffStatus::Suspended),
            "departed" => Ok(StaffStatus::Departed),
            _ => Err(format!("Unknown staff status: {}", s)),
        }
    }
}

/// A staff directory member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    /// Unique identifier
    pub id: EntityId,

    /// Full name
    pub name: String,

    /// Portal role
    pub role: Role,

    /// Department or unit
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,

    /// Work email
    pub email: String,

    /// Work phone
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Hire date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hired: Option<NaiveDate>,

    /// Employment status
    #[serde(default)]
    pub status: StaffStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Staff {
    pub fn new(name: String, role: Role, email: String, author: String) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Stf),
            name,
            role,
            department: String::new(),
            email,
            phone: String::new(),
            hired: None,
            status: StaffStatus::default(),
            created: Utc::now(),
            author,
            revision: 1,
        }
    }
}

impl Entity for Staff {
    const PREFIX: &'static str = "STF";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_roundtrip() {
        let staff = Staff::new(
            "Dr. Lena Park".to_string(),
            Role::Physician,
            "lpark@hospital.org".to_string(),
            "test".to_string(),
        );

        let yaml = serde_yml::to_string(&staff).unwrap();
        let parsed: Staff = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(staff.id, parsed.id);
        assert_eq!(parsed.role, Role::Physician);
        assert_eq!(parsed.status, StaffStatus::Active);
    }

    #[test]
    fn test_staff_status_serializes_kebab_case() {
        let mut staff = Staff::new(
            "N. Okafor".to_string(),
            Role::Nursing,
            "n@hospital.org".to_string(),
            "test".to_string(),
        );
        staff.status = StaffStatus::OnLeave;
        let yaml = serde_yml::to_string(&staff).unwrap();
        assert!(yaml.contains("status: on-leave"));
    }
}
