//! Registered hospital entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;

/// Facility classification chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HospitalType {
    #[default]
    General,
    Clinic,
    Specialty,
    Teaching,
}

impl HospitalType {
    /// Accepted values, in the order the registration form offers them
    pub const NAMES: &'static [&'static str] = &["general", "clinic", "specialty", "teaching"];
}

impl std::fmt::Display for HospitalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HospitalType::General => write!(f, "general"),
            HospitalType::Clinic => write!(f, "clinic"),
            HospitalType::Specialty => write!(f, "specialty"),
            HospitalType::Teaching => write!(f, "teaching"),
        }
    }
}

impl std::str::FromStr for HospitalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(HospitalType::General),
            "clinic" => Ok(HospitalType::Clinic),
            "specialty" => Ok(HospitalType::Specialty),
            "teaching" => Ok(HospitalType::Teaching),
            _ => Err(format!("Unknown hospital type: {}", s)),
        }
    }
}

/// Hospital lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HospitalStatus {
    #[default]
    Active,
    Suspended,
}

impl std::fmt::Display for HospitalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HospitalStatus::Active => write!(f, "active"),
            HospitalStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Postal and business address block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Administrator contact captured at registration.
///
/// The administrator's password is handed to the registration gateway only
/// and is never stored in the hospital record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminContact {
    pub name: String,
    pub email: String,
}

/// A registered hospital
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    /// Unique identifier
    pub id: EntityId,

    /// Hospital display name
    pub name: String,

    /// Facility classification
    #[serde(rename = "type")]
    pub hospital_type: HospitalType,

    /// Main contact email
    pub email: String,

    /// Main contact phone
    pub phone: String,

    /// Public website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    /// Postal and business address
    pub address: Address,

    /// Operating license number
    pub license_number: String,

    /// Tax identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    /// IANA timezone name for the facility
    pub timezone: String,

    /// Portal administrator
    pub admin: AdminContact,

    /// Current status
    #[serde(default)]
    pub status: HospitalStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who registered this hospital)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Hospital {
    const PREFIX: &'static str = "HOSP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &'static str {
        match self.status {
            HospitalStatus::Active => "active",
            HospitalStatus::Suspended => "suspended",
        }
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
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_hospital_roundtrip() {
        let hospital = Hospital {
            id: EntityId::new(EntityPrefix::Hosp),
            name: "Acme Clinic".to_string(),
            hospital_type: HospitalType::Clinic,
            email: "a@b.com".to_string(),
            phone: "555-0100".to_string(),
            website: None,
            address: Address {
                line1: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                postal_code: "62701".to_string(),
                country: "US".to_string(),
            },
            license_number: "LIC-44".to_string(),
            tax_id: None,
            timezone: "UTC".to_string(),
            admin: AdminContact {
                name: "Pat Admin".to_string(),
                email: "admin@b.com".to_string(),
            },
            status: HospitalStatus::Active,
            created: Utc::now(),
            author: "test".to_string(),
            revision: 1,
        };

        let yaml = serde_yml::to_string(&hospital).unwrap();
        let parsed: Hospital = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(hospital.id, parsed.id);
        assert_eq!(hospital.name, parsed.name);
        assert_eq!(parsed.hospital_type, HospitalType::Clinic);
    }

    #[test]
    fn test_hospital_serializes_type_correctly() {
        let mut hospital: Hospital = serde_yml::from_str(&format!(
            r#"
id: {}
name: "General One"
type: teaching
email: g@h.org
phone: "555-0101"
address:
  line1: "2 Oak Ave"
  city: "Riverton"
  state: "CO"
  postal_code: "80000"
  country: "US"
license_number: "LIC-9"
timezone: "UTC"
admin:
  name: "Admin"
  email: "admin@h.org"
created: 2024-01-01T00:00:00Z
author: Test
"#,
            EntityId::new(EntityPrefix::Hosp)
        ))
        .unwrap();

        assert_eq!(hospital.hospital_type, HospitalType::Teaching);
        assert_eq!(hospital.revision, 1);
        hospital.hospital_type = HospitalType::General;
        let yaml = serde_yml::to_string(&hospital).unwrap();
        assert!(yaml.contains("type: general"));
    }
}
