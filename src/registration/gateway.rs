//! The submission gateway seam
//!
//! The wizard hands a finished payload to a `RegistrationGateway` exactly
//! once per submission attempt. The portal ships a file-backed gateway that
//! persists the hospital record locally; tests substitute stubs.

use chrono::Utc;
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::entities::hospital::{Address, AdminContact, Hospital, HospitalStatus};
use crate::registration::payload::RegistrationPayload;
use crate::yaml::parse_yaml_file;

/// Errors a gateway can report back to the wizard
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("a hospital with email '{email}' is already registered")]
    Duplicate { email: String },

    #[error("registration could not be saved: {0}")]
    Io(String),

    #[error("registration could not be encoded: {0}")]
    Encode(String),
}

/// Accepts an aggregated registration payload and persists it
pub trait RegistrationGateway {
    /// Register a hospital, returning its new ID
    fn register(&self, payload: &RegistrationPayload) -> Result<EntityId, GatewayError>;
}

/// Gateway that writes the hospital record into the portal's data directory
pub struct FileGateway<'a> {
    project: &'a Project,
    author: String,
}

impl<'a> FileGateway<'a> {
    pub fn new(project: &'a Project, author: impl Into<String>) -> Self {
        Self {
            project,
            author: author.into(),
        }
    }
}

impl RegistrationGateway for FileGateway<'_> {
    fn register(&self, payload: &RegistrationPayload) -> Result<EntityId, GatewayError> {
        // Duplicate detection by hospital email, case-insensitive
        let email = payload.hospital_email.to_lowercase();
        for path in self.project.iter_entity_files(EntityPrefix::Hosp) {
            if let Ok(existing) = parse_yaml_file::<Hospital>(&path) {
                if existing.email.to_lowercase() == email {
                    return Err(GatewayError::Duplicate {
                        email: payload.hospital_email.clone(),
                    });
                }
            }
        }

        let id = EntityId::new(EntityPrefix::Hosp);
        let hospital = Hospital {
            id: id.clone(),
            name: payload.hospital_name.clone(),
            hospital_type: payload
                .hospital_type
                .parse()
                .map_err(GatewayError::Encode)?,
            email: payload.hospital_email.clone(),
            phone: payload.hospital_phone.clone(),
            website: payload.website.clone(),
            address: Address {
                line1: payload.address_line1.clone(),
                city: payload.city.clone(),
                state: payload.state.clone(),
                postal_code: payload.postal_code.clone(),
                country: payload.country.clone(),
            },
            license_number: payload.license_number.clone(),
            tax_id: payload.tax_id.clone(),
            timezone: payload.timezone.clone(),
            // The password goes no further than the gateway boundary
            admin: AdminContact {
                name: payload.admin_name.clone(),
                email: payload.admin_email.clone(),
            },
            status: HospitalStatus::Active,
            created: Utc::now(),
            author: self.author.clone(),
            revision: 1,
        };

        let yaml =
            serde_yml::to_string(&hospital).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let path = self.project.entity_path(EntityPrefix::Hosp, &id);
        std::fs::write(&path, yaml).map_err(|e| GatewayError::Io(e.to_string()))?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn payload() -> RegistrationPayload {
        RegistrationPayload {
            hospital_name: "Acme Clinic".to_string(),
            hospital_type: "clinic".to_string(),
            hospital_email: "a@b.com".to_string(),
            hospital_phone: "555-0100".to_string(),
            website: None,
            address_line1: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            license_number: "LIC-44".to_string(),
            tax_id: None,
            admin_name: "Pat Admin".to_string(),
            admin_email: "pat@b.com".to_string(),
            admin_password: "Abcd123!".to_string(),
            timezone: "UTC".to_string(),
        }
    }

    #[test]
    fn test_file_gateway_persists_hospital() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let gateway = FileGateway::new(&project, "test");

        let id = gateway.register(&payload()).unwrap();
        let path = project.entity_path(EntityPrefix::Hosp, &id);
        assert!(path.exists());

        let saved = parse_yaml_file::<Hospital>(&path).unwrap();
        assert_eq!(saved.name, "Acme Clinic");
        assert_eq!(saved.admin.email, "pat@b.com");
        assert_eq!(saved.timezone, "UTC");

        // The password must not be persisted
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("Abcd123!"));
    }

    #[test]
    fn test_file_gateway_rejects_duplicate_email() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let gateway = FileGateway::new(&project, "test");

        gateway.register(&payload()).unwrap();

        let mut second = payload();
        second.hospital_email = "A@B.COM".to_string();
        let err = gateway.register(&second).unwrap_err();
        assert!(matches!(err, GatewayError::Duplicate { .. }));
    }
}
