//! Staff credential entity type
//!
//! Credentials store only their issue and expiry dates; the valid/expiring/
//! expired state is derived from the expiry date at read time, never stored.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Days before expiry at which a credential is flagged as expiring
pub const EXPIRY_WARNING_DAYS: u64 = 90;

/// Kind of credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialKind {
    #[default]
    License,
    BoardCertification,
    DeaRegistration,
    CprCertification,
    Other,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::License => write!(f, "license"),
            CredentialKind::BoardCertification => write!(f, "board-certification"),
            CredentialKind::DeaRegistration => write!(f, "dea-registration"),
            CredentialKind::CprCertification => write!(f, "cpr-certification"),
            CredentialKind::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "license" => Ok(CredentialKind::License),
            "board-certification" | "board_certification" => {
                Ok(CredentialKind::BoardCertification)
            }
            "dea-registration" | "dea_registration" | "dea" => Ok(CredentialKind::DeaRegistration),
            "cpr-certification" | "cpr_certification" | "cpr" => Ok(CredentialKind::CprCertification),
            "other" => Ok(CredentialKind::Other),
            _ => Err(format!("Unknown credential kind: {}", s)),
        }
    }
}

/// Derived credential state, computed from the expiry date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    Valid,
    Expiring,
    Expired,
}

impl ExpiryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryState::Valid => "valid",
            ExpiryState::Expiring => "expiring",
            ExpiryState::Expired => "expired",
        }
    }
}

impl std::fmt::Display for ExpiryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A credential held by a staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier
    pub id: EntityId,

    /// Staff member holding the credential
    pub staff_id: EntityId,

    /// Credential kind
    pub kind: CredentialKind,

    /// Credential name (e.g., "State Medical License")
    pub name: String,

    /// License or certificate number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub number: String,

    /// Issuing body
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,

    /// Issue date
    pub issued: NaiveDate,

    /// Expiry date
    pub expires: NaiveDate,

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

impl Credential {
    pub fn new(
        staff_id: EntityId,
        kind: CredentialKind,
        name: String,
        issued: NaiveDate,
        expires: NaiveDate,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cred),
            staff_id,
            kind,
            name,
            number: String::new(),
            issuer: String::new(),
            issued,
            expires,
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Derive the credential state as of the given day
    pub fn expiry_state(&self, today: NaiveDate) -> ExpiryState {
        if self.expires < today {
            ExpiryState::Expired
        } else if self.expires <= today + Days::new(EXPIRY_WARNING_DAYS) {
            ExpiryState::Expiring
        } else {
            ExpiryState::Valid
        }
    }
}

impl Entity for Credential {
    const PREFIX: &'static str = "CRED";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &'static str {
        self.expiry_state(Utc::now().date_naive()).as_str()
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

    fn credential(expires: NaiveDate) -> Credential {
        Credential::new(
            EntityId::new(EntityPrefix::Stf),
            CredentialKind::License,
            "State Medical License".to_string(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            expires,
            "test".to_string(),
        )
    }

    #[test]
    fn test_expiry_state_boundaries() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        // Day before today: expired
        let c = credential(today - Days::new(1));
        assert_eq!(c.expiry_state(today), ExpiryState::Expired);

        // Expiring today: still within the window, not expired
        let c = credential(today);
        assert_eq!(c.expiry_state(today), ExpiryState::Expiring);

        // Exactly at the warning horizon: expiring
        let c = credential(today + Days::new(EXPIRY_WARNING_DAYS));
        assert_eq!(c.expiry_state(today), ExpiryState::Expiring);

        // One day past the horizon: valid
        let c = credential(today + Days::new(EXPIRY_WARNING_DAYS + 1));
        assert_eq!(c.expiry_state(today), ExpiryState::Valid);
    }

    #[test]
    fn test_credential_roundtrip() {
        let c = credential(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let yaml = serde_yml::to_string(&c).unwrap();
        let parsed: Credential = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(c.id, parsed.id);
        assert_eq!(parsed.kind, CredentialKind::License);
        assert_eq!(parsed.expires, c.expires);
    }

    #[test]
    fn test_no_state_field_is_serialized() {
        let c = credential(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let yaml = serde_yml::to_string(&c).unwrap();
        assert!(!yaml.contains("state:"));
        assert!(!yaml.contains("status:"));
    }
}
