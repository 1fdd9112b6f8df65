//! Patient entity type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Patient census status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Admitted,
    #[default]
    Outpatient,
    Discharged,
    Transferred,
    Deceased,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Admitted => "admitted",
            PatientStatus::Outpatient => "outpatient",
            PatientStatus::Discharged => "discharged",
            PatientStatus::Transferred => "transferred",
            PatientStatus::Deceased => "deceased",
        }
    }
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admitted" => Ok(PatientStatus::Admitted),
            "outpatient" => Ok(PatientStatus::Outpatient),
            "discharged" => Ok(PatientStatus::Discharged),
            "transferred" => Ok(PatientStatus::Transferred),
            "deceased" => Ok(PatientStatus::Deceased),
            _ => Err(format!("Unknown patient status: {}", s)),
        }
    }
}

/// Insurance coverage on file for a patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Coverage {
    /// Insurer name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payer: String,

    /// Policy number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy_number: String,

    /// Group number
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_number: String,
}

/// A patient record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Unique identifier
    pub id: EntityId,

    /// Medical record number assigned by the facility
    pub mrn: String,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Contact phone
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,

    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Insurance coverage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Coverage>,

    /// Attending staff member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attending: Option<EntityId>,

    /// Current census status
    #[serde(default)]
    pub status: PatientStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this record)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,

    /// Full display name, cached for listings
    #[serde(skip)]
    display_name: std::cell::OnceCell<String>,
}

fn default_revision() -> u32 {
    1
}

impl Patient {
    /// Create a new patient record
    pub fn new(
        mrn: String,
        first_name: String,
        last_name: String,
        date_of_birth: NaiveDate,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Pat),
            mrn,
            first_name,
            last_name,
            date_of_birth,
            phone: String::new(),
            email: None,
            coverage: None,
            attending: None,
            status: PatientStatus::default(),
            created: Utc::now(),
            author,
            revision: 1,
            display_name: std::cell::OnceCell::new(),
        }
    }

    /// "Last, First" display form used by listings
    pub fn display_name(&self) -> &str {
        self.display_name
            .get_or_init(|| format!("{}, {}", self.last_name, self.first_name))
    }
}

impl Entity for Patient {
    const PREFIX: &'static str = "PAT";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        self.display_name()
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
    fn test_patient_roundtrip() {
        let patient = Patient::new(
            "MRN-1001".to_string(),
            "Ada".to_string(),
            "Nguyen".to_string(),
            NaiveDate::from_ymd_opt(1984, 5, 12).unwrap(),
            "test".to_string(),
        );

        let yaml = serde_yml::to_string(&patient).unwrap();
        let parsed: Patient = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(patient.id, parsed.id);
        assert_eq!(parsed.mrn, "MRN-1001");
        assert_eq!(parsed.status, PatientStatus::Outpatient);
    }

    #[test]
    fn test_patient_display_name() {
        let patient = Patient::new(
            "MRN-1".to_string(),
            "Ada".to_string(),
            "Nguyen".to_string(),
            NaiveDate::from_ymd_opt(1984, 5, 12).unwrap(),
            "test".to_string(),
        );
        assert_eq!(patient.display_name(), "Nguyen, Ada");
    }

    #[test]
    fn test_patient_status_parses() {
        assert_eq!(
            "ADMITTED".parse::<PatientStatus>().unwrap(),
            PatientStatus::Admitted
        );
        assert!("inpatient".parse::<PatientStatus>().is_err());
    }
}
