//! Clinical note entity type

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Kind of clinical note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    Progress,
    Admission,
    Discharge,
    Consult,
    Procedure,
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoteType::Progress => write!(f, "progress"),
            NoteType::Admission => write!(f, "admission"),
            NoteType::Discharge => write!(f, "discharge"),
            NoteType::Consult => write!(f, "consult"),
            NoteType::Procedure => write!(f, "procedure"),
        }
    }
}

impl std::str::FromStr for NoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "progress" => Ok(NoteType::Progress),
            "admission" => Ok(NoteType::Admission),
            "discharge" => Ok(NoteType::Discharge),
            "consult" => Ok(NoteType::Consult),
            "procedure" => Ok(NoteType::Procedure),
            _ => Err(format!("Unknown note type: {}", s)),
        }
    }
}

/// Note signing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Draft,
    Signed,
    Amended,
}

impl NoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteStatus::Draft => "draft",
            NoteStatus::Signed => "signed",
            NoteStatus::Amended => "amended",
        }
    }
}

impl std::fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors from note lifecycle operations
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("only draft notes can be signed (current: {current})")]
    NotDraft { current: NoteStatus },

    #[error("only signed notes can be amended (current: {current})")]
    NotSigned { current: NoteStatus },
}

/// A clinical note in a patient's record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: EntityId,

    /// Patient the note belongs to
    pub patient_id: EntityId,

    /// Kind of note
    #[serde(rename = "type")]
    pub note_type: NoteType,

    /// Short subject line
    pub title: String,

    /// Note body
    pub text: String,

    /// Signing status
    #[serde(default)]
    pub status: NoteStatus,

    /// Who signed the note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,

    /// When the note was signed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,

    /// Amendment appended after signing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendment: Option<String>,

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

impl Note {
    pub fn new(
        patient_id: EntityId,
        note_type: NoteType,
        title: String,
        text: String,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Note),
            patient_id,
            note_type,
            title,
            text,
            status: NoteStatus::default(),
            signed_by: None,
            signed_at: None,
            amendment: None,
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Sign a draft note, locking its content
    pub fn sign(&mut self, signer: &str) -> Result<(), NoteError> {
        if self.status != NoteStatus::Draft {
            return Err(NoteError::NotDraft {
                current: self.status,
            });
        }
        self.status = NoteStatus::Signed;
        self.signed_by = Some(signer.to_string());
        self.signed_at = Some(Utc::now());
        Ok(())
    }

    /// Append an amendment to a signed note
    pub fn amend(&mut self, text: String) -> Result<(), NoteError> {
        if self.status != NoteStatus::Signed {
            return Err(NoteError::NotSigned {
                current: self.status,
            });
        }
        self.status = NoteStatus::Amended;
        self.amendment = Some(text);
        Ok(())
    }
}

impl Entity for Note {
    const PREFIX: &'static str = "NOTE";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
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

    fn note() -> Note {
        Note::new(
            EntityId::new(EntityPrefix::Pat),
            NoteType::Progress,
            "Day 2 rounds".to_string(),
            "Afebrile, tolerating diet.".to_string(),
            "test".to_string(),
        )
    }

    #[test]
    fn test_sign_then_amend() {
        let mut n = note();
        n.sign("Dr. Park").unwrap();
        assert_eq!(n.status, NoteStatus::Signed);
        assert_eq!(n.signed_by.as_deref(), Some("Dr. Park"));

        n.amend("Addendum: labs reviewed.".to_string()).unwrap();
        assert_eq!(n.status, NoteStatus::Amended);
    }

    #[test]
    fn test_double_sign_is_rejected() {
        let mut n = note();
        n.sign("Dr. Park").unwrap();
        let err = n.sign("Dr. Park").unwrap_err();
        assert!(matches!(err, NoteError::NotDraft { .. }));
    }

    #[test]
    fn test_amend_requires_signature() {
        let mut n = note();
        let err = n.amend("too early".to_string()).unwrap_err();
        assert!(matches!(err, NoteError::NotSigned { .. }));
    }

    #[test]
    fn test_note_roundtrip() {
        let n = note();
        let yaml = serde_yml::to_string(&n).unwrap();
        let parsed: Note = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(n.id, parsed.id);
        assert!(yaml.contains("type: progress"));
    }
}
