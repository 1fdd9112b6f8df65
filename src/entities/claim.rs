//! Insurance claim entity type with a role-guarded status pipeline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::team::TeamMember;

/// Claim pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimStatus {
    #[default]
    Draft,
    Submitted,
    InReview,
    Approved,
    Denied,
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::InReview => "in-review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Paid => "paid",
        }
    }

    /// All statuses, for filters and dashboards
    pub fn all() -> &'static [ClaimStatus] {
        &[
            ClaimStatus::Draft,
            ClaimStatus::Submitted,
            ClaimStatus::InReview,
            ClaimStatus::Approved,
            ClaimStatus::Denied,
            ClaimStatus::Paid,
        ]
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ClaimStatus::Draft),
            "submitted" => Ok(ClaimStatus::Submitted),
            "in-review" | "in_review" | "review" => Ok(ClaimStatus::InReview),
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            "paid" => Ok(ClaimStatus::Paid),
            _ => Err(format!("Unknown claim status: {}", s)),
        }
    }
}

/// Errors from the claim pipeline
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("invalid claim transition: {from} -> {to}")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("authorization required: {to} requires the billing role")]
    Unauthorized { to: ClaimStatus },
}

/// A pipeline event appended on each transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub status: ClaimStatus,
    pub by: String,
    pub at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An insurance claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: EntityId,

    /// Patient the claim is for
    pub patient_id: EntityId,

    /// Insurer name
    pub payer: String,

    /// Policy number with the insurer
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub policy_number: String,

    /// Claimed amount
    pub amount: f64,

    /// Date of service
    pub service_date: NaiveDate,

    /// Short description of the service billed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Current pipeline status
    #[serde(default)]
    pub status: ClaimStatus,

    /// Reason recorded when a claim is denied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,

    /// Transition history
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<ClaimEvent>,

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

impl Claim {
    pub fn new(
        patient_id: EntityId,
        payer: String,
        amount: f64,
        service_date: NaiveDate,
        author: String,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Clm),
            patient_id,
            payer,
            policy_number: String::new(),
            amount,
            service_date,
            description: String::new(),
            status: ClaimStatus::default(),
            denial_reason: None,
            events: Vec::new(),
            created: Utc::now(),
            author,
            revision: 1,
        }
    }

    /// Check if a status transition is valid
    pub fn is_valid_transition(from: ClaimStatus, to: ClaimStatus) -> bool {
        matches!(
            (from, to),
            (ClaimStatus::Draft, ClaimStatus::Submitted)
                | (ClaimStatus::Submitted, ClaimStatus::InReview)
                | (ClaimStatus::InReview, ClaimStatus::Approved)
                | (ClaimStatus::InReview, ClaimStatus::Denied)
                | (ClaimStatus::Approved, ClaimStatus::Paid)
                // A denied claim can be corrected and resubmitted
                | (ClaimStatus::Denied, ClaimStatus::Submitted)
        )
    }

    /// Get allowed transitions from the current status
    pub fn allowed_transitions(current: ClaimStatus) -> Vec<ClaimStatus> {
        match current {
            ClaimStatus::Draft => vec![ClaimStatus::Submitted],
            ClaimStatus::Submitted => vec![ClaimStatus::InReview],
            ClaimStatus::InReview => vec![ClaimStatus::Approved, ClaimStatus::Denied],
            ClaimStatus::Approved => vec![ClaimStatus::Paid],
            ClaimStatus::Denied => vec![ClaimStatus::Submitted],
            ClaimStatus::Paid => vec![],
        }
    }

    /// Does the transition require the billing role?
    fn requires_billing_role(to: ClaimStatus) -> bool {
        matches!(
            to,
            ClaimStatus::InReview | ClaimStatus::Approved | ClaimStatus::Denied | ClaimStatus::Paid
        )
    }

    /// Move the claim through the pipeline, recording an event.
    ///
    /// `member` is the acting roster member; `None` means no roster is
    /// configured, in which case role checks are skipped.
    pub fn transition(
        &mut self,
        to: ClaimStatus,
        member: Option<&TeamMember>,
        actor: &str,
        note: Option<String>,
    ) -> Result<(), ClaimError> {
        if !Self::is_valid_transition(self.status, to) {
            return Err(ClaimError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        if Self::requires_billing_role(to) {
            if let Some(member) = member {
                if !member.can_process_billing() {
                    return Err(ClaimError::Unauthorized { to });
                }
            }
        }

        if to == ClaimStatus::Denied {
            self.denial_reason = note.clone();
        } else if to == ClaimStatus::Submitted {
            // Resubmission clears the previous denial
            self.denial_reason = None;
        }

        self.status = to;
        self.events.push(ClaimEvent {
            status: to,
            by: actor.to_string(),
            at: Utc::now(),
            note,
        });

        Ok(())
    }
}

impl Entity for Claim {
    const PREFIX: &'static str = "CLM";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.payer
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
    use crate::core::team::Role;

    fn claim() -> Claim {
        Claim::new(
            EntityId::new(EntityPrefix::Pat),
            "Blue Harbor Mutual".to_string(),
            1250.00,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            "test".to_string(),
        )
    }

    fn billing_member() -> TeamMember {
        TeamMember {
            name: "Billing Bee".to_string(),
            email: "bee@hospital.org".to_string(),
            roles: vec![Role::Billing],
            active: true,
        }
    }

    fn nursing_member() -> TeamMember {
        TeamMember {
            name: "Nurse Ray".to_string(),
            email: "ray@hospital.org".to_string(),
            roles: vec![Role::Nursing],
            active: true,
        }
    }

    #[test]
    fn test_transition_matrix() {
        assert!(Claim::is_valid_transition(
            ClaimStatus::Draft,
            ClaimStatus::Submitted
        ));
        assert!(Claim::is_valid_transition(
            ClaimStatus::Denied,
            ClaimStatus::Submitted
        ));
        assert!(!Claim::is_valid_transition(
            ClaimStatus::Draft,
            ClaimStatus::Paid
        ));
        assert!(!Claim::is_valid_transition(
            ClaimStatus::Paid,
            ClaimStatus::Draft
        ));
        assert!(Claim::allowed_transitions(ClaimStatus::Paid).is_empty());
    }

    #[test]
    fn test_full_pipeline_with_billing_role() {
        let mut c = claim();
        let bee = billing_member();

        c.transition(ClaimStatus::Submitted, Some(&bee), "bee", None)
            .unwrap();
        c.transition(ClaimStatus::InReview, Some(&bee), "bee", None)
            .unwrap();
        c.transition(ClaimStatus::Approved, Some(&bee), "bee", None)
            .unwrap();
        c.transition(ClaimStatus::Paid, Some(&bee), "bee", None)
            .unwrap();

        assert_eq!(c.status, ClaimStatus::Paid);
        assert_eq!(c.events.len(), 4);
    }

    #[test]
    fn test_non_billing_member_cannot_review() {
        let mut c = claim();
        let ray = nursing_member();

        // Anyone can submit a draft
        c.transition(ClaimStatus::Submitted, Some(&ray), "ray", None)
            .unwrap();

        let err = c
            .transition(ClaimStatus::InReview, Some(&ray), "ray", None)
            .unwrap_err();
        assert!(matches!(err, ClaimError::Unauthorized { .. }));
        assert_eq!(c.status, ClaimStatus::Submitted);
    }

    #[test]
    fn test_denial_records_reason_and_resubmit_clears_it() {
        let mut c = claim();
        let bee = billing_member();

        c.transition(ClaimStatus::Submitted, None, "anon", None).unwrap();
        c.transition(ClaimStatus::InReview, Some(&bee), "bee", None)
            .unwrap();
        c.transition(
            ClaimStatus::Denied,
            Some(&bee),
            "bee",
            Some("missing policy number".to_string()),
        )
        .unwrap();
        assert_eq!(c.denial_reason.as_deref(), Some("missing policy number"));

        c.transition(ClaimStatus::Submitted, None, "anon", None).unwrap();
        assert!(c.denial_reason.is_none());
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut c = claim();
        let err = c
            .transition(ClaimStatus::Paid, None, "anon", None)
            .unwrap_err();
        assert!(matches!(err, ClaimError::InvalidTransition { .. }));
        assert_eq!(c.status, ClaimStatus::Draft);
        assert!(c.events.is_empty());
    }

    #[test]
    fn test_claim_roundtrip() {
        let c = claim();
        let yaml = serde_yml::to_string(&c).unwrap();
        let parsed: Claim = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(c.id, parsed.id);
        assert_eq!(parsed.status, ClaimStatus::Draft);
    }
}
