//! The registration wizard state machine
//!
//! Three linear steps, each gated by the step validator. The wizard owns all
//! step data: the active step's live record, plus one snapshot per step taken
//! when the user navigates away. Arriving at a step always starts it from a
//! blank record, so values never bleed in from a previous visit.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::identity::EntityId;
use crate::registration::gateway::{GatewayError, RegistrationGateway};
use crate::registration::payload::RegistrationPayload;
use crate::registration::record::{RegStep, StepRecord};
use crate::registration::validate::validate_step;

/// Where the one asynchronous operation stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded(EntityId),
    Failed(String),
}

/// Errors surfaced by wizard transitions
#[derive(Debug, Error)]
pub enum WizardError {
    /// Forward navigation or submission blocked by validation
    #[error("step '{step}' is incomplete")]
    StepIncomplete {
        step: RegStep,
        errors: BTreeMap<String, String>,
    },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("already at the final step; submit instead")]
    AtFinalStep,

    #[error("submit is only available on the final step (current: '{active}')")]
    NotOnFinalStep { active: RegStep },

    /// Defensive: a prior step's snapshot vanished before submission
    #[error("no saved data for step '{step}'")]
    MissingStep { step: RegStep },

    #[error("this registration was already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The wizard controller: sequences steps, persists snapshots, and hands the
/// aggregated payload to the gateway.
pub struct Wizard {
    active: RegStep,
    live: StepRecord,
    snapshots: [Option<StepRecord>; RegStep::COUNT],
    submission: SubmissionStatus,
    timezone: String,
}

impl Wizard {
    /// Start a fresh wizard on the first step.
    ///
    /// `timezone` is the portal default attached to the final payload.
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            active: RegStep::HospitalInfo,
            live: StepRecord::new(),
            snapshots: [None, None, None],
            submission: SubmissionStatus::Idle,
            timezone: timezone.into(),
        }
    }

    /// The step currently being edited
    pub fn active(&self) -> RegStep {
        self.active
    }

    /// Current submission state
    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    /// A field value on the active step
    pub fn field(&self, name: &str) -> Option<&str> {
        self.live.value(name)
    }

    /// A field value as the stepper header would see it: live for the active
    /// step, from the snapshot for any other step
    pub fn saved_field(&self, step: RegStep, name: &str) -> Option<&str> {
        if step == self.active {
            self.live.value(name)
        } else {
            self.snapshots[step.index()]
                .as_ref()
                .and_then(|record| record.value(name))
        }
    }

    /// The validator's report for the active step
    pub fn errors(&self) -> &BTreeMap<String, String> {
        self.live.errors()
    }

    /// Edit a field on the active step; the validator re-runs immediately
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.live.set(name, value);
        let errors = validate_step(self.active, self.live.fields());
        self.live.set_errors(errors);
    }

    /// Derive whether a step is complete.
    ///
    /// The active step is judged from its live record; other steps from their
    /// persisted snapshot. A step that has never been visited (no snapshot)
    /// is incomplete. Complete means every required field is non-blank after
    /// trimming and the validator reports no errors.
    pub fn is_complete(&self, step: RegStep) -> bool {
        let record = if step == self.active {
            Some(&self.live)
        } else {
            self.snapshots[step.index()].as_ref()
        };
        let Some(record) = record else {
            return false;
        };

        if !validate_step(step, record.fields()).is_empty() {
            return false;
        }

        step.fields()
            .iter()
            .filter(|f| f.required)
            .all(|f| record.value(f.name).is_some_and(|v| !v.trim().is_empty()))
    }

    /// Advance to the next step.
    ///
    /// Blocked unless the active step validates cleanly and is complete. On
    /// success the active step is snapshotted and the next step starts blank.
    pub fn next(&mut self) -> Result<(), WizardError> {
        let errors = validate_step(self.active, self.live.fields());
        self.live.set_errors(errors.clone());
        if !errors.is_empty() || !self.is_complete(self.active) {
            return Err(WizardError::StepIncomplete {
                step: self.active,
                errors,
            });
        }

        let Some(next) = self.active.next() else {
            return Err(WizardError::AtFinalStep);
        };

        self.snapshots[self.active.index()] = Some(self.live.snapshot());
        self.active = next;
        self.snapshots[next.index()] = None;
        self.live = StepRecord::new();
        Ok(())
    }

    /// Return to the previous step. Never blocked; the active step is
    /// snapshotted even when incomplete, and the previous step starts blank.
    pub fn back(&mut self) -> Result<(), WizardError> {
        let Some(prev) = self.active.prev() else {
            return Err(WizardError::AtFirstStep);
        };

        self.snapshots[self.active.index()] = Some(self.live.snapshot());
        self.active = prev;
        self.snapshots[prev.index()] = None;
        self.live = StepRecord::new();
        Ok(())
    }

    /// Submit the finished registration.
    ///
    /// Only valid on the final step. The final step is snapshotted and
    /// re-validated; all three snapshots are then merged (dropping the
    /// confirmation field, attaching the timezone) and handed to the gateway.
    /// On gateway failure the wizard stays on the final step with every
    /// entered value intact; nothing retries automatically.
    pub fn submit(&mut self, gateway: &dyn RegistrationGateway) -> Result<EntityId, WizardError> {
        if matches!(self.submission, SubmissionStatus::Succeeded(_)) {
            return Err(WizardError::AlreadySubmitted);
        }
        if self.active != RegStep::AdminAccount {
            return Err(WizardError::NotOnFinalStep {
                active: self.active,
            });
        }

        let errors = validate_step(self.active, self.live.fields());
        self.live.set_errors(errors.clone());
        if !errors.is_empty() {
            return Err(WizardError::StepIncomplete {
                step: self.active,
                errors,
            });
        }
        self.snapshots[self.active.index()] = Some(self.live.snapshot());

        let payload = self.assemble_payload()?;

        self.submission = SubmissionStatus::Submitting;
        match gateway.register(&payload) {
            Ok(id) => {
                self.submission = SubmissionStatus::Succeeded(id.clone());
                Ok(id)
            }
            Err(err) => {
                self.submission = SubmissionStatus::Failed(err.to_string());
                Err(WizardError::Gateway(err))
            }
        }
    }

    fn assemble_payload(&self) -> Result<RegistrationPayload, WizardError> {
        let snapshot = |step: RegStep| {
            self.snapshots[step.index()]
                .as_ref()
                .ok_or(WizardError::MissingStep { step })
        };

        let info = snapshot(RegStep::HospitalInfo)?;
        let address = snapshot(RegStep::Address)?;
        let admin = snapshot(RegStep::AdminAccount)?;

        Ok(RegistrationPayload::assemble(
            info.fields(),
            address.fields(),
            admin.fields(),
            &self.timezone,
        ))
    }
}
