//! Hospital registration workflow
//!
//! A three-step wizard (hospital info, address/business, administrator
//! account) with per-step validation, snapshot-on-navigate semantics, and a
//! single submission through the gateway seam.

pub mod gateway;
pub mod payload;
pub mod record;
pub mod validate;
pub mod wizard;

pub use gateway::{FileGateway, GatewayError, RegistrationGateway};
pub use payload::RegistrationPayload;
pub use record::{FieldKind, FieldSpec, RegStep, StepRecord};
pub use validate::validate_step;
pub use wizard::{SubmissionStatus, Wizard, WizardError};
