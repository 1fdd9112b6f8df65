//! Entity types stored in the portal

pub mod claim;
pub mod credential;
pub mod hospital;
pub mod invoice;
pub mod note;
pub mod patient;
pub mod staff;

pub use claim::{Claim, ClaimError, ClaimStatus};
pub use credential::{Credential, CredentialKind, ExpiryState};
pub use hospital::{Hospital, HospitalType};
pub use invoice::{Invoice, InvoiceStatus};
pub use note::{Note, NoteStatus, NoteType};
pub use patient::{Patient, PatientStatus};
pub use staff::{Staff, StaffStatus};
