//! Registration steps and per-step form data

use std::collections::{BTreeMap, HashMap};

use crate::entities::hospital::HospitalType;

/// The three registration steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegStep {
    HospitalInfo,
    Address,
    AdminAccount,
}

impl RegStep {
    /// Number of steps in the flow
    pub const COUNT: usize = 3;

    /// All steps, in navigation order
    pub fn all() -> &'static [RegStep] {
        &[RegStep::HospitalInfo, RegStep::Address, RegStep::AdminAccount]
    }

    /// Zero-based position in the flow
    pub fn index(&self) -> usize {
        match self {
            RegStep::HospitalInfo => 0,
            RegStep::Address => 1,
            RegStep::AdminAccount => 2,
        }
    }

    /// The step after this one, if any
    pub fn next(&self) -> Option<RegStep> {
        match self {
            RegStep::HospitalInfo => Some(RegStep::Address),
            RegStep::Address => Some(RegStep::AdminAccount),
            RegStep::AdminAccount => None,
        }
    }

    /// The step before this one, if any
    pub fn prev(&self) -> Option<RegStep> {
        match self {
            RegStep::HospitalInfo => None,
            RegStep::Address => Some(RegStep::HospitalInfo),
            RegStep::AdminAccount => Some(RegStep::Address),
        }
    }

    /// Heading shown above the step's form
    pub fn title(&self) -> &'static str {
        match self {
            RegStep::HospitalInfo => "Hospital Information",
            RegStep::Address => "Address & Business",
            RegStep::AdminAccount => "Administrator Account",
        }
    }

    /// The step's field descriptors, in prompt order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            RegStep::HospitalInfo => HOSPITAL_INFO_FIELDS,
            RegStep::Address => ADDRESS_FIELDS,
            RegStep::AdminAccount => ADMIN_FIELDS,
        }
    }

    /// Find a field descriptor by name, across all steps
    pub fn field_named(name: &str) -> Option<&'static FieldSpec> {
        Self::all()
            .iter()
            .flat_map(|s| s.fields())
            .find(|f| f.name == name)
    }
}

impl std::fmt::Display for RegStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegStep::HospitalInfo => write!(f, "hospital-info"),
            RegStep::Address => write!(f, "address"),
            RegStep::AdminAccount => write!(f, "admin-account"),
        }
    }
}

/// How a field is prompted for and validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Phone,
    Email,
    Url,
    Password,
    /// Must equal the password field on the same step
    PasswordConfirm,
    /// One of a closed set of values
    Select(&'static [&'static str]),
}

/// A single form field descriptor
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

const HOSPITAL_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "hospital_name", label: "Hospital name", required: true, kind: FieldKind::Text },
    FieldSpec { name: "hospital_type", label: "Hospital type", required: true, kind: FieldKind::Select(HospitalType::NAMES) },
    FieldSpec { name: "hospital_email", label: "Hospital email", required: true, kind: FieldKind::Email },
    FieldSpec { name: "hospital_phone", label: "Hospital phone", required: true, kind: FieldKind::Phone },
    FieldSpec { name: "website", label: "Website", required: false, kind: FieldKind::Url },
];

const ADDRESS_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "address_line1", label: "Street address", required: true, kind: FieldKind::Text },
    FieldSpec { name: "city", label: "City", required: true, kind: FieldKind::Text },
    FieldSpec { name: "state", label: "State/Province", required: true, kind: FieldKind::Text },
    FieldSpec { name: "postal_code", label: "Postal code", required: true, kind: FieldKind::Text },
    FieldSpec { name: "country", label: "Country", required: true, kind: FieldKind::Text },
    FieldSpec { name: "license_number", label: "License number", required: true, kind: FieldKind::Text },
    FieldSpec { name: "tax_id", label: "Tax ID", required: false, kind: FieldKind::Text },
];

const ADMIN_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "admin_name", label: "Administrator name", required: true, kind: FieldKind::Text },
    FieldSpec { name: "admin_email", label: "Administrator email", required: true, kind: FieldKind::Email },
    FieldSpec { name: "admin_password", label: "Password", required: true, kind: FieldKind::Password },
    FieldSpec { name: "admin_confirm_password", label: "Confirm password", required: true, kind: FieldKind::PasswordConfirm },
];

/// Form data for one step: current field values plus the validator's
/// last error report.
///
/// A record starts empty, is mutated on every field edit, and is reset to
/// empty whenever navigation moves away from its step.
#[derive(Debug, Clone, Default)]
pub struct StepRecord {
    fields: HashMap<String, String>,
    errors: BTreeMap<String, String>,
}

impl StepRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// All current field values
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// The last validator report for this record
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Replace the validator report
    pub fn set_errors(&mut self, errors: BTreeMap<String, String>) {
        self.errors = errors;
    }

    /// True when no field holds a non-blank value
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }

    /// An immutable copy of the field values, without the error report
    pub fn snapshot(&self) -> StepRecord {
        StepRecord {
            fields: self.fields.clone(),
            errors: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_navigation_order() {
        assert_eq!(RegStep::HospitalInfo.next(), Some(RegStep::Address));
        assert_eq!(RegStep::Address.next(), Some(RegStep::AdminAccount));
        assert_eq!(RegStep::AdminAccount.next(), None);
        assert_eq!(RegStep::HospitalInfo.prev(), None);
        assert_eq!(RegStep::AdminAccount.prev(), Some(RegStep::Address));
    }

    #[test]
    fn test_field_lookup() {
        let field = RegStep::field_named("admin_confirm_password").unwrap();
        assert_eq!(field.kind, FieldKind::PasswordConfirm);
        assert!(RegStep::field_named("no_such_field").is_none());
    }

    #[test]
    fn test_record_starts_blank() {
        let mut record = StepRecord::new();
        assert!(record.is_blank());
        record.set("city", "  ");
        assert!(record.is_blank());
        record.set("city", "Springfield");
        assert!(!record.is_blank());
    }

    #[test]
    fn test_snapshot_drops_errors() {
        let mut record = StepRecord::new();
        record.set("city", "Springfield");
        record.set_errors([("city".to_string(), "bad".to_string())].into());
        let snap = record.snapshot();
        assert_eq!(snap.value("city"), Some("Springfield"));
        assert!(snap.errors().is_empty());
    }
}
