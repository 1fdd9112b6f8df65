//! The aggregated registration payload handed to the gateway
//!
//! Derived at submission time only: the three step snapshots are merged,
//! the password-confirmation field is dropped, and the portal's default
//! timezone is attached.

use serde::Serialize;
use std::collections::HashMap;

/// Everything the gateway needs to register a hospital.
///
/// The confirmation field never appears here; it exists only to gate the
/// final step's validation.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPayload {
    pub hospital_name: String,
    pub hospital_type: String,
    pub hospital_email: String,
    pub hospital_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub license_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    pub admin_name: String,
    pub admin_email: String,
    pub admin_password: String,

    pub timezone: String,
}

impl RegistrationPayload {
    /// Merge the three step snapshots into a payload
    pub fn assemble(
        info: &HashMap<String, String>,
        address: &HashMap<String, String>,
        admin: &HashMap<String, String>,
        timezone: &str,
    ) -> Self {
        Self {
            hospital_name: required(info, "hospital_name"),
            hospital_type: required(info, "hospital_type"),
            hospital_email: required(info, "hospital_email"),
            hospital_phone: required(info, "hospital_phone"),
            website: optional(info, "website"),
            address_line1: required(address, "address_line1"),
            city: required(address, "city"),
            state: required(address, "state"),
            postal_code: required(address, "postal_code"),
            country: required(address, "country"),
            license_number: required(address, "license_number"),
            tax_id: optional(address, "tax_id"),
            admin_name: required(admin, "admin_name"),
            admin_email: required(admin, "admin_email"),
            admin_password: required(admin, "admin_password"),
            timezone: timezone.to_string(),
        }
    }
}

fn required(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn optional(fields: &HashMap<String, String>, name: &str) -> Option<String> {
    fields
        .get(name)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_confirmation_field_is_never_carried() {
        let admin = map(&[
            ("admin_name", "Pat"),
            ("admin_email", "pat@acme.org"),
            ("admin_password", "Abcd123!"),
            ("admin_confirm_password", "Abcd123!"),
        ]);
        let payload = RegistrationPayload::assemble(&map(&[]), &map(&[]), &admin, "UTC");
        let json = serde_json::to_value(&payload).unwrap();

        assert!(json.get("admin_confirm_password").is_none());
        assert_eq!(json["admin_password"], "Abcd123!");
        assert_eq!(json["timezone"], "UTC");
    }

    #[test]
    fn test_blank_optionals_are_dropped() {
        let info = map(&[("hospital_name", "Acme Clinic"), ("website", "  ")]);
        let payload = RegistrationPayload::assemble(&info, &map(&[]), &map(&[]), "UTC");
        assert!(payload.website.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("website").is_none());
    }

    #[test]
    fn test_values_are_trimmed() {
        let info = map(&[("hospital_name", "  Acme Clinic  ")]);
        let payload = RegistrationPayload::assemble(&info, &map(&[]), &map(&[]), "UTC");
        assert_eq!(payload.hospital_name, "Acme Clinic");
    }
}
