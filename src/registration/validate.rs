//! Per-step field validation for the registration flow
//!
//! Pure functions over a step's field values. Re-run on every field edit and
//! once more before any forward-navigation decision.

use std::collections::{BTreeMap, HashMap};

use crate::registration::record::{FieldKind, RegStep};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validate one step's fields, returning a message per violating field.
///
/// An empty map means the step has no validation errors. Optional fields are
/// only format-checked when non-blank.
pub fn validate_step(
    step: RegStep,
    fields: &HashMap<String, String>,
) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    for spec in step.fields() {
        let raw = fields.get(spec.name).map(|s| s.as_str()).unwrap_or("");
        let value = raw.trim();

        if value.is_empty() {
            if spec.required {
                errors.insert(spec.name.to_string(), format!("{} is required", spec.label));
            }
            continue;
        }

        let message = match spec.kind {
            FieldKind::Text | FieldKind::Phone => None,
            FieldKind::Email => {
                (!is_valid_email(value)).then(|| format!("{} is not a valid email address", spec.label))
            }
            FieldKind::Url => {
                (!is_valid_url(value)).then(|| format!("{} must be an http(s) URL", spec.label))
            }
            FieldKind::Password => password_issue(value),
            FieldKind::PasswordConfirm => {
                let password = fields
                    .get("admin_password")
                    .map(|s| s.trim())
                    .unwrap_or("");
                (value != password).then(|| "Passwords do not match".to_string())
            }
            FieldKind::Select(options) => (!options.contains(&value))
                .then(|| format!("{} must be one of: {}", spec.label, options.join(", "))),
        };

        if let Some(message) = message {
            errors.insert(spec.name.to_string(), message);
        }
    }

    errors
}

/// Minimal email shape check: one '@', non-empty local part, and a domain
/// containing a dot, with no whitespace anywhere.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// URLs are accepted when they carry an http(s) scheme and a non-empty host
pub fn is_valid_url(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

/// Check password composition, returning a message describing what is missing
pub fn password_issue(value: &str) -> Option<String> {
    let mut missing = Vec::new();

    if value.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {} characters", MIN_PASSWORD_LEN));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("an uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("a lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit".to_string());
    }
    if !value.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        missing.push("a symbol".to_string());
    }

    if missing.is_empty() {
        None
    } else {
        Some(format!("Password needs {}", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_blank_required_fields_are_flagged() {
        let errors = validate_step(RegStep::HospitalInfo, &fields(&[]));
        assert!(errors.contains_key("hospital_name"));
        assert!(errors.contains_key("hospital_type"));
        assert!(errors.contains_key("hospital_email"));
        assert!(errors.contains_key("hospital_phone"));
        // Optional field stays silent
        assert!(!errors.contains_key("website"));
    }

    #[test]
    fn test_whitespace_only_counts_as_blank() {
        let errors = validate_step(
            RegStep::Address,
            &fields(&[("city", "   "), ("state", "\t")]),
        );
        assert!(errors.contains_key("city"));
        assert!(errors.contains_key("state"));
    }

    #[test]
    fn test_valid_hospital_info_passes() {
        let errors = validate_step(
            RegStep::HospitalInfo,
            &fields(&[
                ("hospital_name", "Acme Clinic"),
                ("hospital_type", "clinic"),
                ("hospital_email", "a@b.com"),
                ("hospital_phone", "555-0100"),
            ]),
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("front.desk@acme-clinic.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn test_url_shapes() {
        assert!(is_valid_url("https://acme.example"));
        assert!(is_valid_url("http://acme.example/portal"));
        assert!(!is_valid_url("acme.example"));
        assert!(!is_valid_url("ftp://acme.example"));
        assert!(!is_valid_url("https://"));
    }

    #[test]
    fn test_optional_website_checked_only_when_present() {
        let mut f = fields(&[
            ("hospital_name", "Acme Clinic"),
            ("hospital_type", "clinic"),
            ("hospital_email", "a@b.com"),
            ("hospital_phone", "555-0100"),
        ]);
        f.insert("website".to_string(), "nonsense".to_string());
        let errors = validate_step(RegStep::HospitalInfo, &f);
        assert!(errors.contains_key("website"));
    }

    #[test]
    fn test_unknown_select_value_is_rejected() {
        let errors = validate_step(
            RegStep::HospitalInfo,
            &fields(&[("hospital_type", "hospice")]),
        );
        assert!(errors
            .get("hospital_type")
            .is_some_and(|m| m.contains("one of")));
    }

    #[test]
    fn test_password_composition() {
        assert!(password_issue("Abcd123!").is_none());
        assert!(password_issue("short1!A").is_none());

        let msg = password_issue("abcdefgh").unwrap();
        assert!(msg.contains("uppercase"));
        assert!(msg.contains("digit"));
        assert!(msg.contains("symbol"));

        assert!(password_issue("Abc1!").unwrap().contains("characters"));
        assert!(password_issue("ABCD123!").unwrap().contains("lowercase"));
    }

    #[test]
    fn test_password_mismatch_flags_confirm_field() {
        let errors = validate_step(
            RegStep::AdminAccount,
            &fields(&[
                ("admin_name", "Pat Admin"),
                ("admin_email", "pat@acme.org"),
                ("admin_password", "Abcd123!"),
                ("admin_confirm_password", "Different1!"),
            ]),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("admin_confirm_password").map(String::as_str),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn test_matching_passwords_pass() {
        let errors = validate_step(
            RegStep::AdminAccount,
            &fields(&[
                ("admin_name", "Pat Admin"),
                ("admin_email", "pat@acme.org"),
                ("admin_password", "Abcd123!"),
                ("admin_confirm_password", "Abcd123!"),
            ]),
        );
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }
}
