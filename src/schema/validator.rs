//! Schema validation with detailed error reporting

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::core::EntityPrefix;
use crate::schema::registry::SchemaRegistry;

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Schema validation failed: {summary}")]
#[diagnostic(code(hsp::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Check whether any violation message mentions the given text
    pub fn mentions(&self, text: &str) -> bool {
        self.violations.iter().any(|v| v.message.contains(text))
    }
}

/// Schema validator with compiled schemas
pub struct Validator {
    /// Compiled JSON schemas by entity prefix
    compiled: HashMap<EntityPrefix, JsonValidator>,
}

impl Validator {
    /// Create a new validator with schemas from the registry
    pub fn new(registry: &SchemaRegistry) -> Self {
        let mut compiled = HashMap::new();

        for prefix in EntityPrefix::all() {
            if let Some(schema_str) = registry.get(*prefix) {
                if let Ok(schema_json) = serde_json::from_str::<JsonValue>(schema_str) {
                    if let Ok(compiled_schema) = validator_for(&schema_json) {
                        compiled.insert(*prefix, compiled_schema);
                    }
                }
            }
        }

        Self { compiled }
    }

    /// Validate YAML content against the schema for the given entity type,
    /// collecting every violation.
    pub fn validate(
        &self,
        content: &str,
        filename: &str,
        prefix: EntityPrefix,
    ) -> Result<(), ValidationError> {
        // First parse YAML to a value
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.location());
                let violation = SchemaViolation::new(
                    format!("YAML parse error: {}", e),
                    "invalid YAML".to_string(),
                    span,
                    Some("Check YAML syntax - proper indentation, colons, quotes".to_string()),
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        // Convert YAML value to JSON value for schema validation
        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = SchemaViolation::new(
                    format!("Failed to convert YAML to JSON: {}", e),
                    "conversion error".to_string(),
                    (0, content.len()).into(),
                    None,
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        // No schema available - validation passes (schema optional)
        let Some(schema) = self.compiled.get(&prefix) else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }

    /// Validate a file directly, determining the entity type from its path
    pub fn validate_file(&self, path: &std::path::Path) -> Result<(), FileValidationError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| FileValidationError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path.file_name().unwrap_or_default().to_string_lossy();

        let prefix =
            EntityPrefix::from_filename(&filename).or_else(|| EntityPrefix::from_path(path));

        match prefix {
            Some(p) => Ok(self.validate(&content, &filename, p)?),
            None => Ok(()), // Unknown entity type - skip
        }
    }
}

/// Errors from validating a file on disk
#[derive(Debug, Error, Diagnostic)]
pub enum FileValidationError {
    #[error("failed to read {path}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] ValidationError),
}

impl Default for Validator {
    fn default() -> Self {
        let registry = SchemaRegistry::default();
        Self::new(&registry)
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);

    // Try to find the span in the YAML where this error occurred
    let span = find_path_span(content, &path);

    SchemaViolation::new(message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            let opts = format_enum_options(options);
            format!("Invalid value at {}: must be one of: {}", path, opts)
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            format!("Value at {} doesn't match pattern: {}", path, pattern)
        }
        jsonschema::error::ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        jsonschema::error::ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => {
            format!("Validation error at {}: {}", path, error)
        }
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| v.to_string())
            })
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { .. } => {
            "required field missing".to_string()
        }
        jsonschema::error::ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        jsonschema::error::ValidationErrorKind::Enum { .. } => "invalid value".to_string(),
        jsonschema::error::ValidationErrorKind::Pattern { .. } => "pattern mismatch".to_string(),
        jsonschema::error::ValidationErrorKind::MinLength { .. } => "too short".to_string(),
        jsonschema::error::ValidationErrorKind::AdditionalProperties { .. } => {
            "unknown field".to_string()
        }
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        jsonschema::error::ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field to your file", prop_str))
        }
        jsonschema::error::ValidationErrorKind::Enum { options } => {
            let opts = format_enum_options(options);
            Some(format!("Valid values: {}", opts))
        }
        jsonschema::error::ValidationErrorKind::Pattern { pattern } => {
            // ID patterns all share the PREFIX-ULID shape
            if pattern.contains("{26}") {
                Some(
                    "ID format: PREFIX-[26 alphanumeric characters], e.g., PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD"
                        .to_string(),
                )
            } else {
                None
            }
        }
        jsonschema::error::ValidationErrorKind::Type { kind } => {
            Some(format!("Expected value of type: {:?}", kind))
        }
        jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Find the span (byte offset, length) for an error location
fn find_error_span(content: &str, location: Option<serde_yml::Location>) -> SourceSpan {
    if let Some(loc) = location {
        let line = loc.line().saturating_sub(1);
        let column = loc.column().saturating_sub(1);

        // Calculate byte offset
        let mut offset = 0;
        for (i, line_content) in content.lines().enumerate() {
            if i == line {
                offset += column;
                break;
            }
            offset += line_content.len() + 1; // +1 for newline
        }

        // Find a reasonable span length (rest of line or some characters)
        let rest_of_content = &content[offset.min(content.len())..];
        let len = rest_of_content
            .find('\n')
            .unwrap_or(rest_of_content.len())
            .max(1);

        (offset, len).into()
    } else {
        // No location - highlight first line
        let len = content.find('\n').unwrap_or(content.len()).max(1);
        (0, len).into()
    }
}

/// Find the span for a JSON path in YAML content
fn find_path_span(content: &str, json_path: &str) -> SourceSpan {
    // Parse the path (e.g., "/status" or "/line_items/0/quantity")
    let parts: Vec<&str> = json_path.split('/').filter(|s| !s.is_empty()).collect();

    if parts.is_empty() {
        // Root path - highlight first line
        let len = content.find('\n').unwrap_or(content.len()).max(1);
        return (0, len).into();
    }

    // Look for the last path component in the YAML
    let search_key = parts.last().unwrap_or(&"");

    // Handle array indices
    if search_key.parse::<usize>().is_ok() {
        // It's an array index - search for parent key
        if parts.len() >= 2 {
            let parent_key = parts[parts.len() - 2];
            if let Some(span) = find_key_span(content, parent_key) {
                return span;
            }
        }
    }

    // Search for the key in the YAML
    if let Some(span) = find_key_span(content, search_key) {
        return span;
    }

    // Fallback - highlight first line
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Find the span of a key in YAML content
fn find_key_span(content: &str, key: &str) -> Option<SourceSpan> {
    // Simple search for "key:" at the start of a line (with optional leading whitespace)
    let search_pattern = format!("{}:", key);

    let mut offset = 0;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&search_pattern) {
            // Found it - calculate the offset within the line
            let key_start = offset + (line.len() - trimmed.len());
            let key_len = line.len() - (line.len() - trimmed.len());
            return Some((key_start, key_len).into());
        }
        offset += line.len() + 1; // +1 for newline
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_creation() {
        let registry = SchemaRegistry::default();
        let validator = Validator::new(&registry);
        assert!(validator.compiled.contains_key(&EntityPrefix::Pat));
        assert!(validator.compiled.contains_key(&EntityPrefix::Clm));
    }

    #[test]
    fn test_valid_patient() {
        let validator = Validator::default();

        let yaml = r#"
id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD
mrn: "MRN-1001"
first_name: "Ada"
last_name: "Nguyen"
date_of_birth: "1984-05-12"
status: outpatient
created: 2024-01-01T00:00:00Z
author: Test
revision: 1
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_ok(), "Valid patient should pass: {:?}", result);
    }

    #[test]
    fn test_patient_missing_required_fields() {
        let validator = Validator::default();

        let yaml = r#"
id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD
mrn: "MRN-1001"
# missing: first_name, last_name, date_of_birth, status, created, author
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_err(), "Missing required fields should fail");
        let err = result.unwrap_err();
        assert!(err.violation_count() > 0);
        assert!(err.mentions("first_name"));
    }

    #[test]
    fn test_patient_invalid_status() {
        let validator = Validator::default();

        let yaml = r#"
id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD
mrn: "MRN-1001"
first_name: "Ada"
last_name: "Nguyen"
date_of_birth: "1984-05-12"
status: inpatient
created: 2024-01-01T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_err(), "Invalid enum value should fail");
        assert!(result.unwrap_err().mentions("status"));
    }

    #[test]
    fn test_patient_invalid_id_pattern() {
        let validator = Validator::default();

        let yaml = r#"
id: PAT-invalid
mrn: "MRN-1001"
first_name: "Ada"
last_name: "Nguyen"
date_of_birth: "1984-05-12"
status: outpatient
created: 2024-01-01T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_err(), "Invalid ID pattern should fail");
    }

    #[test]
    fn test_patient_unknown_field() {
        let validator = Validator::default();

        let yaml = r#"
id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTD
mrn: "MRN-1001"
first_name: "Ada"
last_name: "Nguyen"
date_of_birth: "1984-05-12"
status: outpatient
created: 2024-01-01T00:00:00Z
author: Test
favorite_color: "blue"
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_err(), "Unknown field should fail");
    }

    #[test]
    fn test_valid_claim_with_events() {
        let validator = Validator::default();

        let yaml = r#"
id: CLM-01HC2JB7SMQX7RS1Y0GFKBHPTD
patient_id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTE
payer: "Blue Harbor Mutual"
policy_number: "POL-7"
amount: 1250.0
service_date: "2025-03-04"
status: in-review
events:
  - status: submitted
    by: "bee"
    at: 2025-03-05T09:00:00Z
  - status: in-review
    by: "bee"
    at: 2025-03-06T09:00:00Z
created: 2025-03-04T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Clm);
        assert!(result.is_ok(), "Valid claim should pass: {:?}", result);
    }

    #[test]
    fn test_claim_negative_amount_fails() {
        let validator = Validator::default();

        let yaml = r#"
id: CLM-01HC2JB7SMQX7RS1Y0GFKBHPTD
patient_id: PAT-01HC2JB7SMQX7RS1Y0GFKBHPTE
payer: "Blue Harbor Mutual"
amount: -10.0
service_date: "2025-03-04"
status: draft
created: 2025-03-04T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Clm);
        assert!(result.is_err(), "Negative amount should fail");
    }

    #[test]
    fn test_invalid_yaml_reports_parse_error() {
        let validator = Validator::default();
        let yaml = "id: [unclosed";
        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Pat);
        assert!(result.is_err());
        assert!(result.unwrap_err().mentions("YAML parse error"));
    }

    #[test]
    fn test_valid_credential() {
        let validator = Validator::default();

        let yaml = r#"
id: CRED-01HC2JB7SMQX7RS1Y0GFKBHPTD
staff_id: STF-01HC2JB7SMQX7RS1Y0GFKBHPTE
kind: license
name: "State Medical License"
issued: "2020-01-01"
expires: "2030-01-01"
created: 2024-01-01T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Cred);
        assert!(result.is_ok(), "Valid credential should pass: {:?}", result);
    }

    #[test]
    fn test_credential_rejects_stored_status() {
        let validator = Validator::default();

        // Credential state is derived; a stored status field is unknown
        let yaml = r#"
id: CRED-01HC2JB7SMQX7RS1Y0GFKBHPTD
staff_id: STF-01HC2JB7SMQX7RS1Y0GFKBHPTE
kind: license
name: "State Medical License"
issued: "2020-01-01"
expires: "2030-01-01"
status: valid
created: 2024-01-01T00:00:00Z
author: Test
"#;

        let result = validator.validate(yaml, "test.hsp.yaml", EntityPrefix::Cred);
        assert!(result.is_err(), "Stored credential status should fail");
    }

    #[test]
    fn test_find_key_span() {
        let content = "id: PAT-123\nmrn: \"X\"\nstatus: draft\n";
        let span = find_key_span(content, "status");
        assert!(span.is_some());
        let span = span.unwrap();
        let offset: usize = span.offset();
        assert!(offset > 0);
    }
}
