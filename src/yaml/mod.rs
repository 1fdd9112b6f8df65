//! YAML loading with diagnostics

pub mod diagnostics;

pub use diagnostics::{YamlError, YamlSyntaxError};

use serde::de::DeserializeOwned;
use std::path::Path;

/// Parse a YAML file into a typed entity, mapping syntax errors to
/// span-carrying diagnostics.
pub fn parse_yaml_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    parse_yaml_str(&content, &filename)
}

/// Parse YAML content into a typed entity
pub fn parse_yaml_str<T: DeserializeOwned + 'static>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content)
        .map_err(|e| YamlSyntaxError::from_serde_error(&e, content, filename).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::patient::Patient;

    #[test]
    fn test_parse_valid_patient() {
        let yaml = r#"
id: PAT-01HQ3K4N5M6P7R8S9T0VWXYZ01
mrn: MRN-1001
first_name: Ada
last_name: Nguyen
date_of_birth: 1984-05-12
status: outpatient
created: 2024-01-01T00:00:00Z
author: Test
"#;
        let patient: Patient = parse_yaml_str(yaml, "test.hsp.yaml").unwrap();
        assert_eq!(patient.mrn, "MRN-1001");
    }

    #[test]
    fn test_parse_invalid_yaml_reports_syntax_error() {
        let yaml = "mrn: [unclosed";
        let err = parse_yaml_str::<Patient>(yaml, "test.hsp.yaml").unwrap_err();
        assert!(matches!(err, YamlError::Syntax(_)));
    }
}
