//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Registered hospital
    Hosp,
    /// Patient record
    Pat,
    /// Staff directory member
    Stf,
    /// Staff credential (license, certification)
    Cred,
    /// Insurance claim
    Clm,
    /// Patient invoice
    Inv,
    /// Clinical note
    Note,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Hosp => "HOSP",
            EntityPrefix::Pat => "PAT",
            EntityPrefix::Stf => "STF",
            EntityPrefix::Cred => "CRED",
            EntityPrefix::Clm => "CLM",
            EntityPrefix::Inv => "INV",
            EntityPrefix::Note => "NOTE",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Hosp,
            EntityPrefix::Pat,
            EntityPrefix::Stf,
            EntityPrefix::Cred,
            EntityPrefix::Clm,
            EntityPrefix::Inv,
            EntityPrefix::Note,
        ]
    }

    /// Try to determine entity prefix from a filename
    /// Looks for patterns like "PAT-xxx.hsp.yaml" or "pat.schema.json"
    pub fn from_filename(filename: &str) -> Option<Self> {
        let upper = filename.to_uppercase();
        for prefix in Self::all() {
            let prefix_str = prefix.as_str();
            // Match "PAT-xxx" pattern at start
            if upper.starts_with(&format!("{}-", prefix_str)) {
                return Some(*prefix);
            }
            // Match "pat.schema.json" pattern
            if upper.starts_with(&format!("{}.", prefix_str)) {
                return Some(*prefix);
            }
        }
        None
    }

    /// Try to determine entity prefix from a file path by examining parent directories
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        // First try the filename
        if let Some(filename) = path.file_name() {
            if let Some(prefix) = Self::from_filename(&filename.to_string_lossy()) {
                return Some(prefix);
            }
        }

        // Then look at parent directories
        for component in path.components() {
            if let std::path::Component::Normal(os_str) = component {
                let dir_name = os_str.to_string_lossy().to_lowercase();
                match dir_name.as_str() {
                    "hospital" => return Some(EntityPrefix::Hosp),
                    "patients" => return Some(EntityPrefix::Pat),
                    "directory" => return Some(EntityPrefix::Stf),
                    "credentials" => return Some(EntityPrefix::Cred),
                    "claims" => return Some(EntityPrefix::Clm),
                    "invoices" => return Some(EntityPrefix::Inv),
                    "notes" => return Some(EntityPrefix::Note),
                    _ => {}
                }
            }
        }
        None
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HOSP" => Ok(EntityPrefix::Hosp),
            "PAT" => Ok(EntityPrefix::Pat),
            "STF" => Ok(EntityPrefix::Stf),
            "CRED" => Ok(EntityPrefix::Cred),
            "CLM" => Ok(EntityPrefix::Clm),
            "INV" => Ok(EntityPrefix::Inv),
            "NOTE" => Ok(EntityPrefix::Note),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Create an EntityId from a prefix and existing ULID
    pub fn from_parts(prefix: EntityPrefix, ulid: Ulid) -> Self {
        Self { prefix, ulid }
    }

    /// Get the entity prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: HOSP, PAT, STF, CRED, CLM, INV, NOTE)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Pat);
        assert!(id.to_string().starts_with("PAT-"));
        assert_eq!(id.to_string().len(), 30); // PAT- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_parsing() {
        // Generate a valid ID first, then parse it back
        let original = EntityId::new(EntityPrefix::Clm);
        let id_str = original.to_string();
        let parsed = EntityId::parse(&id_str).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Clm);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0VWXYZ01").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("PAT01HQ3K4N5M6P7R8S9T0VWXYZ01").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("PAT-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_prefix_from_path() {
        let path = std::path::Path::new("billing/claims/CLM-01HQ3K4N5M.hsp.yaml");
        assert_eq!(EntityPrefix::from_path(path), Some(EntityPrefix::Clm));

        let path = std::path::Path::new("staff/directory/somefile.hsp.yaml");
        assert_eq!(EntityPrefix::from_path(path), Some(EntityPrefix::Stf));
    }
}
