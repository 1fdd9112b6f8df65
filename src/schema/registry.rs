//! Embedded JSON Schema registry, one schema per entity type

use rust_embed::Embed;
use std::collections::HashMap;

use crate::core::identity::EntityPrefix;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// Registry of JSON Schemas keyed by entity prefix
pub struct SchemaRegistry {
    schemas: HashMap<EntityPrefix, String>,
}

impl SchemaRegistry {
    /// Load all embedded schemas
    pub fn new() -> Self {
        let mut schemas = HashMap::new();
        for prefix in EntityPrefix::all() {
            let filename = format!("{}.schema.json", prefix.as_str().to_lowercase());
            if let Some(embedded) = EmbeddedSchemas::get(&filename) {
                if let Ok(text) = std::str::from_utf8(&embedded.data) {
                    schemas.insert(*prefix, text.to_string());
                }
            }
        }
        Self { schemas }
    }

    /// Get the schema source for an entity type
    pub fn get(&self, prefix: EntityPrefix) -> Option<&str> {
        self.schemas.get(&prefix).map(|s| s.as_str())
    }

    /// Check whether a schema exists for an entity type
    pub fn has_schema(&self, prefix: EntityPrefix) -> bool {
        self.schemas.contains_key(&prefix)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_type_has_a_schema() {
        let registry = SchemaRegistry::default();
        for prefix in EntityPrefix::all() {
            assert!(
                registry.has_schema(*prefix),
                "missing schema for {}",
                prefix
            );
        }
    }

    #[test]
    fn test_schemas_are_valid_json() {
        let registry = SchemaRegistry::default();
        for prefix in EntityPrefix::all() {
            let schema = registry.get(*prefix).unwrap();
            let parsed: serde_json::Value = serde_json::from_str(schema).unwrap();
            assert!(parsed.get("properties").is_some());
        }
    }
}
