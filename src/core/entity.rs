//! Entity trait - common interface for all record types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::EntityId;

/// Common trait for all portal entities
pub trait Entity: Serialize + DeserializeOwned {
    /// The entity type prefix (e.g., "PAT", "CLM")
    const PREFIX: &'static str;

    /// Get the entity's unique ID
    fn id(&self) -> &EntityId;

    /// Get the entity's display title
    fn title(&self) -> &str;

    /// Get the entity's status label
    fn status(&self) -> &'static str;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;

    /// Get the author
    fn author(&self) -> &str;
}
