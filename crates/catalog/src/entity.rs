//! Catalog entity records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgeseed_core::EntityId;

use crate::attribute::Attributes;

/// An entity ready to be created; it has no identifier until a store persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntity {
    pub key: String,
    pub attributes: Attributes,
}

/// A persisted catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    key: String,
    attributes: Attributes,
    created_at: DateTime<Utc>,
}

impl Entity {
    /// Materialize a new entity under a store-assigned identifier.
    pub fn persisted(id: EntityId, entity: NewEntity, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            key: entity.key,
            attributes: entity.attributes,
            created_at,
        }
    }

    pub fn id_typed(&self) -> EntityId {
        self.id
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl forgeseed_core::Entity for Entity {
    type Id = EntityId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn natural_key(&self) -> &str {
        &self.key
    }
}
