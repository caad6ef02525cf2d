//! Seed specification: the declared desired state of one entity.

use serde::Serialize;

use forgeseed_core::{DomainError, DomainResult};

use crate::attribute::{AttributeValue, Attributes};
use crate::entity::NewEntity;
use crate::inventory::InventorySpec;

/// Immutable description of one entity with its dependents.
///
/// Only constructible through [`SeedSpecBuilder::build`], so a `SeedSpec` in
/// hand is always valid: non-empty key, non-negative quantity, no duplicate
/// category names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSpec {
    key: String,
    attributes: Attributes,
    category_names: Vec<String>,
    inventory: InventorySpec,
}

impl SeedSpec {
    pub fn builder(key: impl Into<String>) -> SeedSpecBuilder {
        SeedSpecBuilder::new(key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, code: &str) -> Option<&AttributeValue> {
        self.attributes.get(code)
    }

    /// Category labels in declaration order.
    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn inventory(&self) -> &InventorySpec {
        &self.inventory
    }

    /// The entity to hand to the store when the key does not exist yet.
    pub fn to_new_entity(&self) -> NewEntity {
        NewEntity {
            key: self.key.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// Builder for [`SeedSpec`].
#[derive(Debug, Clone)]
pub struct SeedSpecBuilder {
    key: String,
    attributes: Attributes,
    category_names: Vec<String>,
    inventory: Option<InventorySpec>,
}

impl SeedSpecBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attributes: Attributes::new(),
            category_names: Vec::new(),
            inventory: None,
        }
    }

    /// Set an attribute. A later call for the same code replaces the value.
    pub fn attribute(mut self, code: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(code.into(), value.into());
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category_names.push(name.into());
        self
    }

    pub fn categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn inventory(mut self, inventory: InventorySpec) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Validate and freeze the spec.
    ///
    /// Category names are trimmed; blank names are rejected and repeated names
    /// collapse onto their first occurrence.
    pub fn build(self) -> DomainResult<SeedSpec> {
        let key = self.key.trim().to_string();
        if key.is_empty() {
            return Err(DomainError::validation("key cannot be empty"));
        }

        let inventory = self
            .inventory
            .ok_or_else(|| DomainError::validation("inventory is required"))?;
        inventory.validate()?;

        if let Some(code) = self.attributes.keys().find(|c| c.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "attribute code cannot be empty (got {code:?})"
            )));
        }

        let mut category_names: Vec<String> = Vec::with_capacity(self.category_names.len());
        for name in self.category_names {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("category name cannot be empty"));
            }
            if !category_names.iter().any(|n| n == name) {
                category_names.push(name.to_string());
            }
        }

        Ok(SeedSpec {
            key,
            attributes: self.attributes,
            category_names,
            inventory,
        })
    }
}
