//! Catalog product presets.
//!
//! A product seed is an ordinary [`SeedSpec`]; this module only knows which
//! attribute codes and stored codes a catalog product expects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgeseed_core::DomainError;

use crate::inventory::InventorySpec;
use crate::seed::SeedSpec;

/// Well-known attribute codes.
pub mod codes {
    pub const NAME: &str = "name";
    pub const URL_KEY: &str = "url_key";
    pub const PRICE: &str = "price";
    pub const TYPE_ID: &str = "type_id";
    pub const VISIBILITY: &str = "visibility";
    pub const STATUS: &str = "status";
    pub const ATTRIBUTE_SET: &str = "attribute_set";
}

/// Product type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Simple,
}

impl ProductType {
    pub fn code(self) -> &'static str {
        match self {
            ProductType::Simple => "simple",
        }
    }
}

/// Where a product is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    NotVisible,
    Catalog,
    Search,
    Both,
}

impl Visibility {
    /// Stored integer code (1 = not visible individually, 4 = catalog and search).
    pub fn code(self) -> i64 {
        match self {
            Visibility::NotVisible => 1,
            Visibility::Catalog => 2,
            Visibility::Search => 3,
            Visibility::Both => 4,
        }
    }
}

/// Product status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Enabled,
    Disabled,
}

impl ProductStatus {
    pub fn code(self) -> i64 {
        match self {
            ProductStatus::Enabled => 1,
            ProductStatus::Disabled => 2,
        }
    }
}

/// Declarative simple-product seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleProductSeed {
    pub sku: String,
    pub name: String,
    pub url_key: String,
    pub price: Decimal,
    pub attribute_set: String,
    pub inventory: InventorySpec,
    pub categories: Vec<String>,
}

impl SimpleProductSeed {
    /// The reference seed: SKU 2002, 150 units at `default`, linked to `Men`.
    pub fn example() -> Self {
        Self {
            sku: "2002".to_string(),
            name: "Simple Product Example".to_string(),
            url_key: "refactored-product".to_string(),
            price: Decimal::new(9999, 2),
            attribute_set: "Default".to_string(),
            inventory: InventorySpec::in_stock("default", 150),
            categories: vec!["Men".to_string()],
        }
    }

    /// Enabled, simple, visible in catalog and search.
    pub fn into_spec(self) -> Result<SeedSpec, DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.price.is_sign_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }

        SeedSpec::builder(self.sku)
            .attribute(codes::TYPE_ID, ProductType::Simple.code())
            .attribute(codes::ATTRIBUTE_SET, self.attribute_set)
            .attribute(codes::NAME, self.name)
            .attribute(codes::URL_KEY, self.url_key)
            .attribute(codes::PRICE, self.price)
            .attribute(codes::VISIBILITY, Visibility::Both.code())
            .attribute(codes::STATUS, ProductStatus::Enabled.code())
            .inventory(self.inventory)
            .categories(self.categories)
            .build()
    }
}
