//! Catalog seed data model.
//!
//! Describes the desired state of a catalog entity (attributes, stock, category
//! links) as immutable values. Nothing here talks to a store; applying a seed
//! is the job of `forgeseed-infra`.

pub mod attribute;
pub mod entity;
pub mod inventory;
pub mod product;
pub mod seed;

pub use attribute::{AttributeValue, Attributes};
pub use entity::{Entity, NewEntity};
pub use inventory::{InventorySpec, StockStatus};
pub use product::{ProductStatus, ProductType, SimpleProductSeed, Visibility};
pub use seed::{SeedSpec, SeedSpecBuilder};
