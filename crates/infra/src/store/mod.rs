//! Collaborator boundaries the seed applier writes through.
//!
//! The applier owns none of these stores. Each trait describes only what
//! reconciliation needs from the system behind it; the in-memory
//! implementations are for tests, development and the bundled CLI.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryCategoryLinker, InMemoryEntityStore, InMemoryInventoryStore};
pub use r#trait::{
    CategoryLinker, CreationError, EntityStore, InventoryError, InventoryStore, LinkError,
    LookupError, Resolution,
};
