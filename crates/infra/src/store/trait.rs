use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use forgeseed_catalog::{Entity, InventorySpec, NewEntity};
use forgeseed_core::CategoryId;

use crate::context::ExecutionContext;

/// Category name → resolved identifier (`None` when no category has that name).
pub type Resolution = BTreeMap<String, Option<CategoryId>>;

/// The existence check could not be answered. Fatal: nothing has been written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("entity store unavailable: {0}")]
    Unavailable(String),

    #[error("existence check timed out after {0:?}")]
    Timeout(Duration),
}

/// The store refused to create the entity. Fatal: nothing was created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CreationError {
    #[error("entity rejected by validation: {0}")]
    Validation(String),

    /// Another writer created the same key first.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("entity store rejected the write: {0}")]
    Rejected(String),

    #[error("entity creation timed out after {0:?}")]
    Timeout(Duration),
}

/// Setting a stock level failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("unknown inventory source '{0}'")]
    UnknownSource(String),

    #[error("inventory store unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Resolving or assigning categories failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),

    #[error("category store unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Store of base entities, keyed by natural key within a scope.
///
/// Implementations must make `create` atomic with respect to key uniqueness:
/// of two concurrent creates for the same key, at most one succeeds and the
/// other fails with [`CreationError::DuplicateKey`].
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, LookupError>;

    async fn create(&self, ctx: &ExecutionContext, entity: NewEntity) -> Result<Entity, CreationError>;
}

/// Per-source stock levels.
///
/// `set_level` overwrites: repeating a call converges to the same quantity.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn set_level(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        inventory: &InventorySpec,
    ) -> Result<(), InventoryError>;
}

/// Category lookup and entity → category links.
#[async_trait]
pub trait CategoryLinker: Send + Sync {
    /// Resolve every name; the result has one entry per distinct input name.
    async fn resolve(&self, ctx: &ExecutionContext, names: &[String]) -> Result<Resolution, LinkError>;

    /// Link `key` to `category_ids`. Re-assigning the same set is a no-op.
    async fn assign(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        category_ids: &BTreeSet<CategoryId>,
    ) -> Result<(), LinkError>;
}

#[async_trait]
impl<S> EntityStore for Arc<S>
where
    S: EntityStore + ?Sized,
{
    async fn find(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, LookupError> {
        (**self).find(ctx, key).await
    }

    async fn create(&self, ctx: &ExecutionContext, entity: NewEntity) -> Result<Entity, CreationError> {
        (**self).create(ctx, entity).await
    }
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn set_level(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        inventory: &InventorySpec,
    ) -> Result<(), InventoryError> {
        (**self).set_level(ctx, key, inventory).await
    }
}

#[async_trait]
impl<S> CategoryLinker for Arc<S>
where
    S: CategoryLinker + ?Sized,
{
    async fn resolve(&self, ctx: &ExecutionContext, names: &[String]) -> Result<Resolution, LinkError> {
        (**self).resolve(ctx, names).await
    }

    async fn assign(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        category_ids: &BTreeSet<CategoryId>,
    ) -> Result<(), LinkError> {
        (**self).assign(ctx, key, category_ids).await
    }
}
