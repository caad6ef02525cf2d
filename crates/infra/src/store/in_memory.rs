use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use forgeseed_catalog::{Entity, InventorySpec, NewEntity};
use forgeseed_core::{CategoryId, Entity as _, EntityId, TenantId};

use super::r#trait::{
    CategoryLinker, CreationError, EntityStore, InventoryError, InventoryStore, LinkError,
    LookupError, Resolution,
};
use crate::context::ExecutionContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScopedKey {
    scope: TenantId,
    key: String,
}

impl ScopedKey {
    fn new(ctx: &ExecutionContext, key: &str) -> Self {
        Self {
            scope: ctx.scope(),
            key: key.to_string(),
        }
    }
}

/// In-memory entity store.
///
/// Intended for tests/dev. Key uniqueness is enforced under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    entities: RwLock<HashMap<ScopedKey, Entity>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities across all scopes.
    pub fn len(&self) -> usize {
        self.entities.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn find(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, LookupError> {
        let entities = self
            .entities
            .read()
            .map_err(|_| LookupError::Unavailable("lock poisoned".to_string()))?;

        Ok(entities.get(&ScopedKey::new(ctx, key)).cloned())
    }

    async fn create(&self, ctx: &ExecutionContext, entity: NewEntity) -> Result<Entity, CreationError> {
        if entity.key.trim().is_empty() {
            return Err(CreationError::Validation("key cannot be empty".to_string()));
        }

        let mut entities = self
            .entities
            .write()
            .map_err(|_| CreationError::Rejected("lock poisoned".to_string()))?;

        if entities.contains_key(&ScopedKey::new(ctx, &entity.key)) {
            return Err(CreationError::DuplicateKey(entity.key));
        }

        let created = Entity::persisted(EntityId::new(), entity, Utc::now());
        entities.insert(ScopedKey::new(ctx, created.natural_key()), created.clone());
        Ok(created)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LevelKey {
    scope: TenantId,
    key: String,
    source_code: String,
}

/// In-memory per-source stock levels.
///
/// Only registered sources accept levels.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    sources: RwLock<HashSet<String>>,
    levels: RwLock<HashMap<LevelKey, InventorySpec>>,
}

impl InMemoryInventoryStore {
    pub const DEFAULT_SOURCE: &'static str = "default";

    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the `default` source registered.
    pub fn with_default_source() -> Self {
        Self {
            sources: RwLock::new(HashSet::from([Self::DEFAULT_SOURCE.to_string()])),
            levels: RwLock::default(),
        }
    }

    pub fn add_source(&self, source_code: impl Into<String>) -> Result<(), InventoryError> {
        self.sources
            .write()
            .map_err(|_| InventoryError::Unavailable("lock poisoned".to_string()))?
            .insert(source_code.into());
        Ok(())
    }

    /// Current level of `key` at `source_code` within `scope`.
    pub fn level(&self, scope: TenantId, key: &str, source_code: &str) -> Option<InventorySpec> {
        let levels = self.levels.read().ok()?;
        levels
            .get(&LevelKey {
                scope,
                key: key.to_string(),
                source_code: source_code.to_string(),
            })
            .cloned()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn set_level(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        inventory: &InventorySpec,
    ) -> Result<(), InventoryError> {
        {
            let sources = self
                .sources
                .read()
                .map_err(|_| InventoryError::Unavailable("lock poisoned".to_string()))?;
            if !sources.contains(&inventory.source_code) {
                return Err(InventoryError::UnknownSource(inventory.source_code.clone()));
            }
        }

        let mut levels = self
            .levels
            .write()
            .map_err(|_| InventoryError::Unavailable("lock poisoned".to_string()))?;

        levels.insert(
            LevelKey {
                scope: ctx.scope(),
                key: key.to_string(),
                source_code: inventory.source_code.clone(),
            },
            inventory.clone(),
        );
        Ok(())
    }
}

/// A node of the category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent: Option<CategoryId>,
}

/// In-memory category tree plus entity → category links.
///
/// Names match exactly. When several categories share a name, the one
/// registered first wins.
#[derive(Debug, Default)]
pub struct InMemoryCategoryLinker {
    categories: RwLock<Vec<Category>>,
    links: RwLock<HashMap<ScopedKey, BTreeSet<CategoryId>>>,
}

impl InMemoryCategoryLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category and return its identifier.
    pub fn add_category(
        &self,
        name: impl Into<String>,
        parent: Option<CategoryId>,
    ) -> Result<CategoryId, LinkError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| LinkError::Unavailable("lock poisoned".to_string()))?;

        let id = CategoryId::new();
        categories.push(Category {
            id,
            name: name.into(),
            parent,
        });
        Ok(id)
    }

    /// Categories currently linked to `key` within `scope`.
    pub fn links(&self, scope: TenantId, key: &str) -> BTreeSet<CategoryId> {
        self.links
            .read()
            .ok()
            .and_then(|links| {
                links
                    .get(&ScopedKey {
                        scope,
                        key: key.to_string(),
                    })
                    .cloned()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl CategoryLinker for InMemoryCategoryLinker {
    async fn resolve(&self, _ctx: &ExecutionContext, names: &[String]) -> Result<Resolution, LinkError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| LinkError::Unavailable("lock poisoned".to_string()))?;

        Ok(names
            .iter()
            .map(|name| {
                let id = categories.iter().find(|c| &c.name == name).map(|c| c.id);
                (name.clone(), id)
            })
            .collect())
    }

    async fn assign(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        category_ids: &BTreeSet<CategoryId>,
    ) -> Result<(), LinkError> {
        {
            let categories = self
                .categories
                .read()
                .map_err(|_| LinkError::Unavailable("lock poisoned".to_string()))?;
            if let Some(unknown) = category_ids
                .iter()
                .find(|id| !categories.iter().any(|c| &c.id == *id))
            {
                return Err(LinkError::UnknownCategory(*unknown));
            }
        }

        let mut links = self
            .links
            .write()
            .map_err(|_| LinkError::Unavailable("lock poisoned".to_string()))?;

        links
            .entry(ScopedKey::new(ctx, key))
            .or_default()
            .extend(category_ids.iter().copied());
        Ok(())
    }
}
