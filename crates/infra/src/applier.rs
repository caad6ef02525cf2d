//! Idempotent seed applier.
//!
//! Reconciles one [`SeedSpec`] against the external stores:
//!
//! ```text
//! find(key) ── found ──────────────────────────────▶ created = false
//!    │
//!    └─ absent ─▶ create ─▶ ┬─ set_level ──────────┬─▶ created = true
//!                           └─ resolve ─▶ assign ──┘
//! ```
//!
//! Only the existence check and creation are fatal. Inventory and category
//! attachment run concurrently after creation; their failures become
//! [`Warning`]s and never undo the created entity. Nothing is retried here:
//! `apply` is safe to call again after any failure.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use forgeseed_catalog::{Entity, SeedSpec};
use forgeseed_core::{CategoryId, Entity as _, EntityId};

use crate::config::ApplierConfig;
use crate::context::{ExecutionContext, Interrupted};
use crate::store::{
    CategoryLinker, CreationError, EntityStore, InventoryError, InventoryStore, LinkError,
    LookupError,
};

/// Fatal reconciliation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// The existence check failed; nothing was written.
    #[error("existence check failed: {0}")]
    Lookup(#[from] LookupError),

    /// The store refused to create the entity; nothing was created.
    #[error("entity creation failed: {0}")]
    Creation(#[from] CreationError),

    /// The caller cancelled; steps that had not started were not run.
    #[error("reconciliation cancelled")]
    Cancelled,
}

/// Non-fatal problem encountered while provisioning dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Warning {
    Inventory(String),
    CategoryNotFound(String),
    CategoryLink(String),
}

impl core::fmt::Display for Warning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Warning::Inventory(msg) => write!(f, "inventory update failed: {msg}"),
            Warning::CategoryNotFound(name) => write!(f, "category not found: {name}"),
            Warning::CategoryLink(msg) => write!(f, "category assignment failed: {msg}"),
        }
    }
}

/// Outcome of one `apply` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub created: bool,
    pub entity_id: EntityId,
    pub warnings: Vec<Warning>,
}

impl ReconciliationResult {
    fn existing(entity_id: EntityId, warnings: Vec<Warning>) -> Self {
        Self {
            created: false,
            entity_id,
            warnings,
        }
    }

    /// Warnings rendered as display strings, in order.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Ensures a seeded entity exists exactly once and is provisioned.
///
/// Holds no locks of its own; uniqueness under concurrent applies comes from
/// the entity store's atomic `create`.
pub struct SeedApplier<E, I, C> {
    entities: E,
    inventory: I,
    categories: C,
    config: ApplierConfig,
}

impl<E, I, C> SeedApplier<E, I, C>
where
    E: EntityStore,
    I: InventoryStore,
    C: CategoryLinker,
{
    pub fn new(entities: E, inventory: I, categories: C) -> Self {
        Self {
            entities,
            inventory,
            categories,
            config: ApplierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ApplierConfig) -> Self {
        self.config = config;
        self
    }

    /// Reconcile external state with `spec`.
    ///
    /// Calls are bounded by the context's timeout, or by the configured
    /// `call_timeout` when the context sets none.
    #[instrument(skip_all, fields(key = %spec.key(), scope = %ctx.scope(), area = ?ctx.area()))]
    pub async fn apply(
        &self,
        ctx: &ExecutionContext,
        spec: &SeedSpec,
    ) -> Result<ReconciliationResult, SeedError> {
        let ctx = &ctx.or_call_timeout(self.config.call_timeout);
        if ctx.is_cancelled() {
            return Err(SeedError::Cancelled);
        }

        if let Some(existing) = self.lookup(ctx, spec.key()).await? {
            return self.settle_existing(ctx, spec, existing).await;
        }

        let entity = match ctx.run(self.entities.create(ctx, spec.to_new_entity())).await {
            Ok(Ok(entity)) => entity,
            Ok(Err(CreationError::DuplicateKey(key))) => {
                // A concurrent apply created the key between our find and create.
                debug!("duplicate key on create; re-checking existence");
                return match self.lookup(ctx, spec.key()).await? {
                    Some(existing) => self.settle_existing(ctx, spec, existing).await,
                    None => Err(CreationError::DuplicateKey(key).into()),
                };
            }
            Ok(Err(err)) => return Err(err.into()),
            Err(Interrupted::Cancelled) => return Err(SeedError::Cancelled),
            Err(Interrupted::TimedOut(limit)) => return Err(CreationError::Timeout(limit).into()),
        };

        info!(entity_id = %entity.id_typed(), key = entity.natural_key(), "entity created");

        let warnings = self.provision(ctx, spec).await?;
        if !warnings.is_empty() {
            warn!(warnings = warnings.len(), "entity created with warnings");
        }

        Ok(ReconciliationResult {
            created: true,
            entity_id: entity.id_typed(),
            warnings,
        })
    }

    async fn lookup(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, SeedError> {
        match ctx.run(self.entities.find(ctx, key)).await {
            Ok(found) => Ok(found?),
            Err(Interrupted::Cancelled) => Err(SeedError::Cancelled),
            Err(Interrupted::TimedOut(limit)) => Err(LookupError::Timeout(limit).into()),
        }
    }

    async fn settle_existing(
        &self,
        ctx: &ExecutionContext,
        spec: &SeedSpec,
        existing: Entity,
    ) -> Result<ReconciliationResult, SeedError> {
        if !self.config.reprovision_existing {
            debug!(
                entity_id = %existing.id_typed(),
                key = existing.natural_key(),
                "entity already exists; nothing to do"
            );
            return Ok(ReconciliationResult::existing(existing.id_typed(), Vec::new()));
        }

        info!(
            entity_id = %existing.id_typed(),
            key = existing.natural_key(),
            "entity exists; reprovisioning dependents"
        );
        let warnings = self.provision(ctx, spec).await?;
        Ok(ReconciliationResult::existing(existing.id_typed(), warnings))
    }

    /// Inventory and categories are independent, so they run concurrently.
    async fn provision(&self, ctx: &ExecutionContext, spec: &SeedSpec) -> Result<Vec<Warning>, SeedError> {
        let (inventory, categories) = tokio::join!(
            self.attach_inventory(ctx, spec),
            self.attach_categories(ctx, spec),
        );

        let mut warnings = inventory?;
        warnings.extend(categories?);
        Ok(warnings)
    }

    async fn attach_inventory(&self, ctx: &ExecutionContext, spec: &SeedSpec) -> Result<Vec<Warning>, SeedError> {
        let inventory = spec.inventory();
        let err = match ctx.run(self.inventory.set_level(ctx, spec.key(), inventory)).await {
            Ok(Ok(())) => {
                debug!(
                    source = %inventory.source_code,
                    quantity = inventory.quantity,
                    "inventory level set"
                );
                return Ok(Vec::new());
            }
            Ok(Err(err)) => err,
            Err(Interrupted::TimedOut(limit)) => InventoryError::Timeout(limit),
            Err(Interrupted::Cancelled) => return Err(SeedError::Cancelled),
        };

        warn!(error = %err, source = %inventory.source_code, "inventory update failed");
        Ok(vec![Warning::Inventory(err.to_string())])
    }

    async fn attach_categories(&self, ctx: &ExecutionContext, spec: &SeedSpec) -> Result<Vec<Warning>, SeedError> {
        let names = spec.category_names();
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let resolution = match ctx.run(self.categories.resolve(ctx, names)).await {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(err)) => return Ok(vec![Self::link_warning(err)]),
            Err(Interrupted::TimedOut(limit)) => return Ok(vec![Self::link_warning(LinkError::Timeout(limit))]),
            Err(Interrupted::Cancelled) => return Err(SeedError::Cancelled),
        };

        let mut warnings = Vec::new();
        let mut ids: BTreeSet<CategoryId> = BTreeSet::new();
        for name in names {
            match resolution.get(name).copied().flatten() {
                Some(id) => {
                    ids.insert(id);
                }
                None => {
                    warn!(category = %name, "category not found");
                    warnings.push(Warning::CategoryNotFound(name.clone()));
                }
            }
        }

        if ids.is_empty() {
            return Ok(warnings);
        }

        match ctx.run(self.categories.assign(ctx, spec.key(), &ids)).await {
            Ok(Ok(())) => debug!(categories = ids.len(), "categories assigned"),
            Ok(Err(err)) => warnings.push(Self::link_warning(err)),
            Err(Interrupted::TimedOut(limit)) => warnings.push(Self::link_warning(LinkError::Timeout(limit))),
            Err(Interrupted::Cancelled) => return Err(SeedError::Cancelled),
        }

        Ok(warnings)
    }

    fn link_warning(err: LinkError) -> Warning {
        warn!(error = %err, "category linking failed");
        Warning::CategoryLink(err.to_string())
    }
}
