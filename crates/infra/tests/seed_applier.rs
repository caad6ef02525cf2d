//! Reconciliation behaviour of `SeedApplier` against in-memory and
//! deliberately misbehaving collaborators.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use forgeseed_catalog::{Entity, InventorySpec, NewEntity, SeedSpec};
use forgeseed_core::{CategoryId, TenantId};
use forgeseed_infra::store::{
    CategoryLinker, CreationError, EntityStore, InMemoryCategoryLinker, InMemoryEntityStore,
    InMemoryInventoryStore, InventoryError, InventoryStore, LinkError, LookupError, Resolution,
};
use forgeseed_infra::{
    ApplierConfig, CancellationToken, ExecutionContext, SeedApplier, SeedError, Warning,
};

struct Fixture {
    entities: Arc<InMemoryEntityStore>,
    inventory: Arc<InMemoryInventoryStore>,
    categories: Arc<InMemoryCategoryLinker>,
    men: CategoryId,
}

fn fixture() -> Fixture {
    let categories = Arc::new(InMemoryCategoryLinker::new());
    let men = categories.add_category("Men", None).unwrap();
    Fixture {
        entities: Arc::new(InMemoryEntityStore::new()),
        inventory: Arc::new(InMemoryInventoryStore::with_default_source()),
        categories,
        men,
    }
}

type InMemoryApplier =
    SeedApplier<Arc<InMemoryEntityStore>, Arc<InMemoryInventoryStore>, Arc<InMemoryCategoryLinker>>;

fn applier(f: &Fixture) -> InMemoryApplier {
    SeedApplier::new(f.entities.clone(), f.inventory.clone(), f.categories.clone())
}

fn ctx() -> ExecutionContext {
    ExecutionContext::admin(TenantId::new())
}

fn spec_with_categories(names: &[&str]) -> SeedSpec {
    SeedSpec::builder("2002")
        .attribute("name", "Simple Product Example")
        .attribute("price", Decimal::new(9999, 2))
        .inventory(InventorySpec::in_stock("default", 150))
        .categories(names.iter().copied())
        .build()
        .unwrap()
}

fn reference_spec() -> SeedSpec {
    spec_with_categories(&["Men"])
}

// --- test doubles -----------------------------------------------------------

/// Counts calls before delegating.
#[derive(Default)]
struct Calls(AtomicUsize);

impl Calls {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

struct CountingEntities {
    inner: Arc<InMemoryEntityStore>,
    calls: Calls,
}

#[async_trait]
impl EntityStore for CountingEntities {
    async fn find(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, LookupError> {
        self.calls.hit();
        self.inner.find(ctx, key).await
    }

    async fn create(&self, ctx: &ExecutionContext, entity: NewEntity) -> Result<Entity, CreationError> {
        self.calls.hit();
        self.inner.create(ctx, entity).await
    }
}

struct CountingInventory {
    inner: Arc<InMemoryInventoryStore>,
    calls: Calls,
}

#[async_trait]
impl InventoryStore for CountingInventory {
    async fn set_level(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        inventory: &InventorySpec,
    ) -> Result<(), InventoryError> {
        self.calls.hit();
        self.inner.set_level(ctx, key, inventory).await
    }
}

/// Records every `assign` call.
struct RecordingLinker {
    inner: Arc<InMemoryCategoryLinker>,
    resolves: Calls,
    assigned: Mutex<Vec<BTreeSet<CategoryId>>>,
}

impl RecordingLinker {
    fn new(inner: Arc<InMemoryCategoryLinker>) -> Self {
        Self {
            inner,
            resolves: Calls::default(),
            assigned: Mutex::new(Vec::new()),
        }
    }

    fn assigned(&self) -> Vec<BTreeSet<CategoryId>> {
        self.assigned.lock().unwrap().clone()
    }
}

#[async_trait]
impl CategoryLinker for RecordingLinker {
    async fn resolve(&self, ctx: &ExecutionContext, names: &[String]) -> Result<Resolution, LinkError> {
        self.resolves.hit();
        self.inner.resolve(ctx, names).await
    }

    async fn assign(
        &self,
        ctx: &ExecutionContext,
        key: &str,
        category_ids: &BTreeSet<CategoryId>,
    ) -> Result<(), LinkError> {
        self.assigned.lock().unwrap().push(category_ids.clone());
        self.inner.assign(ctx, key, category_ids).await
    }
}

struct FailingInventory;

#[async_trait]
impl InventoryStore for FailingInventory {
    async fn set_level(&self, _: &ExecutionContext, _: &str, _: &InventorySpec) -> Result<(), InventoryError> {
        Err(InventoryError::Unavailable("connection refused".to_string()))
    }
}

struct FailingLinker;

#[async_trait]
impl CategoryLinker for FailingLinker {
    async fn resolve(&self, _: &ExecutionContext, _: &[String]) -> Result<Resolution, LinkError> {
        Err(LinkError::Unavailable("connection refused".to_string()))
    }

    async fn assign(&self, _: &ExecutionContext, _: &str, _: &BTreeSet<CategoryId>) -> Result<(), LinkError> {
        unreachable!("assign must not run after a failed resolve")
    }
}

/// Resolves through the in-memory tree but refuses every link write.
struct AssignRejectingLinker {
    inner: Arc<InMemoryCategoryLinker>,
}

#[async_trait]
impl CategoryLinker for AssignRejectingLinker {
    async fn resolve(&self, ctx: &ExecutionContext, names: &[String]) -> Result<Resolution, LinkError> {
        self.inner.resolve(ctx, names).await
    }

    async fn assign(&self, _: &ExecutionContext, _: &str, _: &BTreeSet<CategoryId>) -> Result<(), LinkError> {
        Err(LinkError::Unavailable("write refused".to_string()))
    }
}

/// Entity store whose existence check is down.
struct UnreachableEntities {
    creates: Calls,
}

#[async_trait]
impl EntityStore for UnreachableEntities {
    async fn find(&self, _: &ExecutionContext, _: &str) -> Result<Option<Entity>, LookupError> {
        Err(LookupError::Unavailable("connection refused".to_string()))
    }

    async fn create(&self, _: &ExecutionContext, _: NewEntity) -> Result<Entity, CreationError> {
        self.creates.hit();
        Err(CreationError::Rejected("unreachable".to_string()))
    }
}

/// Entity store that rejects every write.
struct RejectingEntities;

#[async_trait]
impl EntityStore for RejectingEntities {
    async fn find(&self, _: &ExecutionContext, _: &str) -> Result<Option<Entity>, LookupError> {
        Ok(None)
    }

    async fn create(&self, _: &ExecutionContext, _: NewEntity) -> Result<Entity, CreationError> {
        Err(CreationError::Validation("url key already in use".to_string()))
    }
}

/// Existence check that never answers in time.
struct SlowEntities;

#[async_trait]
impl EntityStore for SlowEntities {
    async fn find(&self, _: &ExecutionContext, _: &str) -> Result<Option<Entity>, LookupError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }

    async fn create(&self, _: &ExecutionContext, _: NewEntity) -> Result<Entity, CreationError> {
        unreachable!("create must not run after a timed-out lookup")
    }
}

/// Answers the existence check but never finishes a create in time.
struct SlowCreate;

#[async_trait]
impl EntityStore for SlowCreate {
    async fn find(&self, _: &ExecutionContext, _: &str) -> Result<Option<Entity>, LookupError> {
        Ok(None)
    }

    async fn create(&self, _: &ExecutionContext, _: NewEntity) -> Result<Entity, CreationError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(CreationError::Rejected("too late".to_string()))
    }
}

struct SlowInventory;

#[async_trait]
impl InventoryStore for SlowInventory {
    async fn set_level(&self, _: &ExecutionContext, _: &str, _: &InventorySpec) -> Result<(), InventoryError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

/// Serves the first `stale` lookups as "absent", like a replica lagging
/// behind a concurrent writer.
struct StaleReads {
    inner: Arc<InMemoryEntityStore>,
    stale: AtomicUsize,
}

#[async_trait]
impl EntityStore for StaleReads {
    async fn find(&self, ctx: &ExecutionContext, key: &str) -> Result<Option<Entity>, LookupError> {
        let stale = self
            .stale
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(None);
        }
        self.inner.find(ctx, key).await
    }

    async fn create(&self, ctx: &ExecutionContext, entity: NewEntity) -> Result<Entity, CreationError> {
        self.inner.create(ctx, entity).await
    }
}

/// Cancels the run from inside `set_level`, then never finishes.
struct CancellingInventory {
    token: CancellationToken,
}

#[async_trait]
impl InventoryStore for CancellingInventory {
    async fn set_level(&self, _: &ExecutionContext, _: &str, _: &InventorySpec) -> Result<(), InventoryError> {
        self.token.cancel();
        std::future::pending::<()>().await;
        Ok(())
    }
}

// --- idempotence -------------------------------------------------------------

#[tokio::test]
async fn reference_seed_is_created_once_then_left_alone() {
    let f = fixture();
    let applier = applier(&f);
    let ctx = ctx();
    let spec = reference_spec();

    let first = applier.apply(&ctx, &spec).await.unwrap();
    assert!(first.created);
    assert!(first.warnings.is_empty());

    let second = applier.apply(&ctx, &spec).await.unwrap();
    assert!(!second.created);
    assert_eq!(second.entity_id, first.entity_id);
    assert!(second.warnings.is_empty());

    assert_eq!(f.entities.len(), 1);
    assert_eq!(
        f.inventory.level(ctx.scope(), "2002", "default"),
        Some(InventorySpec::in_stock("default", 150))
    );
    assert_eq!(f.categories.links(ctx.scope(), "2002"), BTreeSet::from([f.men]));
}

#[tokio::test]
async fn repeat_run_touches_only_the_existence_check() {
    let f = fixture();
    let entities = Arc::new(CountingEntities {
        inner: f.entities.clone(),
        calls: Calls::default(),
    });
    let inventory = Arc::new(CountingInventory {
        inner: f.inventory.clone(),
        calls: Calls::default(),
    });
    let applier = SeedApplier::new(entities.clone(), inventory.clone(), f.categories.clone());
    let ctx = ctx();

    applier.apply(&ctx, &reference_spec()).await.unwrap();
    let (entity_calls, inventory_calls) = (entities.calls.count(), inventory.calls.count());

    applier.apply(&ctx, &reference_spec()).await.unwrap();

    assert_eq!(entities.calls.count(), entity_calls + 1);
    assert_eq!(inventory.calls.count(), inventory_calls);
}

// --- creation races ----------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_applies_create_exactly_once() {
    let f = fixture();
    let applier = Arc::new(applier(&f));
    let ctx = ctx();
    let spec = reference_spec();

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let applier = applier.clone();
            let ctx = ctx.clone();
            let spec = spec.clone();
            tokio::spawn(async move { applier.apply(&ctx, &spec).await })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap().unwrap());
    }

    assert_eq!(results.iter().filter(|r| r.created).count(), 1);
    assert_eq!(results[0].entity_id, results[1].entity_id);
    assert_eq!(f.entities.len(), 1);
}

#[tokio::test]
async fn losing_the_create_race_resolves_to_the_winner() {
    let f = fixture();
    let ctx = ctx();
    let winner = applier(&f).apply(&ctx, &reference_spec()).await.unwrap();

    let stale = Arc::new(StaleReads {
        inner: f.entities.clone(),
        stale: AtomicUsize::new(1),
    });
    let loser = SeedApplier::new(stale, f.inventory.clone(), f.categories.clone())
        .apply(&ctx, &reference_spec())
        .await
        .unwrap();

    assert!(!loser.created);
    assert_eq!(loser.entity_id, winner.entity_id);
    assert_eq!(f.entities.len(), 1);
}

#[tokio::test]
async fn duplicate_key_without_a_visible_winner_is_fatal() {
    let f = fixture();
    let ctx = ctx();
    applier(&f).apply(&ctx, &reference_spec()).await.unwrap();

    let stale = Arc::new(StaleReads {
        inner: f.entities.clone(),
        stale: AtomicUsize::new(2),
    });
    let err = SeedApplier::new(stale, f.inventory.clone(), f.categories.clone())
        .apply(&ctx, &reference_spec())
        .await
        .unwrap_err();

    assert_eq!(err, SeedError::Creation(CreationError::DuplicateKey("2002".to_string())));
}

// --- fatal failures ----------------------------------------------------------

#[tokio::test]
async fn unreachable_existence_check_aborts_before_any_write() {
    let f = fixture();
    let entities = Arc::new(UnreachableEntities {
        creates: Calls::default(),
    });
    let inventory = Arc::new(CountingInventory {
        inner: f.inventory.clone(),
        calls: Calls::default(),
    });
    let applier = SeedApplier::new(entities.clone(), inventory.clone(), f.categories.clone());

    let err = applier.apply(&ctx(), &reference_spec()).await.unwrap_err();

    assert!(matches!(err, SeedError::Lookup(LookupError::Unavailable(_))));
    assert_eq!(entities.creates.count(), 0);
    assert_eq!(inventory.calls.count(), 0);
}

#[tokio::test]
async fn rejected_creation_is_fatal_and_skips_dependents() {
    let f = fixture();
    let inventory = Arc::new(CountingInventory {
        inner: f.inventory.clone(),
        calls: Calls::default(),
    });
    let linker = Arc::new(RecordingLinker::new(f.categories.clone()));
    let applier = SeedApplier::new(RejectingEntities, inventory.clone(), linker.clone());

    let err = applier.apply(&ctx(), &reference_spec()).await.unwrap_err();

    assert_eq!(
        err,
        SeedError::Creation(CreationError::Validation("url key already in use".to_string()))
    );
    assert_eq!(inventory.calls.count(), 0);
    assert_eq!(linker.resolves.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn existence_check_timeout_is_fatal() {
    let f = fixture();
    let applier = SeedApplier::new(SlowEntities, f.inventory.clone(), f.categories.clone());
    let ctx = ctx().with_call_timeout(Duration::from_millis(50));

    let err = applier.apply(&ctx, &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Lookup(LookupError::Timeout(Duration::from_millis(50))));
}

#[tokio::test(start_paused = true)]
async fn configured_timeout_bounds_a_context_without_one() {
    let f = fixture();
    let applier = SeedApplier::new(SlowEntities, f.inventory.clone(), f.categories.clone())
        .with_config(ApplierConfig::default().with_call_timeout(Some(Duration::from_millis(50))));

    let err = applier.apply(&ctx(), &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Lookup(LookupError::Timeout(Duration::from_millis(50))));
}

#[tokio::test(start_paused = true)]
async fn default_config_still_bounds_calls() {
    let f = fixture();
    let applier = SeedApplier::new(SlowEntities, f.inventory.clone(), f.categories.clone());

    let err = applier.apply(&ctx(), &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Lookup(LookupError::Timeout(Duration::from_secs(30))));
}

#[tokio::test(start_paused = true)]
async fn context_timeout_wins_over_configured_timeout() {
    let f = fixture();
    let applier = SeedApplier::new(SlowEntities, f.inventory.clone(), f.categories.clone())
        .with_config(ApplierConfig::default().with_call_timeout(Some(Duration::from_millis(50))));
    let ctx = ctx().with_call_timeout(Duration::from_millis(20));

    let err = applier.apply(&ctx, &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Lookup(LookupError::Timeout(Duration::from_millis(20))));
}

#[tokio::test(start_paused = true)]
async fn creation_timeout_is_fatal() {
    let f = fixture();
    let inventory = Arc::new(CountingInventory {
        inner: f.inventory.clone(),
        calls: Calls::default(),
    });
    let applier = SeedApplier::new(SlowCreate, inventory.clone(), f.categories.clone());
    let ctx = ctx().with_call_timeout(Duration::from_millis(50));

    let err = applier.apply(&ctx, &reference_spec()).await.unwrap_err();

    assert_eq!(
        err,
        SeedError::Creation(CreationError::Timeout(Duration::from_millis(50)))
    );
    assert_eq!(inventory.calls.count(), 0);
}

// --- partial failures --------------------------------------------------------

#[tokio::test]
async fn inventory_failure_is_surfaced_not_fatal() {
    let f = fixture();
    let applier = SeedApplier::new(f.entities.clone(), FailingInventory, f.categories.clone());
    let ctx = ctx();

    let result = applier.apply(&ctx, &reference_spec()).await.unwrap();

    assert!(result.created);
    assert_eq!(
        result.warnings,
        vec![Warning::Inventory(
            "inventory store unavailable: connection refused".to_string()
        )]
    );
    assert!(result.warning_messages()[0].starts_with("inventory update failed:"));
    // Creation stands and categories were still linked.
    assert_eq!(f.entities.len(), 1);
    assert_eq!(f.categories.links(ctx.scope(), "2002"), BTreeSet::from([f.men]));
}

#[tokio::test(start_paused = true)]
async fn inventory_timeout_becomes_a_warning() {
    let f = fixture();
    let applier = SeedApplier::new(f.entities.clone(), SlowInventory, f.categories.clone());
    let ctx = ctx().with_call_timeout(Duration::from_millis(50));

    let result = applier.apply(&ctx, &reference_spec()).await.unwrap();

    assert!(result.created);
    assert_eq!(
        result.warning_messages(),
        vec!["inventory update failed: timed out after 50ms".to_string()]
    );
}

#[tokio::test]
async fn unknown_inventory_source_becomes_a_warning() {
    let f = fixture();
    let spec = SeedSpec::builder("2003")
        .inventory(InventorySpec::in_stock("warehouse-9", 5))
        .build()
        .unwrap();

    let result = applier(&f).apply(&ctx(), &spec).await.unwrap();

    assert!(result.created);
    assert_eq!(
        result.warning_messages(),
        vec!["inventory update failed: unknown inventory source 'warehouse-9'".to_string()]
    );
}

#[tokio::test]
async fn category_store_failure_is_a_single_warning() {
    let f = fixture();
    let applier = SeedApplier::new(f.entities.clone(), f.inventory.clone(), FailingLinker);

    let result = applier.apply(&ctx(), &reference_spec()).await.unwrap();

    assert!(result.created);
    assert_eq!(
        result.warnings,
        vec![Warning::CategoryLink(
            "category store unavailable: connection refused".to_string()
        )]
    );
}

#[tokio::test]
async fn failed_assignment_after_resolve_is_a_warning() {
    let f = fixture();
    let applier = SeedApplier::new(
        f.entities.clone(),
        f.inventory.clone(),
        AssignRejectingLinker {
            inner: f.categories.clone(),
        },
    );
    let ctx = ctx();

    let result = applier.apply(&ctx, &reference_spec()).await.unwrap();

    assert!(result.created);
    assert_eq!(
        result.warning_messages(),
        vec!["category assignment failed: category store unavailable: write refused".to_string()]
    );
    assert_eq!(
        f.inventory.level(ctx.scope(), "2002", "default"),
        Some(InventorySpec::in_stock("default", 150))
    );
    assert!(f.categories.links(ctx.scope(), "2002").is_empty());
}

// --- category resolution -----------------------------------------------------

#[tokio::test]
async fn unresolved_categories_are_skipped_with_a_warning() {
    let f = fixture();
    let linker = Arc::new(RecordingLinker::new(f.categories.clone()));
    let applier = SeedApplier::new(f.entities.clone(), f.inventory.clone(), linker.clone());

    let result = applier
        .apply(&ctx(), &spec_with_categories(&["Men", "Ghost"]))
        .await
        .unwrap();

    assert!(result.created);
    assert_eq!(linker.assigned(), vec![BTreeSet::from([f.men])]);
    assert_eq!(result.warning_messages(), vec!["category not found: Ghost".to_string()]);
}

#[tokio::test]
async fn no_resolved_categories_means_no_assignment() {
    let f = fixture();
    let linker = Arc::new(RecordingLinker::new(f.categories.clone()));
    let applier = SeedApplier::new(f.entities.clone(), f.inventory.clone(), linker.clone());

    let result = applier
        .apply(&ctx(), &spec_with_categories(&["Ghost", "Phantom"]))
        .await
        .unwrap();

    assert!(linker.assigned().is_empty());
    assert_eq!(
        result.warnings,
        vec![
            Warning::CategoryNotFound("Ghost".to_string()),
            Warning::CategoryNotFound("Phantom".to_string()),
        ]
    );
}

#[tokio::test]
async fn no_categories_declared_skips_the_linker() {
    let f = fixture();
    let linker = Arc::new(RecordingLinker::new(f.categories.clone()));
    let applier = SeedApplier::new(f.entities.clone(), f.inventory.clone(), linker.clone());

    let result = applier.apply(&ctx(), &spec_with_categories(&[])).await.unwrap();

    assert!(result.created);
    assert_eq!(linker.resolves.count(), 0);
}

#[tokio::test]
async fn inventory_warnings_come_before_category_warnings() {
    let f = fixture();
    let applier = SeedApplier::new(f.entities.clone(), FailingInventory, f.categories.clone());

    let result = applier
        .apply(&ctx(), &spec_with_categories(&["Ghost"]))
        .await
        .unwrap();

    assert!(matches!(result.warnings[0], Warning::Inventory(_)));
    assert_eq!(result.warnings[1], Warning::CategoryNotFound("Ghost".to_string()));
}

// --- cancellation ------------------------------------------------------------

#[tokio::test]
async fn cancelled_before_start_makes_no_store_calls() {
    let f = fixture();
    let entities = Arc::new(CountingEntities {
        inner: f.entities.clone(),
        calls: Calls::default(),
    });
    let inventory = Arc::new(CountingInventory {
        inner: f.inventory.clone(),
        calls: Calls::default(),
    });
    let linker = Arc::new(RecordingLinker::new(f.categories.clone()));
    let applier = SeedApplier::new(entities.clone(), inventory.clone(), linker.clone());

    let ctx = ctx();
    ctx.cancellation().cancel();

    let err = applier.apply(&ctx, &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Cancelled);
    assert_eq!(entities.calls.count(), 0);
    assert_eq!(inventory.calls.count(), 0);
    assert_eq!(linker.resolves.count(), 0);
    assert!(f.entities.is_empty());
}

#[tokio::test]
async fn cancellation_after_creation_keeps_the_entity() {
    let f = fixture();
    let token = CancellationToken::new();
    let applier = SeedApplier::new(
        f.entities.clone(),
        CancellingInventory {
            token: token.clone(),
        },
        f.categories.clone(),
    );
    let ctx = ctx().with_cancellation(token);

    let err = applier.apply(&ctx, &reference_spec()).await.unwrap_err();

    assert_eq!(err, SeedError::Cancelled);
    assert_eq!(f.entities.len(), 1);
}

// --- reprovisioning ----------------------------------------------------------

#[tokio::test]
async fn reprovisioning_repairs_an_existing_entity() {
    let f = fixture();
    let ctx = ctx();

    // First run loses its inventory write.
    let first = SeedApplier::new(f.entities.clone(), FailingInventory, f.categories.clone())
        .apply(&ctx, &reference_spec())
        .await
        .unwrap();
    assert_eq!(f.inventory.level(ctx.scope(), "2002", "default"), None);

    // A plain re-run does not touch dependents.
    applier(&f).apply(&ctx, &reference_spec()).await.unwrap();
    assert_eq!(f.inventory.level(ctx.scope(), "2002", "default"), None);

    let repaired = applier(&f)
        .with_config(ApplierConfig::default().with_reprovision(true))
        .apply(&ctx, &reference_spec())
        .await
        .unwrap();

    assert!(!repaired.created);
    assert_eq!(repaired.entity_id, first.entity_id);
    assert!(repaired.warnings.is_empty());
    assert_eq!(
        f.inventory.level(ctx.scope(), "2002", "default"),
        Some(InventorySpec::in_stock("default", 150))
    );
}
