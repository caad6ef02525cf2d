//! `forgeseed` command line: apply one seed and report the outcome.
//!
//! Collaborators are the in-memory stores, pre-populated with the `default`
//! inventory source and the requested categories. Exit codes: 0 on success
//! (with or without warnings), 1 on a fatal reconciliation error, 2 on
//! invalid input.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};

use forgeseed_catalog::{SeedSpec, SimpleProductSeed};
use forgeseed_core::TenantId;
use forgeseed_infra::store::{
    InMemoryCategoryLinker, InMemoryEntityStore, InMemoryInventoryStore, LinkError,
};
use forgeseed_infra::{
    ApplierConfig, CancellationToken, ReconciliationResult, SeedApplier, SeedError, SeedFile,
};
use forgeseed_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "forgeseed", version, about = "Apply catalog seed data idempotently")]
pub struct Cli {
    #[arg(long, help = "JSON seed document (defaults to the built-in example product)")]
    pub seed_file: Option<PathBuf>,

    #[arg(
        long = "category",
        default_values_t = [String::from("Men")],
        help = "Category to register before applying (repeatable)"
    )]
    pub categories: Vec<String>,

    #[arg(long, help = "Per-call timeout in milliseconds; 0 disables [env: FORGESEED_CALL_TIMEOUT_MS]")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Re-attach inventory and categories to an existing entity [env: FORGESEED_REPROVISION]")]
    pub reprovision: bool,

    #[arg(long, help = "Apply twice and fail unless the second run is a no-op")]
    pub verify_idempotent: bool,

    #[arg(long, default_value = "json", help = "Log format: json or compact")]
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid input: {0:#}")]
    Input(anyhow::Error),

    #[error("registering categories: {0}")]
    Setup(#[from] LinkError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error("idempotence check failed: {0}")]
    NotIdempotent(String),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Input(_) => 2,
            RunError::Setup(_) | RunError::Seed(_) | RunError::NotIdempotent(_) => 1,
        }
    }
}

/// What a successful run did.
#[derive(Debug)]
pub struct Report {
    pub result: ReconciliationResult,
    pub rerun: Option<ReconciliationResult>,
}

impl Cli {
    fn config(&self) -> anyhow::Result<ApplierConfig> {
        let mut config = ApplierConfig::from_env().context("reading environment")?;
        if let Some(ms) = self.timeout_ms {
            config = config.with_call_timeout((ms > 0).then(|| Duration::from_millis(ms)));
        }
        if self.reprovision {
            config = config.with_reprovision(true);
        }
        Ok(config)
    }

    fn seed(&self) -> anyhow::Result<SeedSpec> {
        match &self.seed_file {
            Some(path) => SeedFile::load(path)
                .and_then(SeedFile::into_spec)
                .with_context(|| format!("loading seed file {}", path.display())),
            None => SimpleProductSeed::example()
                .into_spec()
                .context("building the example seed"),
        }
    }
}

pub async fn run(cli: &Cli, cancel: CancellationToken) -> Result<Report, RunError> {
    let config = cli.config().map_err(RunError::Input)?;
    let spec = cli.seed().map_err(RunError::Input)?;

    let categories = Arc::new(InMemoryCategoryLinker::new());
    for name in &cli.categories {
        categories.add_category(name.clone(), None)?;
    }
    let applier = SeedApplier::new(
        Arc::new(InMemoryEntityStore::new()),
        Arc::new(InMemoryInventoryStore::with_default_source()),
        categories,
    )
    .with_config(config.clone());

    let ctx = config.context(TenantId::new()).with_cancellation(cancel);
    info!(key = %spec.key(), scope = %ctx.scope(), "applying seed");

    let result = applier.apply(&ctx, &spec).await?;
    log_result(&result);

    let rerun = if cli.verify_idempotent {
        let again = applier.apply(&ctx, &spec).await?;
        log_result(&again);
        if again.created || again.entity_id != result.entity_id {
            return Err(RunError::NotIdempotent(format!(
                "second run returned created={} entity_id={}",
                again.created, again.entity_id
            )));
        }
        Some(again)
    } else {
        None
    };

    Ok(Report { result, rerun })
}

fn log_result(result: &ReconciliationResult) {
    for warning in &result.warnings {
        warn!(%warning, "seed warning");
    }
    match serde_json::to_string(result) {
        Ok(json) => info!(result = %json, "reconciliation finished"),
        Err(err) => warn!(error = %err, "could not serialize reconciliation result"),
    }
}
