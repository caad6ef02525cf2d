//! Infrastructure layer: collaborator boundaries, in-memory stores, the seed
//! applier and configuration.

pub mod applier;
pub mod config;
pub mod context;
pub mod store;

pub use applier::{ReconciliationResult, SeedApplier, SeedError, Warning};
pub use config::{ApplierConfig, ConfigError, SeedFile};
pub use context::{CancellationToken, ExecutionArea, ExecutionContext, Interrupted};
