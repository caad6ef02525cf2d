//! Desired stock level at one inventory source.

use serde::{Deserialize, Serialize};

use forgeseed_core::{DomainError, DomainResult};

/// Stock status flag stored alongside the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
}

/// Desired stock level for a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySpec {
    pub source_code: String,
    pub quantity: i64,
    #[serde(default)]
    pub status: StockStatus,
}

impl InventorySpec {
    pub fn new(source_code: impl Into<String>, quantity: i64, status: StockStatus) -> Self {
        Self {
            source_code: source_code.into(),
            quantity,
            status,
        }
    }

    /// In-stock level at the given source.
    pub fn in_stock(source_code: impl Into<String>, quantity: i64) -> Self {
        Self::new(source_code, quantity, StockStatus::InStock)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.source_code.trim().is_empty() {
            return Err(DomainError::validation("source code cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative (got {})",
                self.quantity
            )));
        }
        Ok(())
    }
}
