//! Blood Bank Core Library
//!
//! Blood inventory ledger, donation reconciliation and emergency stock
//! search over a single SQLite store.
//!
//! # Architecture
//!
//! ```text
//!   Donation ──────────► DonationReconciler ──┐
//!                         (donor ineligible,  │
//!                          merge/new batch)   │
//!                                             ▼
//!                               ┌──────────────────────────┐
//!   Deduct ────────────────────►│     InventoryLedger      │
//!                               │  batches per hospital,   │
//!   Request ─► RequestFulfiller►│  group and expiry, FIFO  │
//!                               └────────────┬─────────────┘
//!                                            │
//!                                            ▼
//!                               ┌──────────────────────────┐
//!   Shortfall ─────────────────►│     EmergencyLocator     │
//!                               │  stock + Haversine rank  │
//!                               └──────────────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **Every multi-step mutation is one unit of work.** Deductions, donations
//! and fulfilments either commit completely or leave no trace, and stock is
//! never negative.
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer and units of work
//! - [`models`]: Domain types (InventoryBatch, DonationEvent, BloodRequest, etc.)
//! - [`ledger`]: Inventory batches and FIFO deduction
//! - [`reconciler`]: Donation recording
//! - [`locator`]: Emergency search across hospitals
//! - [`fulfillment`]: Blood request lifecycle
//! - [`directory`]: Hospitals, users and camps

pub mod db;
pub mod directory;
pub mod fulfillment;
pub mod ledger;
pub mod locator;
pub mod models;
pub mod reconciler;

// Re-export commonly used types
pub use db::{Database, DbError, UnitOfWork};
pub use directory::Directory;
pub use fulfillment::RequestFulfiller;
pub use ledger::{Deduction, InventoryLedger};
pub use locator::{haversine_km, EmergencyLocator, EmergencySearchResult, HospitalAvailability};
pub use models::{
    BloodGroup, BloodRequest, Camp, DonationEvent, Hospital, InventoryBatch, RequestStatus, User,
    UserType,
};
pub use reconciler::{DonationReceipt, DonationReconciler};

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum BloodBankError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: {available} units available, {required} required")]
    InsufficientStock { available: u32, required: u32 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Carries the cause for logs; callers only learn that it failed.
    #[error("Donation failed: {0}")]
    DonationFailed(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),
}

pub type BloodBankResult<T> = Result<T, BloodBankError>;

impl From<DbError> for BloodBankError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => BloodBankError::NotFound(what),
            e if e.is_constraint_violation() => BloodBankError::Validation(e.to_string()),
            e => BloodBankError::Transaction(e.to_string()),
        }
    }
}

/// Convert a client-supplied count into a positive unit count.
pub(crate) fn positive_units(value: i64, field: &str) -> BloodBankResult<u32> {
    match u32::try_from(value) {
        Ok(units) if units > 0 => Ok(units),
        _ => Err(BloodBankError::Validation(format!(
            "{} must be a positive whole number, got {}",
            field, value
        ))),
    }
}

/// Reject blank identifiers and required text fields.
pub(crate) fn require(value: &str, field: &str) -> BloodBankResult<()> {
    if value.trim().is_empty() {
        return Err(BloodBankError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
