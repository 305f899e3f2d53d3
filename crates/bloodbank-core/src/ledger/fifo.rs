//! FIFO deduction planning.
//!
//! Planning is pure: it decides which batches a deduction touches without
//! writing anything, so a shortfall is detected before the first mutation.

use crate::models::InventoryBatch;

/// What a deduction does to one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    /// The batch is used up and removed.
    Consume { batch_id: String, taken: u32 },
    /// Part of the batch is taken; `left` units stay.
    Reduce { batch_id: String, taken: u32, left: u32 },
}

impl BatchAction {
    pub fn batch_id(&self) -> &str {
        match self {
            BatchAction::Consume { batch_id, .. } | BatchAction::Reduce { batch_id, .. } => {
                batch_id
            }
        }
    }

    pub fn taken(&self) -> u32 {
        match self {
            BatchAction::Consume { taken, .. } | BatchAction::Reduce { taken, .. } => *taken,
        }
    }
}

/// Stock could not cover the deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub available: u32,
    pub required: u32,
}

/// Plan taking `units` from `batches`, which must already be usable and in
/// FIFO order.
///
/// Whole batches are consumed front to back; the last batch touched is
/// reduced if it holds more than what is still owed.
pub fn plan_fifo(batches: &[InventoryBatch], units: u32) -> Result<Vec<BatchAction>, Shortfall> {
    let available: u64 = batches.iter().map(|b| u64::from(b.quantity)).sum();
    if available < u64::from(units) {
        return Err(Shortfall {
            available: u32::try_from(available).unwrap_or(u32::MAX),
            required: units,
        });
    }

    let mut owed = units;
    let mut actions = Vec::new();
    for batch in batches {
        if owed == 0 {
            break;
        }
        if batch.quantity <= owed {
            owed -= batch.quantity;
            actions.push(BatchAction::Consume {
                batch_id: batch.id.clone(),
                taken: batch.quantity,
            });
        } else {
            actions.push(BatchAction::Reduce {
                batch_id: batch.id.clone(),
                taken: owed,
                left: batch.quantity - owed,
            });
            owed = 0;
        }
    }
    Ok(actions)
}
