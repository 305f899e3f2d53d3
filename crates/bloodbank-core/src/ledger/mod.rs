//! Inventory ledger: batches per hospital, FIFO deduction and stock reports.

mod fifo;
mod service;

pub use fifo::*;
pub use service::*;
