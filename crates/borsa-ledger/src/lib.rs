//! borsa-ledger
//!
//! FIFO cost-basis accounting core:
//! - Sell allocation against purchase lots, oldest first
//! - Realized profit per consumed lot portion
//! - Lot inventory mutation, reversal, and rebooking
//! - Pure deterministic allocation logic (no IO, no time, no store access)
//!
//! The allocator computes; the [`Ledger`] applies. Keeping the split
//! means the FIFO rules stay independently testable while the service
//! owns the invariant-checking boundary.

pub mod allocator;
pub mod ledger;

mod types;

pub use allocator::{allocate, AllocationError};
pub use ledger::{Ledger, LedgerError};
pub use types::{ProfitCalculation, SellReceipt, TradeRequest};
