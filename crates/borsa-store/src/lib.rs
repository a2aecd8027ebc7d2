//! borsa-store
//!
//! Storage collaborator for the portfolio core:
//! - Per-entity store traits — the exact operation surface the ledger,
//!   catalog and report layers are written against.
//! - [`MemoryStore`] — the reference implementation: monotonic row ids,
//!   deterministic query ordering, relational cascade deletes.
//! - JSON snapshot save/load for backup and restore.
//!
//! Stores are plain values handed to their consumers explicitly; there is
//! no ambient global. Mutating operations take `&mut self`, so a store
//! handle has exactly one writer at a time and the read-validate-mutate
//! sequences built on top of it cannot interleave.

mod memory;
mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{load_snapshot, save_snapshot};

use borsa_schemas::{
    Holding, NewAllocation, NewHolding, NewProfile, NewStock, NewTransaction, Profile,
    SaleAllocation, Stock, Transaction,
};
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures surfaced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// An update or delete referenced a row that does not exist.
    NotFound { entity: &'static str, id: i64 },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Store traits
// ---------------------------------------------------------------------------

/// Profile rows. Deleting a profile cascades to its stocks.
pub trait ProfileStore {
    fn insert_profile(&mut self, profile: NewProfile) -> Result<i64, StoreError>;
    fn profile(&self, id: i64) -> Result<Option<Profile>, StoreError>;
    /// All profiles, newest first.
    fn profiles(&self) -> Result<Vec<Profile>, StoreError>;
    fn active_profile(&self) -> Result<Option<Profile>, StoreError>;
    fn update_profile(&mut self, profile: &Profile) -> Result<(), StoreError>;
    fn delete_profile(&mut self, id: i64) -> Result<(), StoreError>;
    fn deactivate_all_profiles(&mut self) -> Result<(), StoreError>;
    fn set_active_profile(&mut self, id: i64) -> Result<(), StoreError>;
    fn profile_count(&self) -> Result<usize, StoreError>;
}

/// Stock rows. Deleting a stock cascades to its transactions, holdings
/// and allocations.
pub trait StockStore {
    fn insert_stock(&mut self, stock: NewStock) -> Result<i64, StoreError>;
    fn stock(&self, id: i64) -> Result<Option<Stock>, StoreError>;
    /// Stocks of one profile, ordered by name.
    fn stocks_for_profile(&self, profile_id: i64) -> Result<Vec<Stock>, StoreError>;
    fn stock_by_symbol(&self, profile_id: i64, symbol: &str) -> Result<Option<Stock>, StoreError>;
    /// Case-insensitive substring match on symbol or name.
    fn search_stocks(&self, profile_id: i64, query: &str) -> Result<Vec<Stock>, StoreError>;
    fn update_stock(&mut self, stock: &Stock) -> Result<(), StoreError>;
    fn delete_stock(&mut self, id: i64) -> Result<(), StoreError>;
}

/// Transaction rows. Deleting a transaction cascades to allocations that
/// reference it on either side and to the lot it originated (if a buy).
pub trait TransactionStore {
    fn insert_transaction(&mut self, tx: NewTransaction) -> Result<i64, StoreError>;
    fn transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError>;
    /// Transactions of one stock, newest first.
    fn transactions_for_stock(&self, stock_id: i64) -> Result<Vec<Transaction>, StoreError>;
    /// Transactions across every stock of a profile, newest first.
    fn transactions_for_profile(&self, profile_id: i64) -> Result<Vec<Transaction>, StoreError>;
    /// Transactions of one stock within `[from, to]`, newest first.
    fn transactions_in_range(
        &self,
        stock_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError>;
    fn delete_transaction(&mut self, id: i64) -> Result<(), StoreError>;
    fn total_bought(&self, stock_id: i64) -> Result<f64, StoreError>;
    fn total_sold(&self, stock_id: i64) -> Result<f64, StoreError>;
}

/// Lot rows. `remaining_quantity` is mutated exclusively through
/// `update_holding`, and only the ledger calls it.
pub trait HoldingStore {
    fn insert_holding(&mut self, holding: NewHolding) -> Result<i64, StoreError>;
    fn holding(&self, id: i64) -> Result<Option<Holding>, StoreError>;
    /// Lots with `remaining_quantity > 0`, ordered by `(buy_date, id)`
    /// ascending — the canonical consumption order.
    fn open_holdings(&self, stock_id: i64) -> Result<Vec<Holding>, StoreError>;
    /// Every lot of the stock, exhausted ones included, `(buy_date, id)` asc.
    fn all_holdings(&self, stock_id: i64) -> Result<Vec<Holding>, StoreError>;
    fn holding_for_buy(&self, buy_transaction_id: i64) -> Result<Option<Holding>, StoreError>;
    fn update_holding(&mut self, holding: &Holding) -> Result<(), StoreError>;
    fn delete_holding_for_buy(&mut self, buy_transaction_id: i64) -> Result<(), StoreError>;
    fn total_remaining(&self, stock_id: i64) -> Result<f64, StoreError>;
    /// Remaining-quantity-weighted mean of open-lot buy prices.
    /// `None` when nothing is held.
    fn average_open_buy_price(&self, stock_id: i64) -> Result<Option<f64>, StoreError>;
}

/// Allocation rows, written in batch when a sell is recorded.
pub trait AllocationStore {
    fn insert_allocations(&mut self, allocations: &[NewAllocation]) -> Result<(), StoreError>;
    fn allocations_for_sell(&self, sell_transaction_id: i64)
        -> Result<Vec<SaleAllocation>, StoreError>;
    fn allocations_for_buy(&self, buy_transaction_id: i64)
        -> Result<Vec<SaleAllocation>, StoreError>;
    fn delete_allocations_for_sell(&mut self, sell_transaction_id: i64) -> Result<(), StoreError>;
    fn realized_profit_for_stock(&self, stock_id: i64) -> Result<f64, StoreError>;
    fn realized_profit_for_profile(&self, profile_id: i64) -> Result<f64, StoreError>;
}
