//! In-memory reference store.
//!
//! Backs every store trait with plain `Vec` tables plus monotonic id
//! counters, mirroring the relational schema the entities came from:
//! profiles → stocks → transactions → holdings/allocations, with the same
//! cascade-delete edges. Queries iterate in insertion order and sort with
//! total keys, so results are deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use borsa_schemas::{
    Holding, NewAllocation, NewHolding, NewProfile, NewStock, NewTransaction, Profile,
    SaleAllocation, Stock, Transaction,
};

use crate::{
    AllocationStore, HoldingStore, ProfileStore, StockStore, StoreError, TransactionStore,
};

/// Reference store implementation. Cheap to construct, cheap to clone;
/// serializable as a whole for snapshot backup (see [`crate::save_snapshot`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStore {
    profiles: Vec<Profile>,
    stocks: Vec<Stock>,
    transactions: Vec<Transaction>,
    holdings: Vec<Holding>,
    allocations: Vec<SaleAllocation>,
    next_profile_id: i64,
    next_stock_id: i64,
    next_transaction_id: i64,
    next_holding_id: i64,
    next_allocation_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock ids belonging to a profile, used by the cascade paths.
    fn stock_ids_of_profile(&self, profile_id: i64) -> Vec<i64> {
        self.stocks
            .iter()
            .filter(|s| s.profile_id == profile_id)
            .map(|s| s.id)
            .collect()
    }

    /// Stock id that a transaction belongs to, if the transaction exists.
    fn stock_of_transaction(&self, transaction_id: i64) -> Option<i64> {
        self.transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .map(|t| t.stock_id)
    }

    fn cascade_delete_stock(&mut self, stock_id: i64) {
        let tx_ids: Vec<i64> = self
            .transactions
            .iter()
            .filter(|t| t.stock_id == stock_id)
            .map(|t| t.id)
            .collect();
        self.allocations.retain(|a| {
            !tx_ids.contains(&a.sell_transaction_id) && !tx_ids.contains(&a.buy_transaction_id)
        });
        self.holdings.retain(|h| h.stock_id != stock_id);
        self.transactions.retain(|t| t.stock_id != stock_id);
        self.stocks.retain(|s| s.id != stock_id);
    }
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

impl ProfileStore for MemoryStore {
    fn insert_profile(&mut self, profile: NewProfile) -> Result<i64, StoreError> {
        let id = next_id(&mut self.next_profile_id);
        self.profiles.push(Profile {
            id,
            name: profile.name,
            currency: profile.currency,
            created_at: profile.created_at,
            is_active: false,
        });
        Ok(id)
    }

    fn profile(&self, id: i64) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }

    fn profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let mut out = self.profiles.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn active_profile(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.iter().find(|p| p.is_active).cloned())
    }

    fn update_profile(&mut self, profile: &Profile) -> Result<(), StoreError> {
        match self.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(row) => {
                *row = profile.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "profile",
                id: profile.id,
            }),
        }
    }

    fn delete_profile(&mut self, id: i64) -> Result<(), StoreError> {
        if !self.profiles.iter().any(|p| p.id == id) {
            return Err(StoreError::NotFound {
                entity: "profile",
                id,
            });
        }
        for stock_id in self.stock_ids_of_profile(id) {
            self.cascade_delete_stock(stock_id);
        }
        self.profiles.retain(|p| p.id != id);
        Ok(())
    }

    fn deactivate_all_profiles(&mut self) -> Result<(), StoreError> {
        for p in &mut self.profiles {
            p.is_active = false;
        }
        Ok(())
    }

    fn set_active_profile(&mut self, id: i64) -> Result<(), StoreError> {
        match self.profiles.iter_mut().find(|p| p.id == id) {
            Some(row) => {
                row.is_active = true;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "profile",
                id,
            }),
        }
    }

    fn profile_count(&self) -> Result<usize, StoreError> {
        Ok(self.profiles.len())
    }
}

// ---------------------------------------------------------------------------
// StockStore
// ---------------------------------------------------------------------------

impl StockStore for MemoryStore {
    fn insert_stock(&mut self, stock: NewStock) -> Result<i64, StoreError> {
        let id = next_id(&mut self.next_stock_id);
        self.stocks.push(Stock {
            id,
            profile_id: stock.profile_id,
            symbol: stock.symbol,
            name: stock.name,
            zakat_rate_pct: stock.zakat_rate_pct,
            notes: stock.notes,
            created_at: stock.created_at,
        });
        Ok(id)
    }

    fn stock(&self, id: i64) -> Result<Option<Stock>, StoreError> {
        Ok(self.stocks.iter().find(|s| s.id == id).cloned())
    }

    fn stocks_for_profile(&self, profile_id: i64) -> Result<Vec<Stock>, StoreError> {
        let mut out: Vec<Stock> = self
            .stocks
            .iter()
            .filter(|s| s.profile_id == profile_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn stock_by_symbol(&self, profile_id: i64, symbol: &str) -> Result<Option<Stock>, StoreError> {
        Ok(self
            .stocks
            .iter()
            .find(|s| s.profile_id == profile_id && s.symbol == symbol)
            .cloned())
    }

    fn search_stocks(&self, profile_id: i64, query: &str) -> Result<Vec<Stock>, StoreError> {
        let needle = query.to_lowercase();
        let mut out: Vec<Stock> = self
            .stocks
            .iter()
            .filter(|s| {
                s.profile_id == profile_id
                    && (s.symbol.to_lowercase().contains(&needle)
                        || s.name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn update_stock(&mut self, stock: &Stock) -> Result<(), StoreError> {
        match self.stocks.iter_mut().find(|s| s.id == stock.id) {
            Some(row) => {
                *row = stock.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "stock",
                id: stock.id,
            }),
        }
    }

    fn delete_stock(&mut self, id: i64) -> Result<(), StoreError> {
        if !self.stocks.iter().any(|s| s.id == id) {
            return Err(StoreError::NotFound { entity: "stock", id });
        }
        self.cascade_delete_stock(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TransactionStore
// ---------------------------------------------------------------------------

impl TransactionStore for MemoryStore {
    fn insert_transaction(&mut self, tx: NewTransaction) -> Result<i64, StoreError> {
        let id = next_id(&mut self.next_transaction_id);
        self.transactions.push(Transaction {
            id,
            stock_id: tx.stock_id,
            side: tx.side,
            quantity: tx.quantity,
            price_per_unit: tx.price_per_unit,
            commission: tx.commission,
            date: tx.date,
            notes: tx.notes,
        });
        Ok(id)
    }

    fn transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        Ok(self.transactions.iter().find(|t| t.id == id).cloned())
    }

    fn transactions_for_stock(&self, stock_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.stock_id == stock_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn transactions_for_profile(&self, profile_id: i64) -> Result<Vec<Transaction>, StoreError> {
        let stock_ids = self.stock_ids_of_profile(profile_id);
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| stock_ids.contains(&t.stock_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn transactions_in_range(
        &self,
        stock_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut out: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.stock_id == stock_id && t.date >= from && t.date <= to)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn delete_transaction(&mut self, id: i64) -> Result<(), StoreError> {
        if !self.transactions.iter().any(|t| t.id == id) {
            return Err(StoreError::NotFound {
                entity: "transaction",
                id,
            });
        }
        // Same cascade edges as the relational schema: allocations drop on
        // either side, the originated lot drops with its buy.
        self.allocations
            .retain(|a| a.sell_transaction_id != id && a.buy_transaction_id != id);
        self.holdings.retain(|h| h.buy_transaction_id != id);
        self.transactions.retain(|t| t.id != id);
        Ok(())
    }

    fn total_bought(&self, stock_id: i64) -> Result<f64, StoreError> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.stock_id == stock_id && t.side.is_buy())
            .map(|t| t.quantity)
            .sum())
    }

    fn total_sold(&self, stock_id: i64) -> Result<f64, StoreError> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.stock_id == stock_id && t.side.is_sell())
            .map(|t| t.quantity)
            .sum())
    }
}

// ---------------------------------------------------------------------------
// HoldingStore
// ---------------------------------------------------------------------------

impl HoldingStore for MemoryStore {
    fn insert_holding(&mut self, holding: NewHolding) -> Result<i64, StoreError> {
        let id = next_id(&mut self.next_holding_id);
        self.holdings.push(Holding {
            id,
            stock_id: holding.stock_id,
            buy_transaction_id: holding.buy_transaction_id,
            original_quantity: holding.original_quantity,
            remaining_quantity: holding.remaining_quantity,
            buy_price: holding.buy_price,
            buy_date: holding.buy_date,
        });
        Ok(id)
    }

    fn holding(&self, id: i64) -> Result<Option<Holding>, StoreError> {
        Ok(self.holdings.iter().find(|h| h.id == id).cloned())
    }

    fn open_holdings(&self, stock_id: i64) -> Result<Vec<Holding>, StoreError> {
        let mut out: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|h| h.stock_id == stock_id && h.remaining_quantity > 0.0)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.buy_date.cmp(&b.buy_date).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn all_holdings(&self, stock_id: i64) -> Result<Vec<Holding>, StoreError> {
        let mut out: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|h| h.stock_id == stock_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.buy_date.cmp(&b.buy_date).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    fn holding_for_buy(&self, buy_transaction_id: i64) -> Result<Option<Holding>, StoreError> {
        Ok(self
            .holdings
            .iter()
            .find(|h| h.buy_transaction_id == buy_transaction_id)
            .cloned())
    }

    fn update_holding(&mut self, holding: &Holding) -> Result<(), StoreError> {
        match self.holdings.iter_mut().find(|h| h.id == holding.id) {
            Some(row) => {
                *row = holding.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: "holding",
                id: holding.id,
            }),
        }
    }

    fn delete_holding_for_buy(&mut self, buy_transaction_id: i64) -> Result<(), StoreError> {
        let before = self.holdings.len();
        self.holdings
            .retain(|h| h.buy_transaction_id != buy_transaction_id);
        if self.holdings.len() == before {
            return Err(StoreError::NotFound {
                entity: "holding for buy transaction",
                id: buy_transaction_id,
            });
        }
        Ok(())
    }

    fn total_remaining(&self, stock_id: i64) -> Result<f64, StoreError> {
        Ok(self
            .holdings
            .iter()
            .filter(|h| h.stock_id == stock_id)
            .map(|h| h.remaining_quantity)
            .sum())
    }

    fn average_open_buy_price(&self, stock_id: i64) -> Result<Option<f64>, StoreError> {
        let open: Vec<&Holding> = self
            .holdings
            .iter()
            .filter(|h| h.stock_id == stock_id && h.remaining_quantity > 0.0)
            .collect();
        let qty: f64 = open.iter().map(|h| h.remaining_quantity).sum();
        if qty <= 0.0 {
            return Ok(None);
        }
        let cost: f64 = open.iter().map(|h| h.remaining_quantity * h.buy_price).sum();
        Ok(Some(cost / qty))
    }
}

// ---------------------------------------------------------------------------
// AllocationStore
// ---------------------------------------------------------------------------

impl AllocationStore for MemoryStore {
    fn insert_allocations(&mut self, allocations: &[NewAllocation]) -> Result<(), StoreError> {
        for a in allocations {
            let id = next_id(&mut self.next_allocation_id);
            self.allocations.push(SaleAllocation {
                id,
                sell_transaction_id: a.sell_transaction_id,
                buy_transaction_id: a.buy_transaction_id,
                quantity: a.quantity,
                buy_price: a.buy_price,
                sell_price: a.sell_price,
                profit: a.profit,
            });
        }
        Ok(())
    }

    fn allocations_for_sell(
        &self,
        sell_transaction_id: i64,
    ) -> Result<Vec<SaleAllocation>, StoreError> {
        Ok(self
            .allocations
            .iter()
            .filter(|a| a.sell_transaction_id == sell_transaction_id)
            .cloned()
            .collect())
    }

    fn allocations_for_buy(
        &self,
        buy_transaction_id: i64,
    ) -> Result<Vec<SaleAllocation>, StoreError> {
        Ok(self
            .allocations
            .iter()
            .filter(|a| a.buy_transaction_id == buy_transaction_id)
            .cloned()
            .collect())
    }

    fn delete_allocations_for_sell(&mut self, sell_transaction_id: i64) -> Result<(), StoreError> {
        self.allocations
            .retain(|a| a.sell_transaction_id != sell_transaction_id);
        Ok(())
    }

    fn realized_profit_for_stock(&self, stock_id: i64) -> Result<f64, StoreError> {
        Ok(self
            .allocations
            .iter()
            .filter(|a| self.stock_of_transaction(a.sell_transaction_id) == Some(stock_id))
            .map(|a| a.profit)
            .sum())
    }

    fn realized_profit_for_profile(&self, profile_id: i64) -> Result<f64, StoreError> {
        let stock_ids = self.stock_ids_of_profile(profile_id);
        Ok(self
            .allocations
            .iter()
            .filter(|a| {
                self.stock_of_transaction(a.sell_transaction_id)
                    .map(|sid| stock_ids.contains(&sid))
                    .unwrap_or(false)
            })
            .map(|a| a.profit)
            .sum())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
