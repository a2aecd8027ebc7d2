//! Lot ledger — owns every mutation of lot inventory.
//!
//! # Purpose
//! [`allocator`](crate::allocator) contains the raw FIFO mechanics. This
//! module wraps them behind a [`Ledger`] service that:
//!
//! - Enforces input invariants on every booking (no zero/negative
//!   quantity or price, no negative commission, nothing non-finite).
//! - Validates aggregate sufficiency *before* anything is persisted, so a
//!   rejected sell leaves no partial state behind.
//! - Applies allocator output to the store as one all-or-nothing unit and
//!   rolls back on a mid-apply failure.
//! - Runs the same accounting in reverse when a transaction is deleted,
//!   and recomputes it from scratch when one is edited (`rebook`).
//!
//! # Single writer
//! Every mutating method takes `&mut self`, so one `Ledger` value cannot
//! interleave two read-validate-mutate sequences. Callers that share a
//! store across threads put the whole `Ledger` behind their own lock.

use borsa_schemas::{NewAllocation, NewHolding, NewTransaction, Side, Transaction};
use borsa_store::{AllocationStore, HoldingStore, StoreError, TransactionStore};

use crate::allocator::{allocate, AllocationError};
use crate::types::{SellReceipt, TradeRequest};

/// Tolerance for the dust a subtract-then-add roundtrip can leave on an
/// f64 quantity. Anything past this is a real invariant breach.
const QTY_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// All failures the ledger can surface. The store is never left with
/// partial state when one of these is returned.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerError {
    /// Quantity must be strictly positive.
    NonPositiveQuantity { quantity: f64 },
    /// Price per unit must be strictly positive.
    NonPositivePrice { price: f64 },
    /// Commission must be non-negative.
    NegativeCommission { commission: f64 },
    /// A quantity, price or commission is NaN or infinite.
    NonFiniteInput { field: &'static str },
    /// Sell quantity exceeds the aggregate open-lot quantity.
    InsufficientHoldings { available: f64, requested: f64 },
    /// A referenced row was absent; the operation did nothing.
    NotFound { entity: &'static str, id: i64 },
    /// The buy's lot has been (partially) consumed by recorded sells;
    /// reversing it would break quantity conservation.
    LotConsumed {
        buy_transaction_id: i64,
        allocated_quantity: f64,
    },
    /// A lot mutation would violate
    /// `0 <= remaining_quantity <= original_quantity`. Cannot happen when
    /// validation precedes allocation; detected and reported anyway.
    InconsistentState {
        holding_id: i64,
        remaining: f64,
        requested: f64,
    },
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveQuantity { quantity } => {
                write!(f, "quantity must be > 0, got {quantity}")
            }
            Self::NonPositivePrice { price } => {
                write!(f, "price per unit must be > 0, got {price}")
            }
            Self::NegativeCommission { commission } => {
                write!(f, "commission must be >= 0, got {commission}")
            }
            Self::NonFiniteInput { field } => write!(f, "{field} must be a finite number"),
            Self::InsufficientHoldings {
                available,
                requested,
            } => write!(
                f,
                "insufficient holdings: available {available}, trying to sell {requested}"
            ),
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::LotConsumed {
                buy_transaction_id,
                allocated_quantity,
            } => write!(
                f,
                "buy transaction {buy_transaction_id} has {allocated_quantity} units \
                 already allocated to sells; reverse those sells first"
            ),
            Self::InconsistentState {
                holding_id,
                remaining,
                requested,
            } => write!(
                f,
                "lot {holding_id} invariant breach: remaining {remaining}, requested {requested}"
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => LedgerError::NotFound { entity, id },
        }
    }
}

impl From<AllocationError> for LedgerError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::NonPositiveQuantity { quantity } => {
                LedgerError::NonPositiveQuantity { quantity }
            }
            AllocationError::NonPositivePrice { price } => LedgerError::NonPositivePrice { price },
            AllocationError::NegativeCommission { commission } => {
                LedgerError::NegativeCommission { commission }
            }
            AllocationError::NonFiniteInput { field } => LedgerError::NonFiniteInput { field },
            AllocationError::InsufficientHoldings {
                available,
                requested,
            } => LedgerError::InsufficientHoldings {
                available,
                requested,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Transaction-recording service over an injected store handle.
///
/// Owns the store for its lifetime; read layers borrow it back through
/// [`Ledger::store`].
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
}

impl<S> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read-only access for query layers.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access for collaborating services that own other tables
    /// (profiles, stocks, snapshots). Lot inventory is still mutated only
    /// through the ledger methods.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> Ledger<S>
where
    S: TransactionStore + HoldingStore + AllocationStore,
{
    /// Record a buy and open its lot (always 1:1).
    ///
    /// # Errors
    /// Returns [`LedgerError`] if an input invariant fails; nothing is
    /// persisted in that case.
    pub fn record_buy(&mut self, req: &TradeRequest) -> Result<i64, LedgerError> {
        validate_request(req)?;

        let tx_id = self.store.insert_transaction(NewTransaction {
            stock_id: req.stock_id,
            side: Side::Buy,
            quantity: req.quantity,
            price_per_unit: req.price_per_unit,
            commission: req.commission,
            date: req.date,
            notes: req.notes.clone(),
        })?;

        if let Err(e) = self.store.insert_holding(NewHolding {
            stock_id: req.stock_id,
            buy_transaction_id: tx_id,
            original_quantity: req.quantity,
            remaining_quantity: req.quantity,
            buy_price: req.price_per_unit,
            buy_date: req.date,
        }) {
            self.store.delete_transaction(tx_id)?;
            return Err(e.into());
        }

        tracing::debug!(
            stock_id = req.stock_id,
            transaction_id = tx_id,
            quantity = req.quantity,
            price = req.price_per_unit,
            "buy recorded"
        );
        Ok(tx_id)
    }

    /// Record a sell: validate, persist, allocate FIFO, deduct lots,
    /// persist allocations.
    ///
    /// The lot deductions are all-or-nothing: a failure while applying
    /// them restores every lot already touched and removes the sell row,
    /// so no partial allocation state is ever observable.
    pub fn record_sell(&mut self, req: &TradeRequest) -> Result<SellReceipt, LedgerError> {
        validate_request(req)?;

        let open = self.store.open_holdings(req.stock_id)?;
        let available: f64 = open.iter().map(|h| h.remaining_quantity).sum();
        if req.quantity > available {
            return Err(LedgerError::InsufficientHoldings {
                available,
                requested: req.quantity,
            });
        }

        let tx_id = self.store.insert_transaction(NewTransaction {
            stock_id: req.stock_id,
            side: Side::Sell,
            quantity: req.quantity,
            price_per_unit: req.price_per_unit,
            commission: req.commission,
            date: req.date,
            notes: req.notes.clone(),
        })?;
        let sell = Transaction {
            id: tx_id,
            stock_id: req.stock_id,
            side: Side::Sell,
            quantity: req.quantity,
            price_per_unit: req.price_per_unit,
            commission: req.commission,
            date: req.date,
            notes: req.notes.clone(),
        };

        let calc = match allocate(&sell, &open) {
            Ok(calc) => calc,
            Err(e) => {
                self.store.delete_transaction(tx_id)?;
                return Err(e.into());
            }
        };

        if let Err(e) = self.apply_deductions(&calc.allocations) {
            self.store.delete_transaction(tx_id)?;
            return Err(e);
        }
        self.store.insert_allocations(&calc.allocations)?;

        tracing::info!(
            stock_id = req.stock_id,
            transaction_id = tx_id,
            quantity = req.quantity,
            lots = calc.allocations.len(),
            net_profit = calc.net_profit,
            "sell recorded"
        );
        Ok(SellReceipt {
            transaction_id: tx_id,
            profit: calc,
        })
    }

    /// Reverse a recorded sell: every consumed lot gets its quantity
    /// back (a fully exhausted lot reopens), then the allocations and the
    /// sell row are removed.
    pub fn reverse_sell(&mut self, sell_transaction_id: i64) -> Result<(), LedgerError> {
        let tx = self.fetch_side(sell_transaction_id, Side::Sell)?;

        let allocations = self.store.allocations_for_sell(sell_transaction_id)?;
        for a in &allocations {
            self.restore_lot(a)?;
        }
        self.store
            .delete_allocations_for_sell(sell_transaction_id)?;
        self.store.delete_transaction(sell_transaction_id)?;

        tracing::info!(
            stock_id = tx.stock_id,
            transaction_id = sell_transaction_id,
            lots = allocations.len(),
            "sell reversed"
        );
        Ok(())
    }

    /// Reverse a recorded buy by deleting its lot and the transaction.
    ///
    /// Refused with [`LedgerError::LotConsumed`] while any allocation
    /// still references the lot: removing it would subtract inventory
    /// that recorded sells have already been matched against. Reverse the
    /// dependent sells first.
    pub fn reverse_buy(&mut self, buy_transaction_id: i64) -> Result<(), LedgerError> {
        let tx = self.fetch_side(buy_transaction_id, Side::Buy)?;

        let allocations = self.store.allocations_for_buy(buy_transaction_id)?;
        if !allocations.is_empty() {
            return Err(LedgerError::LotConsumed {
                buy_transaction_id,
                allocated_quantity: allocations.iter().map(|a| a.quantity).sum(),
            });
        }

        self.store.delete_holding_for_buy(buy_transaction_id)?;
        self.store.delete_transaction(buy_transaction_id)?;

        tracing::info!(
            stock_id = tx.stock_id,
            transaction_id = buy_transaction_id,
            "buy reversed"
        );
        Ok(())
    }

    /// Reverse either side of a transaction by id.
    pub fn reverse(&mut self, transaction_id: i64) -> Result<(), LedgerError> {
        let tx = self
            .store
            .transaction(transaction_id)?
            .ok_or(LedgerError::NotFound {
                entity: "transaction",
                id: transaction_id,
            })?;
        match tx.side {
            Side::Buy => self.reverse_buy(transaction_id),
            Side::Sell => self.reverse_sell(transaction_id),
        }
    }

    /// Edit a transaction by reversing it and booking it again with new
    /// parameters. FIFO allocation is order- and value-sensitive, so the
    /// figures are recomputed from scratch — never patched in place.
    ///
    /// Returns the id of the replacement transaction. If the new booking
    /// is rejected (e.g. shrinking holdings below a later sell), the
    /// original is booked back before the error is returned.
    pub fn rebook(
        &mut self,
        transaction_id: i64,
        req: &TradeRequest,
    ) -> Result<i64, LedgerError> {
        validate_request(req)?;

        let old = self
            .store
            .transaction(transaction_id)?
            .ok_or(LedgerError::NotFound {
                entity: "transaction",
                id: transaction_id,
            })?;
        self.reverse(transaction_id)?;

        let rebooked = match old.side {
            Side::Buy => self.record_buy(req),
            Side::Sell => self.record_sell(req).map(|r| r.transaction_id),
        };

        match rebooked {
            Ok(new_id) => {
                tracing::debug!(
                    old_id = transaction_id,
                    new_id,
                    side = %old.side,
                    "transaction rebooked"
                );
                Ok(new_id)
            }
            Err(e) => {
                // Put the original booking back so the edit is a no-op.
                let restore = TradeRequest {
                    stock_id: old.stock_id,
                    quantity: old.quantity,
                    price_per_unit: old.price_per_unit,
                    commission: old.commission,
                    date: old.date,
                    notes: old.notes.clone(),
                };
                match old.side {
                    Side::Buy => {
                        self.record_buy(&restore)?;
                    }
                    Side::Sell => {
                        self.record_sell(&restore)?;
                    }
                }
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn fetch_side(&self, transaction_id: i64, side: Side) -> Result<Transaction, LedgerError> {
        let entity = match side {
            Side::Buy => "buy transaction",
            Side::Sell => "sell transaction",
        };
        let tx = self
            .store
            .transaction(transaction_id)?
            .ok_or(LedgerError::NotFound {
                entity,
                id: transaction_id,
            })?;
        if tx.side != side {
            return Err(LedgerError::NotFound {
                entity,
                id: transaction_id,
            });
        }
        Ok(tx)
    }

    /// Apply every deduction or none: on failure, lots already reduced
    /// are restored before the error propagates.
    fn apply_deductions(&mut self, allocations: &[NewAllocation]) -> Result<(), LedgerError> {
        let mut applied: Vec<(i64, f64)> = Vec::new();
        for a in allocations {
            match self.deduct_lot(a) {
                Ok(holding_id) => applied.push((holding_id, a.quantity)),
                Err(e) => {
                    for (holding_id, qty) in applied.into_iter().rev() {
                        if let Ok(Some(mut h)) = self.store.holding(holding_id) {
                            h.remaining_quantity += qty;
                            let _ = self.store.update_holding(&h);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn deduct_lot(&mut self, a: &NewAllocation) -> Result<i64, LedgerError> {
        let mut holding = self
            .store
            .holding_for_buy(a.buy_transaction_id)?
            .ok_or(LedgerError::NotFound {
                entity: "holding for buy transaction",
                id: a.buy_transaction_id,
            })?;
        if a.quantity > holding.remaining_quantity {
            return Err(LedgerError::InconsistentState {
                holding_id: holding.id,
                remaining: holding.remaining_quantity,
                requested: a.quantity,
            });
        }
        holding.remaining_quantity -= a.quantity;
        self.store.update_holding(&holding)?;
        Ok(holding.id)
    }

    fn restore_lot(&mut self, a: &borsa_schemas::SaleAllocation) -> Result<(), LedgerError> {
        let mut holding = self
            .store
            .holding_for_buy(a.buy_transaction_id)?
            .ok_or(LedgerError::NotFound {
                entity: "holding for buy transaction",
                id: a.buy_transaction_id,
            })?;
        let restored = holding.remaining_quantity + a.quantity;
        if restored > holding.original_quantity + QTY_EPSILON {
            return Err(LedgerError::InconsistentState {
                holding_id: holding.id,
                remaining: holding.remaining_quantity,
                requested: a.quantity,
            });
        }
        holding.remaining_quantity = restored;
        self.store.update_holding(&holding)?;
        Ok(())
    }
}

fn validate_request(req: &TradeRequest) -> Result<(), LedgerError> {
    if !req.quantity.is_finite() {
        return Err(LedgerError::NonFiniteInput { field: "quantity" });
    }
    if !req.price_per_unit.is_finite() {
        return Err(LedgerError::NonFiniteInput {
            field: "price per unit",
        });
    }
    if !req.commission.is_finite() {
        return Err(LedgerError::NonFiniteInput {
            field: "commission",
        });
    }
    if req.quantity <= 0.0 {
        return Err(LedgerError::NonPositiveQuantity {
            quantity: req.quantity,
        });
    }
    if req.price_per_unit <= 0.0 {
        return Err(LedgerError::NonPositivePrice {
            price: req.price_per_unit,
        });
    }
    if req.commission < 0.0 {
        return Err(LedgerError::NegativeCommission {
            commission: req.commission,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
