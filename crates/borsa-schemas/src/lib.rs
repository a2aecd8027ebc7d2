//! borsa-schemas
//!
//! Persisted entity types shared by every crate in the workspace.
//! Plain data, no behavior beyond trivial accessors. Stores assign the
//! `id` fields; the `New*` forms are the insertion payloads without an id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// BUY or SELL for recorded transactions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }

    pub fn is_sell(self) -> bool {
        matches!(self, Side::Sell)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// An investor profile. Profiles partition stocks and their ledgers;
/// at most one profile is active at a time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    /// ISO currency code used for display and export (e.g. "USD").
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// A tracked instrument, scoped to one profile.
///
/// `symbol` is unique within a profile and stored uppercased.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub profile_id: i64,
    pub symbol: String,
    pub name: String,
    /// Annual zakat levy as a percentage of current holding value.
    pub zakat_rate_pct: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewStock {
    pub profile_id: i64,
    pub symbol: String,
    pub name: String,
    pub zakat_rate_pct: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An append-only record of user intent: one buy or one sell.
///
/// Quantities and prices are IEEE-754 doubles; nothing in the core rounds
/// them. Formatting for display happens at the presentation edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub stock_id: i64,
    pub side: Side,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub commission: f64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub stock_id: i64,
    pub side: Side,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub commission: f64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// One purchase lot: the unconsumed inventory left from a single buy.
///
/// Created 1:1 with a buy transaction. `remaining_quantity` is the only
/// mutable field and is owned by the ledger:
/// `0 <= remaining_quantity <= original_quantity` always holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub id: i64,
    pub stock_id: i64,
    pub buy_transaction_id: i64,
    pub original_quantity: f64,
    pub remaining_quantity: f64,
    pub buy_price: f64,
    pub buy_date: DateTime<Utc>,
}

impl Holding {
    /// A lot with nothing left to consume.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_quantity <= 0.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewHolding {
    pub stock_id: i64,
    pub buy_transaction_id: i64,
    pub original_quantity: f64,
    pub remaining_quantity: f64,
    pub buy_price: f64,
    pub buy_date: DateTime<Utc>,
}

/// The atomic result of matching part of one sell against part of one lot.
///
/// Immutable once written; removed only when the owning sell is reversed
/// or the referenced rows are cascade-deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleAllocation {
    pub id: i64,
    pub sell_transaction_id: i64,
    pub buy_transaction_id: i64,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewAllocation {
    pub sell_transaction_id: i64,
    pub buy_transaction_id: i64,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub profit: f64,
}
