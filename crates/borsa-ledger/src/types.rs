use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use borsa_schemas::NewAllocation;

/// Caller intent for one buy or one sell. The side is chosen by the
/// [`Ledger`](crate::Ledger) method it is handed to.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeRequest {
    pub stock_id: i64,
    pub quantity: f64,
    pub price_per_unit: f64,
    pub commission: f64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TradeRequest {
    pub fn new(stock_id: i64, quantity: f64, price_per_unit: f64, date: DateTime<Utc>) -> Self {
        Self {
            stock_id,
            quantity,
            price_per_unit,
            commission: 0.0,
            date,
            notes: None,
        }
    }

    pub fn with_commission(mut self, commission: f64) -> Self {
        self.commission = commission;
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The computed outcome of partitioning one sell across open lots.
///
/// `total_revenue = quantity × price_per_unit`,
/// `total_cost    = Σ allocation.quantity × allocation.buy_price`,
/// `gross_profit  = total_revenue − total_cost`,
/// `net_profit    = gross_profit − commission`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitCalculation {
    pub gross_profit: f64,
    pub net_profit: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub commission: f64,
    pub allocations: Vec<NewAllocation>,
}

impl ProfitCalculation {
    /// Quantity covered by the emitted allocations.
    pub fn allocated_quantity(&self) -> f64 {
        self.allocations.iter().map(|a| a.quantity).sum()
    }
}

/// Result of a recorded sell: the persisted transaction id plus the
/// profit breakdown that was booked for it.
#[derive(Clone, Debug, PartialEq)]
pub struct SellReceipt {
    pub transaction_id: i64,
    pub profit: ProfitCalculation,
}
