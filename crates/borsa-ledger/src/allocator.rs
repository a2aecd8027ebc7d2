//! FIFO allocator.
//!
//! Responsibilities (pure, no IO, no store access):
//! - Accept one sell transaction and the open lots of the same stock.
//! - Partition the sale across lots in purchase order, oldest first.
//! - Emit one allocation per consumed lot with the realized profit on
//!   that portion, plus the aggregate profit breakdown.
//!
//! Design notes:
//! - The allocator never mutates lots; applying the returned deductions
//!   to the store is the caller's job (see [`Ledger`](crate::Ledger)).
//! - Consumption order is `(buy_date, lot id)` ascending. The id
//!   tie-break makes same-day allocation reproducible: which lots absorb
//!   a sale changes the realized profit that gets reported, so the order
//!   cannot be left to chance.
//! - Lots arrive pre-filtered to `remaining_quantity > 0`; a zero lot
//!   that slips through is skipped, never allocated against.
//! - Aggregate sufficiency is checked up front so a failed sell emits
//!   zero allocations.

use borsa_schemas::{Holding, NewAllocation, Transaction};

use crate::types::ProfitCalculation;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejections produced while allocating a sell.
#[derive(Clone, Debug, PartialEq)]
pub enum AllocationError {
    /// Sell quantity must be strictly positive.
    NonPositiveQuantity { quantity: f64 },
    /// Sell price must be strictly positive.
    NonPositivePrice { price: f64 },
    /// Commission must be non-negative.
    NegativeCommission { commission: f64 },
    /// A quantity, price or commission is NaN or infinite.
    NonFiniteInput { field: &'static str },
    /// Open lots cover less than the requested quantity.
    InsufficientHoldings { available: f64, requested: f64 },
}

impl std::fmt::Display for AllocationError {
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
            Self::NonFiniteInput { field } => {
                write!(f, "{field} must be a finite number")
            }
            Self::InsufficientHoldings {
                available,
                requested,
            } => write!(
                f,
                "insufficient holdings: available {available}, trying to sell {requested}"
            ),
        }
    }
}

impl std::error::Error for AllocationError {}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Partition `sell` across `open_lots`, oldest purchase first.
///
/// # Algorithm
///
/// 1. Guard the sell inputs (positive quantity/price, non-negative
///    commission, everything finite).
/// 2. Check aggregate sufficiency: `Σ remaining_quantity ≥ sell.quantity`,
///    else [`AllocationError::InsufficientHoldings`] with both figures.
/// 3. Sort lots by `(buy_date, id)` ascending.
/// 4. Walk the sorted lots consuming
///    `min(remaining_to_sell, lot.remaining_quantity)` from each; emit one
///    allocation per non-zero consumption with
///    `profit = (sell_price − buy_price) × consumed`.
/// 5. Total it up: revenue from the sell, cost from the allocations.
///
/// At most one allocation is emitted per lot, and no lot is visited twice.
/// The per-lot `min` telescopes, so the emitted quantities sum to exactly
/// `sell.quantity` whenever step 2 passed.
pub fn allocate(
    sell: &Transaction,
    open_lots: &[Holding],
) -> Result<ProfitCalculation, AllocationError> {
    validate_sell(sell)?;

    let available: f64 = open_lots.iter().map(|h| h.remaining_quantity).sum();
    if sell.quantity > available {
        return Err(AllocationError::InsufficientHoldings {
            available,
            requested: sell.quantity,
        });
    }

    let mut lots: Vec<&Holding> = open_lots.iter().collect();
    lots.sort_by(|a, b| a.buy_date.cmp(&b.buy_date).then(a.id.cmp(&b.id)));

    let mut remaining_to_sell = sell.quantity;
    let mut allocations: Vec<NewAllocation> = Vec::new();
    let mut total_cost = 0.0;

    for lot in lots {
        if remaining_to_sell <= 0.0 {
            break;
        }

        let consumed = remaining_to_sell.min(lot.remaining_quantity);
        if consumed <= 0.0 {
            continue;
        }

        total_cost += consumed * lot.buy_price;
        allocations.push(NewAllocation {
            sell_transaction_id: sell.id,
            buy_transaction_id: lot.buy_transaction_id,
            quantity: consumed,
            buy_price: lot.buy_price,
            sell_price: sell.price_per_unit,
            profit: (sell.price_per_unit - lot.buy_price) * consumed,
        });
        remaining_to_sell -= consumed;
    }

    let total_revenue = sell.quantity * sell.price_per_unit;
    let gross_profit = total_revenue - total_cost;
    let net_profit = gross_profit - sell.commission;

    Ok(ProfitCalculation {
        gross_profit,
        net_profit,
        total_cost,
        total_revenue,
        commission: sell.commission,
        allocations,
    })
}

fn validate_sell(sell: &Transaction) -> Result<(), AllocationError> {
    if !sell.quantity.is_finite() {
        return Err(AllocationError::NonFiniteInput { field: "quantity" });
    }
    if !sell.price_per_unit.is_finite() {
        return Err(AllocationError::NonFiniteInput {
            field: "price per unit",
        });
    }
    if !sell.commission.is_finite() {
        return Err(AllocationError::NonFiniteInput {
            field: "commission",
        });
    }
    if sell.quantity <= 0.0 {
        return Err(AllocationError::NonPositiveQuantity {
            quantity: sell.quantity,
        });
    }
    if sell.price_per_unit <= 0.0 {
        return Err(AllocationError::NonPositivePrice {
            price: sell.price_per_unit,
        });
    }
    if sell.commission < 0.0 {
        return Err(AllocationError::NegativeCommission {
            commission: sell.commission,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
