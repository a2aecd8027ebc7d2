//! Portfolio figures derived from the store.
//!
//! Realized profit comes from persisted allocations; everything valued at
//! market uses the caller-supplied price map. A stock with no entry in the
//! map is simply skipped by valuation queries — exactly what a UI does
//! when a quote is missing.

use std::collections::BTreeMap;

use borsa_store::{
    AllocationStore, HoldingStore, ProfileStore, StockStore, StoreError, TransactionStore,
};

/// Current prices keyed by stock id.
pub type PriceMap = BTreeMap<i64, f64>;

/// Helper to build a [`PriceMap`] with minimal boilerplate.
pub fn prices<I>(items: I) -> PriceMap
where
    I: IntoIterator<Item = (i64, f64)>,
{
    items.into_iter().collect()
}

/// Lifetime figures for one stock.
#[derive(Clone, Debug, PartialEq)]
pub struct StockPerformance {
    pub total_bought: f64,
    pub total_sold: f64,
    pub remaining_quantity: f64,
    /// Remaining-quantity-weighted open buy price; 0 when flat.
    pub average_buy_price: f64,
    pub realized_profit: f64,
}

/// Profile-level roll-up, shaped for the summary export.
#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSummary {
    pub total_invested: f64,
    pub portfolio_value: f64,
    pub realized_profit: f64,
    pub unrealized_profit: f64,
    pub total_profit: f64,
    pub return_pct: f64,
    pub stock_count: usize,
    pub zakat_due: f64,
    pub currency: String,
}

/// Realized profit booked across every stock of the profile.
pub fn realized_profit<S: AllocationStore>(store: &S, profile_id: i64) -> Result<f64, StoreError> {
    store.realized_profit_for_profile(profile_id)
}

/// Paper gain/loss on open inventory: `(price − avg buy) × remaining`
/// summed over stocks that have a quote.
pub fn unrealized_profit<S: StockStore + HoldingStore>(
    store: &S,
    profile_id: i64,
    current: &PriceMap,
) -> Result<f64, StoreError> {
    let mut total = 0.0;
    for stock in store.stocks_for_profile(profile_id)? {
        let Some(price) = current.get(&stock.id) else {
            continue;
        };
        let quantity = store.total_remaining(stock.id)?;
        let avg = store.average_open_buy_price(stock.id)?.unwrap_or(0.0);
        total += (price - avg) * quantity;
    }
    Ok(total)
}

/// Market value of all open inventory with a quote.
pub fn portfolio_value<S: StockStore + HoldingStore>(
    store: &S,
    profile_id: i64,
    current: &PriceMap,
) -> Result<f64, StoreError> {
    let mut total = 0.0;
    for stock in store.stocks_for_profile(profile_id)? {
        let Some(price) = current.get(&stock.id) else {
            continue;
        };
        total += price * store.total_remaining(stock.id)?;
    }
    Ok(total)
}

/// Open cost basis: `Σ remaining × buy price` over every open lot.
pub fn total_invested<S: StockStore + HoldingStore>(
    store: &S,
    profile_id: i64,
) -> Result<f64, StoreError> {
    let mut total = 0.0;
    for stock in store.stocks_for_profile(profile_id)? {
        for lot in store.open_holdings(stock.id)? {
            total += lot.remaining_quantity * lot.buy_price;
        }
    }
    Ok(total)
}

/// Annual zakat liability: each stock's current value times its own rate.
pub fn zakat_due<S: StockStore + HoldingStore>(
    store: &S,
    profile_id: i64,
    current: &PriceMap,
) -> Result<f64, StoreError> {
    let mut total = 0.0;
    for stock in store.stocks_for_profile(profile_id)? {
        let Some(price) = current.get(&stock.id) else {
            continue;
        };
        let value = price * store.total_remaining(stock.id)?;
        total += value * (stock.zakat_rate_pct / 100.0);
    }
    Ok(total)
}

/// Lifetime figures for one stock.
pub fn stock_performance<S: TransactionStore + HoldingStore + AllocationStore>(
    store: &S,
    stock_id: i64,
) -> Result<StockPerformance, StoreError> {
    Ok(StockPerformance {
        total_bought: store.total_bought(stock_id)?,
        total_sold: store.total_sold(stock_id)?,
        remaining_quantity: store.total_remaining(stock_id)?,
        average_buy_price: store.average_open_buy_price(stock_id)?.unwrap_or(0.0),
        realized_profit: store.realized_profit_for_stock(stock_id)?,
    })
}

/// Roll everything up for one profile.
pub fn portfolio_summary<S>(
    store: &S,
    profile_id: i64,
    current: &PriceMap,
) -> Result<PortfolioSummary, StoreError>
where
    S: ProfileStore + StockStore + HoldingStore + AllocationStore,
{
    let profile = store.profile(profile_id)?.ok_or(StoreError::NotFound {
        entity: "profile",
        id: profile_id,
    })?;

    let invested = total_invested(store, profile_id)?;
    let value = portfolio_value(store, profile_id, current)?;
    let realized = realized_profit(store, profile_id)?;
    let unrealized = unrealized_profit(store, profile_id, current)?;
    let total_profit = realized + unrealized;
    let return_pct = if invested > 0.0 {
        total_profit / invested * 100.0
    } else {
        0.0
    };

    Ok(PortfolioSummary {
        total_invested: invested,
        portfolio_value: value,
        realized_profit: realized,
        unrealized_profit: unrealized,
        total_profit,
        return_pct,
        stock_count: store.stocks_for_profile(profile_id)?.len(),
        zakat_due: zakat_due(store, profile_id, current)?,
        currency: profile.currency,
    })
}
