//! Stock catalog: symbols are uppercased on entry and unique per profile.

use borsa_schemas::NewStock;
use borsa_store::StockStore;
use chrono::{DateTime, Utc};

use crate::CatalogError;

/// Standard zakat levy on trade goods.
pub const DEFAULT_ZAKAT_RATE_PCT: f64 = 2.5;

/// Register a stock under a profile.
///
/// The symbol is uppercased before the uniqueness check, so "alg" and
/// "ALG" collide.
pub fn create_stock<S: StockStore>(
    store: &mut S,
    profile_id: i64,
    symbol: &str,
    name: &str,
    zakat_rate_pct: f64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
) -> Result<i64, CatalogError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() || name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }
    if store.stock_by_symbol(profile_id, &symbol)?.is_some() {
        return Err(CatalogError::DuplicateSymbol { symbol });
    }
    let id = store.insert_stock(NewStock {
        profile_id,
        symbol,
        name: name.to_string(),
        zakat_rate_pct,
        notes,
        created_at,
    })?;
    Ok(id)
}

/// Change a stock's display name, keeping every other field.
pub fn rename_stock<S: StockStore>(
    store: &mut S,
    stock_id: i64,
    name: &str,
) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::EmptyName);
    }
    let mut stock = store.stock(stock_id)?.ok_or(CatalogError::NotFound {
        entity: "stock",
        id: stock_id,
    })?;
    stock.name = name.to_string();
    store.update_stock(&stock)?;
    Ok(())
}
