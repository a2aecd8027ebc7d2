use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use borsa_catalog::{create_profile, create_stock, set_active_profile, DEFAULT_ZAKAT_RATE_PCT};
use borsa_ledger::{Ledger, SellReceipt, TradeRequest};
use borsa_store::MemoryStore;

/// Parse a `YYYY-MM-DD` day into a UTC midnight timestamp.
pub fn date(s: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("parse date {s}"))?;
    let midnight = day.and_hms_opt(0, 0, 0).context("midnight out of range")?;
    Ok(midnight.and_utc())
}

/// An in-memory portfolio with one active profile, ready for bookings.
pub struct Fixture {
    pub ledger: Ledger<MemoryStore>,
    pub profile_id: i64,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let mut store = MemoryStore::new();
        let profile_id = create_profile(&mut store, "Test Portfolio", "USD", date("2024-01-01")?)?;
        set_active_profile(&mut store, profile_id)?;
        Ok(Self {
            ledger: Ledger::new(store),
            profile_id,
        })
    }

    pub fn store(&self) -> &MemoryStore {
        self.ledger.store()
    }

    /// Register a stock under the fixture profile with the default zakat
    /// rate.
    pub fn add_stock(&mut self, symbol: &str, name: &str) -> Result<i64> {
        let profile_id = self.profile_id;
        let created_at = date("2024-01-01")?;
        let id = create_stock(
            self.ledger.store_mut(),
            profile_id,
            symbol,
            name,
            DEFAULT_ZAKAT_RATE_PCT,
            None,
            created_at,
        )?;
        Ok(id)
    }

    /// Book a commission-free buy on `day` (`YYYY-MM-DD`).
    pub fn buy(&mut self, stock_id: i64, quantity: f64, price: f64, day: &str) -> Result<i64> {
        let id = self
            .ledger
            .record_buy(&TradeRequest::new(stock_id, quantity, price, date(day)?))?;
        Ok(id)
    }

    /// Book a commission-free sell on `day` (`YYYY-MM-DD`).
    pub fn sell(
        &mut self,
        stock_id: i64,
        quantity: f64,
        price: f64,
        day: &str,
    ) -> Result<SellReceipt> {
        let receipt = self
            .ledger
            .record_sell(&TradeRequest::new(stock_id, quantity, price, date(day)?))?;
        Ok(receipt)
    }
}
