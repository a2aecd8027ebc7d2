//! CSV export.
//!
//! Column layouts match the app's historical exports; values are fixed to
//! two decimals for spreadsheet friendliness. Quoting and escaping are
//! left to the csv writer.

use anyhow::{Context, Result};
use borsa_schemas::{Holding, Transaction};
use borsa_store::{HoldingStore, StockStore};

use crate::summary::PortfolioSummary;

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush csv writer: {e}"))?;
    String::from_utf8(bytes).context("csv output was not utf-8")
}

/// One row per transaction: date, stock symbol, side, figures, notes.
pub fn transactions_csv<S: StockStore>(
    store: &S,
    transactions: &[Transaction],
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "Date",
        "Stock",
        "Type",
        "Quantity",
        "Price",
        "Commission",
        "Total",
        "Notes",
    ])?;

    for t in transactions {
        let symbol = store
            .stock(t.stock_id)?
            .map(|s| s.symbol)
            .unwrap_or_else(|| "Unknown".to_string());
        let total = t.quantity * t.price_per_unit + t.commission;
        wtr.write_record([
            t.date.format("%Y-%m-%d").to_string(),
            symbol,
            t.side.to_string(),
            format!("{:.2}", t.quantity),
            format!("{:.2}", t.price_per_unit),
            format!("{:.2}", t.commission),
            format!("{total:.2}"),
            t.notes.clone().unwrap_or_default(),
        ])?;
    }
    finish(wtr)
}

/// One row per lot, valued at its own cost basis.
pub fn holdings_csv<S: StockStore>(store: &S, holdings: &[Holding]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "Stock",
        "Buy Date",
        "Original Quantity",
        "Remaining Quantity",
        "Buy Price",
        "Current Value",
    ])?;

    for h in holdings {
        let symbol = store
            .stock(h.stock_id)?
            .map(|s| s.symbol)
            .unwrap_or_else(|| "Unknown".to_string());
        let value = h.remaining_quantity * h.buy_price;
        wtr.write_record([
            symbol,
            h.buy_date.format("%Y-%m-%d").to_string(),
            format!("{:.2}", h.original_quantity),
            format!("{:.2}", h.remaining_quantity),
            format!("{:.2}", h.buy_price),
            format!("{value:.2}"),
        ])?;
    }
    finish(wtr)
}

/// One row per stock of the profile with its current position.
pub fn stocks_csv<S: StockStore + HoldingStore>(store: &S, profile_id: i64) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "Symbol",
        "Name",
        "Current Holdings",
        "Average Price",
        "Zakat %",
        "Notes",
    ])?;

    for stock in store.stocks_for_profile(profile_id)? {
        let holdings = store.total_remaining(stock.id)?;
        let avg = store.average_open_buy_price(stock.id)?.unwrap_or(0.0);
        wtr.write_record([
            stock.symbol,
            stock.name,
            format!("{holdings:.2}"),
            format!("{avg:.2}"),
            format!("{:.2}", stock.zakat_rate_pct),
            stock.notes.unwrap_or_default(),
        ])?;
    }
    finish(wtr)
}

/// Metric/value rows for the profile roll-up.
pub fn summary_csv(summary: &PortfolioSummary) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Metric", "Value", "Currency"])?;

    let money = [
        ("Total Invested", summary.total_invested),
        ("Current Portfolio Value", summary.portfolio_value),
        ("Realized Profit", summary.realized_profit),
        ("Unrealized Profit", summary.unrealized_profit),
        ("Total Profit/Loss", summary.total_profit),
    ];
    for (label, value) in money {
        wtr.write_record([label, format!("{value:.2}").as_str(), summary.currency.as_str()])?;
    }
    wtr.write_record([
        "Return (ROI)",
        format!("{:.2}%", summary.return_pct).as_str(),
        "",
    ])?;
    wtr.write_record(["Active Stocks", summary.stock_count.to_string().as_str(), ""])?;
    wtr.write_record([
        "Annual Zakat Due",
        format!("{:.2}", summary.zakat_due).as_str(),
        summary.currency.as_str(),
    ])?;
    finish(wtr)
}
