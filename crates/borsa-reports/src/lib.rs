//! borsa-reports
//!
//! Pull-based read models over the store: realized and unrealized profit,
//! portfolio valuation, zakat liability, per-stock performance, and CSV
//! export. Nothing here mutates the ledger; current prices are supplied
//! by the caller as a [`PriceMap`] — price ingestion lives outside the
//! core.

mod export;
mod summary;

pub use export::{holdings_csv, stocks_csv, summary_csv, transactions_csv};
pub use summary::{
    portfolio_summary, portfolio_value, prices, realized_profit, stock_performance,
    total_invested, unrealized_profit, zakat_due, PortfolioSummary, PriceMap, StockPerformance,
};
