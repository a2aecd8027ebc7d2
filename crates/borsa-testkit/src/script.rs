//! CSV trade scripts.
//!
//! A script is a headed CSV of chronological bookings:
//!
//! ```text
//! date,symbol,side,quantity,price,commission
//! 2024-01-02,ALG,BUY,10,1.0,0
//! 2024-01-05,ALG,SELL,4,1.5,0.25
//! ```
//!
//! Unknown symbols are registered on first use with the default zakat
//! rate; sells go through the full validate-allocate-deduct path.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use borsa_schemas::Side;

use crate::fixture::{date, Fixture};
use borsa_ledger::{SellReceipt, TradeRequest};
use borsa_store::StockStore;

#[derive(Clone, Debug, PartialEq)]
pub struct ScriptedTrade {
    pub date: DateTime<Utc>,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub commission: f64,
}

/// Load a trade script, checking chronological order.
pub fn load_trades_csv(path: &str) -> Result<Vec<ScriptedTrade>> {
    let mut rdr =
        csv::Reader::from_path(path).with_context(|| format!("open trades csv: {path}"))?;
    let mut out = Vec::new();

    for rec in rdr.records() {
        let rec = rec?;
        let side = match rec[2].to_uppercase().as_str() {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => bail!("unknown side '{other}'"),
        };
        out.push(ScriptedTrade {
            date: date(&rec[0])?,
            symbol: rec[1].to_uppercase(),
            side,
            quantity: rec[3].parse().context("parse quantity")?,
            price: rec[4].parse().context("parse price")?,
            commission: rec[5].parse().context("parse commission")?,
        });
    }

    for w in out.windows(2) {
        if w[0].date > w[1].date {
            bail!("trades not in chronological order");
        }
    }

    Ok(out)
}

/// What a replay booked.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub buys: usize,
    pub sells: usize,
    pub receipts: Vec<SellReceipt>,
}

/// Replay a script against a fixture, registering stocks on demand.
pub fn run_script(fx: &mut Fixture, trades: &[ScriptedTrade]) -> Result<ScriptReport> {
    let mut report = ScriptReport::default();

    for trade in trades {
        let stock_id = match fx.store().stock_by_symbol(fx.profile_id, &trade.symbol)? {
            Some(stock) => stock.id,
            None => fx.add_stock(&trade.symbol, &trade.symbol)?,
        };
        let req = TradeRequest::new(stock_id, trade.quantity, trade.price, trade.date)
            .with_commission(trade.commission);
        match trade.side {
            Side::Buy => {
                fx.ledger.record_buy(&req)?;
                report.buys += 1;
            }
            Side::Sell => {
                report.receipts.push(fx.ledger.record_sell(&req)?);
                report.sells += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsa_store::HoldingStore;
    use std::io::Write;

    fn write_script(content: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "{content}").unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn load_and_replay_a_script() {
        let (_dir, path) = write_script(
            "date,symbol,side,quantity,price,commission\n\
             2024-01-02,ALG,BUY,10,1.0,0\n\
             2024-01-03,SAR,BUY,5,2.0,0\n\
             2024-01-05,ALG,SELL,4,1.5,0.25\n",
        );

        let trades = load_trades_csv(&path).unwrap();
        assert_eq!(trades.len(), 3);

        let mut fx = Fixture::new().unwrap();
        let report = run_script(&mut fx, &trades).unwrap();
        assert_eq!(report.buys, 2);
        assert_eq!(report.sells, 1);
        assert_eq!(report.receipts[0].profit.net_profit, 2.0 - 0.25);

        let alg = fx
            .store()
            .stock_by_symbol(fx.profile_id, "ALG")
            .unwrap()
            .unwrap();
        assert_eq!(fx.store().total_remaining(alg.id).unwrap(), 6.0);
    }

    #[test]
    fn out_of_order_script_is_rejected() {
        let (_dir, path) = write_script(
            "date,symbol,side,quantity,price,commission\n\
             2024-01-05,ALG,BUY,10,1.0,0\n\
             2024-01-02,ALG,BUY,5,1.0,0\n",
        );
        let err = load_trades_csv(&path).unwrap_err();
        assert!(err.to_string().contains("chronological"));
    }

    #[test]
    fn unknown_side_is_rejected() {
        let (_dir, path) = write_script(
            "date,symbol,side,quantity,price,commission\n\
             2024-01-05,ALG,HOLD,10,1.0,0\n",
        );
        assert!(load_trades_csv(&path).is_err());
    }
}
