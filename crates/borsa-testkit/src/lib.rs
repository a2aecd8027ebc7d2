//! borsa-testkit
//!
//! Shared fixtures for scenario tests: a pre-seeded store + ledger, and
//! CSV trade scripts for replaying longer booking sequences.

mod fixture;
mod script;

pub use fixture::{date, Fixture};
pub use script::{load_trades_csv, run_script, ScriptReport, ScriptedTrade};
