use borsa_ledger::{Ledger, LedgerError, TradeRequest};
use borsa_store::{HoldingStore, MemoryStore, TransactionStore};
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
}

const STOCK: i64 = 1;

#[test]
fn scenario_oversell_is_rejected_with_zero_mutation() {
    // GIVEN: 30 units held across three lots.
    let mut ledger = Ledger::new(MemoryStore::new());
    for (price, d) in [(1.0, 1), (2.0, 2), (3.0, 3)] {
        ledger
            .record_buy(&TradeRequest::new(STOCK, 10.0, price, day(d)))
            .unwrap();
    }
    let before = ledger.store().all_holdings(STOCK).unwrap();
    let tx_count_before = ledger.store().transactions_for_stock(STOCK).unwrap().len();

    // WHEN: trying to sell 31.
    let err = ledger.record_sell(&TradeRequest::new(STOCK, 31.0, 4.0, day(10)));

    // THEN: typed rejection carrying both figures...
    assert_eq!(
        err,
        Err(LedgerError::InsufficientHoldings {
            available: 30.0,
            requested: 31.0
        })
    );

    // ...and the store is untouched: no sell row, no allocations, no lot
    // movement.
    assert_eq!(ledger.store().all_holdings(STOCK).unwrap(), before);
    assert_eq!(
        ledger.store().transactions_for_stock(STOCK).unwrap().len(),
        tx_count_before
    );
}

#[test]
fn scenario_exhausted_lots_do_not_count_as_available() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();
    ledger
        .record_sell(&TradeRequest::new(STOCK, 10.0, 2.0, day(2)))
        .unwrap();

    // Everything is sold; the next sell sees zero availability.
    let err = ledger.record_sell(&TradeRequest::new(STOCK, 1.0, 2.0, day(3)));
    assert_eq!(
        err,
        Err(LedgerError::InsufficientHoldings {
            available: 0.0,
            requested: 1.0
        })
    );
}
