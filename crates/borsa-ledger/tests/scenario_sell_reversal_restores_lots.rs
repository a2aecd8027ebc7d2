use borsa_ledger::{Ledger, TradeRequest};
use borsa_store::{AllocationStore, HoldingStore, MemoryStore, TransactionStore};
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap()
}

const STOCK: i64 = 1;

#[test]
fn scenario_reversal_returns_every_lot_to_its_pre_sell_quantity() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();
    ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 2.0, day(2)))
        .unwrap();

    let before = ledger.store().all_holdings(STOCK).unwrap();

    // Sell across both lots, then undo it.
    let receipt = ledger
        .record_sell(&TradeRequest::new(STOCK, 15.0, 4.0, day(5)))
        .unwrap();
    ledger.reverse_sell(receipt.transaction_id).unwrap();

    // All lot quantities equal the pre-sell state.
    let after = ledger.store().all_holdings(STOCK).unwrap();
    assert_eq!(after, before);

    // The sell and its allocations are gone.
    assert!(ledger
        .store()
        .transaction(receipt.transaction_id)
        .unwrap()
        .is_none());
    assert!(ledger
        .store()
        .allocations_for_sell(receipt.transaction_id)
        .unwrap()
        .is_empty());
}

#[test]
fn scenario_reversal_reopens_a_fully_exhausted_lot() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let buy_id = ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();

    // Drain the lot to zero.
    let receipt = ledger
        .record_sell(&TradeRequest::new(STOCK, 10.0, 2.0, day(3)))
        .unwrap();
    assert_eq!(
        ledger
            .store()
            .holding_for_buy(buy_id)
            .unwrap()
            .unwrap()
            .remaining_quantity,
        0.0
    );
    // An exhausted lot no longer shows up as open inventory.
    assert!(ledger.store().open_holdings(STOCK).unwrap().is_empty());

    // Reversal brings it back from 0 to its full quantity.
    ledger.reverse_sell(receipt.transaction_id).unwrap();
    let lot = ledger.store().holding_for_buy(buy_id).unwrap().unwrap();
    assert_eq!(lot.remaining_quantity, 10.0);
    assert_eq!(ledger.store().open_holdings(STOCK).unwrap().len(), 1);
}

#[test]
fn scenario_reversed_inventory_is_sellable_again() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();

    let first = ledger
        .record_sell(&TradeRequest::new(STOCK, 10.0, 2.0, day(3)))
        .unwrap();
    ledger.reverse_sell(first.transaction_id).unwrap();

    // The full quantity can be sold a second time, and the new sell
    // allocates against the restored lot.
    let second = ledger
        .record_sell(&TradeRequest::new(STOCK, 10.0, 3.0, day(4)))
        .unwrap();
    assert_eq!(second.profit.allocated_quantity(), 10.0);
    assert_eq!(second.profit.gross_profit, 20.0);
}
