use borsa_ledger::{Ledger, LedgerError, TradeRequest};
use borsa_store::{AllocationStore, HoldingStore, MemoryStore};
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap()
}

const STOCK: i64 = 1;

#[test]
fn scenario_rebooking_a_sell_recomputes_its_allocations() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let b1 = ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();
    let b2 = ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 2.0, day(2)))
        .unwrap();

    // Sell 15 — drains lot 1, takes 5 from lot 2.
    let receipt = ledger
        .record_sell(&TradeRequest::new(STOCK, 15.0, 4.0, day(5)))
        .unwrap();

    // Edit the sell down to 8 units. The allocation set must be rebuilt
    // from full inventory, not patched: now only lot 1 is touched.
    let new_id = ledger
        .rebook(
            receipt.transaction_id,
            &TradeRequest::new(STOCK, 8.0, 4.0, day(5)),
        )
        .unwrap();
    assert_ne!(new_id, receipt.transaction_id);

    let allocations = ledger.store().allocations_for_sell(new_id).unwrap();
    assert_eq!(allocations.len(), 1);
    assert_eq!(allocations[0].buy_transaction_id, b1);
    assert_eq!(allocations[0].quantity, 8.0);

    let rem = |buy_id: i64| {
        ledger
            .store()
            .holding_for_buy(buy_id)
            .unwrap()
            .unwrap()
            .remaining_quantity
    };
    assert_eq!(rem(b1), 2.0);
    assert_eq!(rem(b2), 10.0);
}

#[test]
fn scenario_rebooking_a_buy_date_reorders_fifo() {
    let mut ledger = Ledger::new(MemoryStore::new());
    let cheap = ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();
    let dear = ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 3.0, day(2)))
        .unwrap();

    // Move the cheap lot after the dear one. A subsequent sell must now
    // consume the dear lot first — realized profit follows the new order.
    let moved = ledger
        .rebook(cheap, &TradeRequest::new(STOCK, 10.0, 1.0, day(3)))
        .unwrap();

    let receipt = ledger
        .record_sell(&TradeRequest::new(STOCK, 10.0, 5.0, day(4)))
        .unwrap();
    assert_eq!(receipt.profit.allocations.len(), 1);
    assert_eq!(receipt.profit.allocations[0].buy_transaction_id, dear);
    assert_eq!(receipt.profit.gross_profit, 20.0);

    let moved_lot = ledger.store().holding_for_buy(moved).unwrap().unwrap();
    assert_eq!(moved_lot.remaining_quantity, 10.0);
}

#[test]
fn scenario_failed_rebook_restores_the_original_booking() {
    let mut ledger = Ledger::new(MemoryStore::new());
    ledger
        .record_buy(&TradeRequest::new(STOCK, 10.0, 1.0, day(1)))
        .unwrap();
    let sell = ledger
        .record_sell(&TradeRequest::new(STOCK, 6.0, 2.0, day(2)))
        .unwrap();

    // Growing the sell to 12 exceeds the 10 ever bought; the edit must
    // fail and the original sell must come back.
    let err = ledger.rebook(
        sell.transaction_id,
        &TradeRequest::new(STOCK, 12.0, 2.0, day(2)),
    );
    assert_eq!(
        err,
        Err(LedgerError::InsufficientHoldings {
            available: 10.0,
            requested: 12.0
        })
    );

    // 6 units are still sold: the restored booking holds the inventory at
    // its pre-edit level.
    assert_eq!(ledger.store().total_remaining(STOCK).unwrap(), 4.0);
}
