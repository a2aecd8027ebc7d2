use borsa_ledger::{Ledger, TradeRequest};
use borsa_store::{AllocationStore, HoldingStore, MemoryStore, TransactionStore};
use chrono::{DateTime, TimeZone, Utc};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, d, 0, 0, 0).unwrap()
}

const STOCK: i64 = 1;

fn assert_conserved(store: &MemoryStore) {
    let bought = store.total_bought(STOCK).unwrap();
    let sold = store.total_sold(STOCK).unwrap();
    let remaining = store.total_remaining(STOCK).unwrap();
    assert_eq!(
        remaining,
        bought - sold,
        "remaining {remaining} != bought {bought} - sold {sold}"
    );
}

#[test]
fn scenario_remaining_equals_bought_minus_sold_after_every_step() {
    // A mixed sequence of buys, sells and reversals; the conservation
    // equation must hold after each mutation.
    let mut ledger = Ledger::new(MemoryStore::new());

    ledger
        .record_buy(&TradeRequest::new(STOCK, 100.0, 5.0, day(1)))
        .unwrap();
    assert_conserved(ledger.store());

    ledger
        .record_buy(&TradeRequest::new(STOCK, 50.0, 6.0, day(2)))
        .unwrap();
    assert_conserved(ledger.store());

    let s1 = ledger
        .record_sell(&TradeRequest::new(STOCK, 120.0, 7.0, day(3)))
        .unwrap();
    assert_conserved(ledger.store());

    ledger
        .record_buy(&TradeRequest::new(STOCK, 25.0, 6.5, day(4)))
        .unwrap();
    assert_conserved(ledger.store());

    let s2 = ledger
        .record_sell(&TradeRequest::new(STOCK, 40.0, 8.0, day(5)))
        .unwrap();
    assert_conserved(ledger.store());

    ledger.reverse_sell(s2.transaction_id).unwrap();
    assert_conserved(ledger.store());

    ledger.reverse_sell(s1.transaction_id).unwrap();
    assert_conserved(ledger.store());

    // After reversing both sells, the full bought quantity is back.
    assert_eq!(ledger.store().total_remaining(STOCK).unwrap(), 175.0);
}

#[test]
fn scenario_every_sell_allocates_its_exact_quantity() {
    let mut ledger = Ledger::new(MemoryStore::new());
    for d in 1..=4 {
        ledger
            .record_buy(&TradeRequest::new(STOCK, 7.5, d as f64, day(d)))
            .unwrap();
    }

    let sells = [4.0, 11.0, 7.5, 6.5];
    for (i, qty) in sells.iter().enumerate() {
        let receipt = ledger
            .record_sell(&TradeRequest::new(STOCK, *qty, 10.0, day(10 + i as u32)))
            .unwrap();
        let persisted: f64 = ledger
            .store()
            .allocations_for_sell(receipt.transaction_id)
            .unwrap()
            .iter()
            .map(|a| a.quantity)
            .sum();
        assert_eq!(persisted, *qty, "sell #{i} allocation sum drifted");
        assert_conserved(ledger.store());
    }

    // 30 bought, 29 sold.
    assert_eq!(ledger.store().total_remaining(STOCK).unwrap(), 1.0);
}
