//! End-to-end cart flow over a shared backend and bus.

#![allow(clippy::unwrap_used)]

use std::cell::Cell;
use std::rc::Rc;

use rust_decimal::Decimal;

use gameswap_cart::{CART_UPDATED, CartStore, EventBus, MemoryStorage};
use gameswap_core::ListingId;
use gameswap_integration_tests::{init_tracing, sale_listing};

const LISTING_A: &str = "507f1f77bcf86cd799439011";
const LISTING_B: &str = "507f1f77bcf86cd799439012";

fn setup() -> (Rc<MemoryStorage>, EventBus, CartStore<Rc<MemoryStorage>, EventBus>) {
    init_tracing();
    let storage = Rc::new(MemoryStorage::new());
    let bus = EventBus::new();
    let store = CartStore::new(Rc::clone(&storage), bus.clone());
    (storage, bus, store)
}

#[test]
fn add_update_remove_keeps_totals_consistent() {
    let (_storage, _bus, store) = setup();

    store.add(&sale_listing(LISTING_A, 50), 2).unwrap();
    store.add(&sale_listing(LISTING_B, 30), 1).unwrap();
    assert_eq!(store.item_count(), 3);
    assert_eq!(store.total(), Decimal::from(130));

    // Repeat add merges rather than duplicating.
    store.add(&sale_listing(LISTING_A, 50), 1).unwrap();
    assert_eq!(store.items().len(), 2);
    assert_eq!(store.item_count(), 4);
    assert_eq!(store.total(), Decimal::from(180));

    // set_quantity sets, does not increment.
    let id_a = ListingId::parse(LISTING_A).unwrap();
    store.set_quantity(&id_a, 1).unwrap();
    assert_eq!(store.total(), Decimal::from(80));

    // Quantity zero behaves exactly like remove.
    store.set_quantity(&id_a, 0).unwrap();
    assert!(!store.contains(&id_a));
    assert_eq!(store.total(), Decimal::from(30));

    store.clear().unwrap();
    assert_eq!(store.item_count(), 0);
}

#[test]
fn two_stores_over_one_backend_observe_each_other() {
    let (storage, bus, store) = setup();
    let second = CartStore::new(Rc::clone(&storage), bus);

    store.add(&sale_listing(LISTING_A, 50), 2).unwrap();
    assert_eq!(second.item_count(), 2);

    second.clear().unwrap();
    assert!(store.items().is_empty());
}

#[test]
fn listeners_re_read_state_on_cart_updated() {
    init_tracing();
    let storage = Rc::new(MemoryStorage::new());
    let bus = EventBus::new();
    let store = Rc::new(CartStore::new(Rc::clone(&storage), bus.clone()));

    // A badge listener like the header cart counter: no payload, re-read.
    let seen = Rc::new(Cell::new(0_u32));
    let badge = Rc::clone(&seen);
    let reader = Rc::clone(&store);
    let _ = bus.subscribe(CART_UPDATED, move || badge.set(reader.item_count()));

    store.add(&sale_listing(LISTING_A, 50), 2).unwrap();
    assert_eq!(seen.get(), 2);

    store.add(&sale_listing(LISTING_A, 50), 3).unwrap();
    assert_eq!(seen.get(), 5);

    store.clear().unwrap();
    assert_eq!(seen.get(), 0);
}

#[test]
fn checkout_payload_matches_cart_contents() {
    let (_storage, _bus, store) = setup();
    store.add(&sale_listing(LISTING_A, 50), 2).unwrap();
    store.add(&sale_listing(LISTING_B, 30), 1).unwrap();

    let summary = store.validate_for_checkout(None).unwrap();
    assert_eq!(summary.line_count, 2);
    assert_eq!(summary.total, Decimal::from(130));

    let data = store.prepare_checkout(None).unwrap();
    assert_eq!(data.total_amount, store.total());
    assert_eq!(data.total_items, store.item_count());
    assert_eq!(data.unique_sellers, 1);
    for line in &data.lines {
        assert_eq!(
            line.total_price,
            line.unit_price * Decimal::from(line.quantity)
        );
    }
}
