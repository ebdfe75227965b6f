//! Integration tests for the GameSwap client.
//!
//! The suites under `tests/` wire a [`gameswap_cart::CartStore`] and a
//! [`gameswap_cart::DataValidator`] over one shared in-memory backend
//! and one event bus, the way the embedding application does, and
//! exercise the full add/clean/checkout loop.
//!
//! Run with `cargo test -p gameswap-integration-tests`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Once;

use rust_decimal::Decimal;

use gameswap_core::{GameRef, Listing, ListingId, ListingKind, UserId};

static TRACING: Once = Once::new();

/// Install a test tracing subscriber once per process. Honors
/// `RUST_LOG`; defaults to silence.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A sale listing fixture with the given id and price.
///
/// # Panics
///
/// Panics if `id` or the fixture seller id is not a well-formed object
/// id; test fixtures use literals.
#[must_use]
pub fn sale_listing(id: &str, price: u32) -> Listing {
    Listing {
        id: ListingId::parse(id).expect("fixture listing id"),
        title: "Game X".to_owned(),
        description: Some("Complete in box".to_owned()),
        kind: ListingKind::Sale,
        price: Some(Decimal::from(price)),
        image_url: None,
        game: Some(GameRef {
            id: None,
            name: Some("Game X".to_owned()),
            image_url: Some("https://img.example/x.jpg".to_owned()),
        }),
        platform: Some("PS5".to_owned()),
        condition: Some("used".to_owned()),
        seller_id: UserId::parse("507f1f77bcf86cd799439099").expect("fixture seller id"),
        seller_name: Some("seller".to_owned()),
    }
}
