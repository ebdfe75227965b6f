//! GameSwap cart library.
//!
//! Client-side cart state for the GameSwap marketplace: a [`CartStore`]
//! that owns the persisted list of cart line items, and a
//! [`DataValidator`] that repairs structurally corrupt persisted state.
//!
//! Both services are constructed over an injected [`StorageBackend`]
//! (string key/value storage, `localStorage`-shaped) and an injected
//! [`EventSink`] used to broadcast the `cart-updated` change
//! notification. [`MemoryStorage`] and [`EventBus`] are the provided
//! implementations; embedders may bring their own.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use gameswap_cart::{CartStore, DataValidator, EventBus, MemoryStorage};
//!
//! let storage = Rc::new(MemoryStorage::new());
//! let bus = EventBus::new();
//!
//! let cart = CartStore::new(Rc::clone(&storage), bus.clone());
//! let validator = DataValidator::new(storage, bus.clone());
//!
//! // Run once at application startup: cleans persisted state and keeps
//! // cleaning after every cart mutation.
//! let report = validator.initialize(&bus);
//! assert!(report.errors.is_empty());
//! assert_eq!(cart.item_count(), 0);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod events;
pub mod storage;
pub mod store;
pub mod validator;

pub use gameswap_core::is_valid_object_id;

pub use error::{CartError, CheckoutError};
pub use events::{CART_UPDATED, EventBus, EventSink, NullEvents, SubscriptionId};
pub use storage::{CART_KEY, MemoryStorage, StorageBackend, StorageError};
pub use store::{
    CartStats, CartStore, CartUpdate, CheckoutData, CheckoutLine, CheckoutSummary, LineItem,
};
pub use validator::{
    CleanOutcome, DataValidator, ShapeReport, ValidationReport, contains_invalid_ids,
    validate_listing_shape,
};
