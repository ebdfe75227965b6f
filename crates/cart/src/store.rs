//! The persisted cart store.
//!
//! [`CartStore`] is the single source of truth for the cart within the
//! current client context. The whole cart is one JSON array under the
//! [`CART_KEY`] storage key, read fully and rewritten fully on every
//! mutation; after each successful mutation the store emits
//! [`CART_UPDATED`] and consumers re-read through [`CartStore::items`]
//! and friends.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gameswap_core::{Listing, ListingId, ListingKind, UserId};

use crate::error::{CartError, CheckoutError};
use crate::events::{CART_UPDATED, EventSink};
use crate::storage::{CART_KEY, StorageBackend};

/// One entry in the cart: a listing reference plus the display fields
/// snapshotted when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Id of the listing this item was created from.
    pub listing_id: ListingId,
    /// Listing title at add time.
    pub title: String,
    /// Unit price at add time.
    pub unit_price: Decimal,
    /// Display image (listing image, falling back to the game cover).
    #[serde(default)]
    pub image_url: Option<String>,
    /// Name of the game the listing is about.
    #[serde(default)]
    pub game_name: Option<String>,
    /// Platform of the copy.
    #[serde(default)]
    pub platform: Option<String>,
    /// Condition of the copy.
    #[serde(default)]
    pub condition: Option<String>,
    /// Seller of the listing.
    pub seller_id: UserId,
    /// Seller display name at add time.
    #[serde(default)]
    pub seller_name: Option<String>,
    /// How many copies the buyer wants. Always >= 1 for items created
    /// through [`CartStore::add`].
    pub quantity: u32,
    /// When the item was first added.
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Outcome of a successful cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartUpdate {
    /// User-facing message describing what happened.
    pub message: String,
    /// Total quantity across the cart after the mutation.
    pub item_count: u32,
}

/// Summary returned by a successful checkout validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    /// Number of distinct line items.
    pub line_count: usize,
    /// Cart grand total.
    pub total: Decimal,
}

/// One line of a prepared checkout payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLine {
    /// Listing being purchased.
    pub listing_id: ListingId,
    /// Quantity purchased.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub total_price: Decimal,
    /// Free-form order note.
    pub notes: String,
}

/// Checkout payload produced by [`CartStore::prepare_checkout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutData {
    /// Per-item purchase lines.
    pub lines: Vec<CheckoutLine>,
    /// Total quantity across all lines.
    pub total_items: u32,
    /// Grand total.
    pub total_amount: Decimal,
    /// Number of distinct sellers involved.
    pub unique_sellers: usize,
}

/// Aggregate view of the current cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartStats {
    /// Total quantity across the cart.
    pub total_items: u32,
    /// Number of distinct line items.
    pub unique_items: usize,
    /// Cart grand total.
    pub total_value: Decimal,
    /// `total_value / total_items`, zero for an empty cart.
    pub average_price: Decimal,
    /// Distinct sellers, in cart order.
    pub sellers: Vec<UserId>,
    /// Distinct platforms, in cart order.
    pub platforms: Vec<String>,
    /// Most recent `added_at` across the cart.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Single source of truth for the persisted cart.
///
/// Generic over the injected [`StorageBackend`] and [`EventSink`]; share
/// the backend with a [`DataValidator`](crate::DataValidator) by wrapping
/// it in an `Rc` and cloning the handle.
#[derive(Debug, Clone)]
pub struct CartStore<S, E> {
    storage: S,
    events: E,
}

impl<S: StorageBackend, E: EventSink> CartStore<S, E> {
    /// Create a store over the given backend and event sink.
    pub const fn new(storage: S, events: E) -> Self {
        Self { storage, events }
    }

    /// Current line items, in insertion order.
    ///
    /// A missing key or undeserializable blob reads as an empty cart.
    /// Items are decoded individually: an unreadable item is skipped
    /// without taking down the lines around it. Corruption is logged and
    /// never surfaces as an error.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        let Some(raw) = self.storage.get(CART_KEY) else {
            return Vec::new();
        };
        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "cart blob unreadable, treating as empty");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable cart item");
                    None
                }
            })
            .collect()
    }

    /// The line item for `id`, if present.
    #[must_use]
    pub fn item(&self, id: &ListingId) -> Option<LineItem> {
        self.items().into_iter().find(|i| &i.listing_id == id)
    }

    /// Whether the cart holds a line item for `id`.
    #[must_use]
    pub fn contains(&self, id: &ListingId) -> bool {
        self.items().iter().any(|i| &i.listing_id == id)
    }

    /// Total quantity across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items().iter().map(|i| i.quantity).sum()
    }

    /// Cart grand total: sum of `unit_price * quantity`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items().iter().map(LineItem::line_total).sum()
    }

    /// Add `quantity` copies of `listing` to the cart.
    ///
    /// If the listing is already in the cart its quantity is incremented;
    /// otherwise a new line item is appended. Snapshots the listing's
    /// display fields, with the image falling back to the game cover.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] when `quantity` is zero
    /// - [`CartError::NotForSale`] for trade/wanted listings
    /// - [`CartError::InvalidPrice`] when the listing has no positive price
    /// - [`CartError::Storage`] when the backend rejects the write
    pub fn add(&self, listing: &Listing, quantity: u32) -> Result<CartUpdate, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if listing.kind != ListingKind::Sale {
            return Err(CartError::NotForSale);
        }
        let unit_price = listing
            .price
            .filter(|p| *p > Decimal::ZERO)
            .ok_or(CartError::InvalidPrice)?;

        let mut items = self.items();
        if let Some(existing) = items.iter_mut().find(|i| i.listing_id == listing.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            items.push(LineItem {
                listing_id: listing.id.clone(),
                title: listing.title.clone(),
                unit_price,
                image_url: listing.display_image().map(str::to_owned),
                game_name: listing.game_name().map(str::to_owned),
                platform: listing.platform.clone(),
                condition: listing.condition.clone(),
                seller_id: listing.seller_id.clone(),
                seller_name: listing.seller_name.clone(),
                quantity,
                added_at: Utc::now(),
            });
        }

        self.persist(&items)?;
        debug!(listing_id = %listing.id, quantity, "added to cart");
        Ok(Self::update(&items, format!("{} added to cart", listing.title)))
    }

    /// Remove the line item for `id`. Succeeds even when the id is not in
    /// the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the backend rejects the write.
    pub fn remove(&self, id: &ListingId) -> Result<CartUpdate, CartError> {
        let mut items = self.items();
        items.retain(|i| &i.listing_id != id);

        self.persist(&items)?;
        debug!(listing_id = %id, "removed from cart");
        Ok(Self::update(&items, "Item removed from cart".to_owned()))
    }

    /// Set the quantity of the line item for `id` directly (no
    /// increment). A zero quantity removes the item. No-op success when
    /// the id is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the backend rejects the write.
    pub fn set_quantity(&self, id: &ListingId, quantity: u32) -> Result<CartUpdate, CartError> {
        if quantity == 0 {
            return self.remove(id);
        }

        let mut items = self.items();
        if let Some(existing) = items.iter_mut().find(|i| &i.listing_id == id) {
            existing.quantity = quantity;
        }

        self.persist(&items)?;
        debug!(listing_id = %id, quantity, "quantity updated");
        Ok(Self::update(&items, "Quantity updated".to_owned()))
    }

    /// Empty the cart by removing the persisted key.
    ///
    /// # Errors
    ///
    /// Infallible today; kept fallible for interface symmetry with the
    /// other mutations.
    pub fn clear(&self) -> Result<CartUpdate, CartError> {
        self.storage.remove(CART_KEY);
        self.events.emit(CART_UPDATED);
        debug!("cart cleared");
        Ok(CartUpdate {
            message: "Cart cleared".to_owned(),
            item_count: 0,
        })
    }

    /// Check the cart is ready for checkout.
    ///
    /// When `buyer` is supplied, also rejects carts containing the
    /// buyer's own listings.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] for an empty cart
    /// - [`CheckoutError::InvalidPrice`] when any item has a non-positive
    ///   price
    /// - [`CheckoutError::InvalidQuantity`] when any item has a zero
    ///   quantity
    /// - [`CheckoutError::OwnListings`] when `buyer` sells any item
    pub fn validate_for_checkout(
        &self,
        buyer: Option<&UserId>,
    ) -> Result<CheckoutSummary, CheckoutError> {
        let items = self.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let bad_price = items
            .iter()
            .filter(|i| i.unit_price <= Decimal::ZERO)
            .count();
        if bad_price > 0 {
            return Err(CheckoutError::InvalidPrice { count: bad_price });
        }

        let bad_quantity = items.iter().filter(|i| i.quantity == 0).count();
        if bad_quantity > 0 {
            return Err(CheckoutError::InvalidQuantity {
                count: bad_quantity,
            });
        }

        if let Some(buyer) = buyer {
            let own = items.iter().filter(|i| &i.seller_id == buyer).count();
            if own > 0 {
                return Err(CheckoutError::OwnListings { count: own });
            }
        }

        Ok(CheckoutSummary {
            line_count: items.len(),
            total: items.iter().map(LineItem::line_total).sum(),
        })
    }

    /// Validate the cart and produce the checkout payload for the order
    /// service.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_for_checkout`].
    pub fn prepare_checkout(&self, buyer: Option<&UserId>) -> Result<CheckoutData, CheckoutError> {
        self.validate_for_checkout(buyer)?;

        let items = self.items();
        let lines: Vec<CheckoutLine> = items
            .iter()
            .map(|i| CheckoutLine {
                listing_id: i.listing_id.clone(),
                quantity: i.quantity,
                unit_price: i.unit_price,
                total_price: i.line_total(),
                notes: format!("Cart purchase - {}", i.title),
            })
            .collect();

        let mut sellers: Vec<&UserId> = Vec::new();
        for item in &items {
            if !sellers.contains(&&item.seller_id) {
                sellers.push(&item.seller_id);
            }
        }

        Ok(CheckoutData {
            total_items: items.iter().map(|i| i.quantity).sum(),
            total_amount: lines.iter().map(|l| l.total_price).sum(),
            unique_sellers: sellers.len(),
            lines,
        })
    }

    /// Aggregate view of the current cart.
    #[must_use]
    pub fn stats(&self) -> CartStats {
        let items = self.items();
        let total_items: u32 = items.iter().map(|i| i.quantity).sum();
        let total_value: Decimal = items.iter().map(LineItem::line_total).sum();
        let average_price = if total_items == 0 {
            Decimal::ZERO
        } else {
            total_value / Decimal::from(total_items)
        };

        let mut sellers: Vec<UserId> = Vec::new();
        let mut platforms: Vec<String> = Vec::new();
        for item in &items {
            if !sellers.contains(&item.seller_id) {
                sellers.push(item.seller_id.clone());
            }
            if let Some(platform) = &item.platform
                && !platforms.contains(platform)
            {
                platforms.push(platform.clone());
            }
        }

        CartStats {
            total_items,
            unique_items: items.len(),
            total_value,
            average_price,
            sellers,
            platforms,
            last_updated: items.iter().map(|i| i.added_at).max(),
        }
    }

    /// Serialize and persist the full item list, then notify listeners.
    fn persist(&self, items: &[LineItem]) -> Result<(), CartError> {
        let blob = serde_json::to_string(items)?;
        self.storage.set(CART_KEY, &blob)?;
        self.events.emit(CART_UPDATED);
        Ok(())
    }

    fn update(items: &[LineItem], message: String) -> CartUpdate {
        CartUpdate {
            message,
            item_count: items.iter().map(|i| i.quantity).sum(),
        }
    }
}
