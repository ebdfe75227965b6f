//! Persisted-state validation and repair.
//!
//! The cart store trusts its own writes; [`DataValidator`] does not. It
//! re-checks the raw persisted cart against the structural invariants
//! (well-formed listing id, non-empty title, positive price, a seller
//! id, an integer quantity of at least one) and drops anything that
//! fails, and it scans every persisted key for identifier-shaped fields
//! holding malformed ids.
//!
//! Every operation returns a structured result; nothing here propagates
//! an error or panic to the caller. Worst case is an empty cart.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use gameswap_core::is_valid_object_id;

use crate::events::{CART_UPDATED, EventBus, EventSink};
use crate::storage::{CART_KEY, StorageBackend};

/// Counts reported by a cart cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanOutcome {
    /// Items present before the pass.
    pub original: usize,
    /// Items surviving the pass.
    pub remaining: usize,
    /// Items (or whole blobs) removed. Zero when nothing was wrong.
    pub cleaned: usize,
}

/// Result of a listing shape check: one message per violated rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeReport {
    /// True when no rule was violated.
    pub valid: bool,
    /// Human-readable violation messages.
    pub errors: Vec<String>,
}

/// Report produced by [`DataValidator::generate_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// When the report was generated.
    pub timestamp: DateTime<Utc>,
    /// Findings: what was removed or flagged, one entry per key.
    pub cleaned: Vec<String>,
    /// Internal failures encountered while scanning; the scan continues
    /// past them.
    pub errors: Vec<String>,
}

/// Idempotent repair pass over persisted client state.
///
/// Construct over the same storage backend (and event sink) as the
/// [`CartStore`](crate::CartStore) so the two observe each other's
/// writes.
#[derive(Debug, Clone)]
pub struct DataValidator<S, E> {
    storage: S,
    events: E,
}

impl<S: StorageBackend, E: EventSink> DataValidator<S, E> {
    /// Create a validator over the given backend and event sink.
    pub const fn new(storage: S, events: E) -> Self {
        Self { storage, events }
    }

    /// Remove structurally invalid items from the persisted cart.
    ///
    /// A blob that is not well-formed JSON, or not an array at all, is
    /// discarded entirely and counts as one cleaned problem. Otherwise
    /// each item must satisfy the cart invariants: a 24-hex `listing_id`,
    /// a non-empty `title`, a numeric `unit_price` > 0, a string
    /// `seller_id`, and an integer `quantity` >= 1. Violating items are
    /// dropped, never clamped.
    ///
    /// The pass is idempotent: a second run with no intervening mutation
    /// reports `cleaned = 0`. Survivors are rewritten (and
    /// `cart-updated` fired) only when something was removed.
    pub fn clean_cart(&self) -> CleanOutcome {
        let Some(raw) = self.storage.get(CART_KEY) else {
            return CleanOutcome::default();
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) | Err(_) => {
                warn!("persisted cart is not a JSON array, discarding it");
                self.storage.remove(CART_KEY);
                return CleanOutcome {
                    original: 0,
                    remaining: 0,
                    cleaned: 1,
                };
            }
        };

        let original = items.len();
        let survivors: Vec<Value> = items.into_iter().filter(is_valid_line_item).collect();
        let remaining = survivors.len();
        let cleaned = original - remaining;

        if cleaned > 0 {
            debug!(cleaned, remaining, "dropped invalid cart items");
            match serde_json::to_string(&survivors) {
                Ok(blob) => {
                    if let Err(err) = self.storage.set(CART_KEY, &blob) {
                        warn!(error = %err, "could not rewrite cleaned cart");
                    }
                }
                Err(err) => warn!(error = %err, "could not encode cleaned cart"),
            }
            self.events.emit(CART_UPDATED);
        }

        CleanOutcome {
            original,
            remaining,
            cleaned,
        }
    }

    /// Clean the cart, then scan every persisted key for malformed
    /// identifiers.
    ///
    /// Findings land in `cleaned`; values that look like JSON but fail to
    /// parse are recorded in `errors` and the scan moves on to the next
    /// key. Plain string values are skipped silently. Never fails.
    pub fn generate_report(&self) -> ValidationReport {
        let mut cleaned = Vec::new();
        let mut errors = Vec::new();

        let outcome = self.clean_cart();
        if outcome.cleaned > 0 {
            cleaned.push(format!(
                "cart: {} invalid item(s) removed",
                outcome.cleaned
            ));
        }

        for key in self.storage.keys() {
            let Some(raw) = self.storage.get(&key) else {
                continue;
            };
            let trimmed = raw.trim_start();
            if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                continue;
            }
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    if contains_invalid_ids(&value) {
                        cleaned.push(format!("{key}: contains invalid object ids"));
                    }
                }
                Err(err) => {
                    errors.push(format!("{key}: unreadable JSON ({err})"));
                }
            }
        }

        ValidationReport {
            timestamp: Utc::now(),
            cleaned,
            errors,
        }
    }
}

impl<S, E> DataValidator<S, E>
where
    S: StorageBackend + Clone + 'static,
    E: EventSink + Clone + 'static,
{
    /// Startup hook: run one report pass, then keep the cart clean by
    /// subscribing a cleaning pass to `cart-updated` on `bus`.
    ///
    /// Call this once from the application's startup sequence. The
    /// subscribed pass may itself fire `cart-updated` when it removes
    /// something; the loop terminates because the pass is idempotent.
    pub fn initialize(&self, bus: &EventBus) -> ValidationReport {
        let report = self.generate_report();

        let validator = self.clone();
        let _ = bus.subscribe(CART_UPDATED, move || {
            validator.clean_cart();
        });

        report
    }
}

/// Whether a raw persisted cart item satisfies the cart invariants.
///
/// Anything this passes must also decode as a typed line item, so a
/// cleaned cart is guaranteed readable by the store.
fn is_valid_line_item(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };

    let id_ok = map
        .get("listing_id")
        .and_then(Value::as_str)
        .is_some_and(is_valid_object_id);
    let title_ok = map
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty());
    let price_ok = map
        .get("unit_price")
        .and_then(Value::as_f64)
        .is_some_and(|p| p > 0.0);
    let seller_ok = map.get("seller_id").is_some_and(Value::is_string);
    let quantity_ok = map
        .get("quantity")
        .and_then(Value::as_u64)
        .is_some_and(|q| q >= 1);

    id_ok && title_ok && price_ok && seller_ok && quantity_ok
}

/// Recursively scan a loaded JSON value for malformed identifiers.
///
/// A field "looks like an id" when its name contains the substring `"id"`
/// case-insensitively; this is a naming-convention heuristic, not a
/// schema. A string value under such a field that fails the 24-hex check
/// flags the whole structure. Reporting only - never mutates.
#[must_use]
pub fn contains_invalid_ids(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(contains_invalid_ids),
        Value::Object(map) => map.iter().any(|(key, nested)| {
            let flagged = key_looks_like_id(key)
                && matches!(nested, Value::String(s) if !is_valid_object_id(s));
            flagged || contains_invalid_ids(nested)
        }),
        _ => false,
    }
}

fn key_looks_like_id(key: &str) -> bool {
    key.to_ascii_lowercase().contains("id")
}

/// Check that a listing-like record has the shape the marketplace
/// requires: `id`, `title`, `description`, `kind`, `price`, `seller_id`
/// with the right JSON types, id fields well-formed, a recognized kind,
/// and a positive price for sale listings.
///
/// Returns one message per violated rule; never panics.
#[must_use]
pub fn validate_listing_shape(value: &Value) -> ShapeReport {
    let mut errors = Vec::new();

    let Some(map) = value.as_object() else {
        return ShapeReport {
            valid: false,
            errors: vec!["listing must be an object".to_owned()],
        };
    };

    // price is the only numeric field; everything else is a string.
    const REQUIRED: [(&str, &str); 6] = [
        ("id", "string"),
        ("title", "string"),
        ("description", "string"),
        ("kind", "string"),
        ("price", "number"),
        ("seller_id", "string"),
    ];

    for (field, expected) in REQUIRED {
        match map.get(field) {
            None => errors.push(format!("field '{field}' is required")),
            Some(found) => {
                let type_ok = match expected {
                    "number" => found.is_number(),
                    _ => found.is_string(),
                };
                if !type_ok {
                    errors.push(format!("field '{field}' must be a {expected}"));
                } else if key_looks_like_id(field)
                    && !found.as_str().is_some_and(is_valid_object_id)
                {
                    errors.push(format!("field '{field}' must be a valid object id"));
                }
            }
        }
    }

    let kind = map.get("kind").and_then(Value::as_str);
    if let Some(kind) = kind
        && !matches!(kind, "sale" | "trade" | "wanted")
    {
        errors.push("unrecognized listing kind".to_owned());
    }

    if kind == Some("sale") {
        let price_positive = map
            .get("price")
            .and_then(Value::as_f64)
            .is_some_and(|p| p > 0.0);
        if !price_positive {
            errors.push("price must be positive for sale listings".to_owned());
        }
    }

    ShapeReport {
        valid: errors.is_empty(),
        errors,
    }
}
