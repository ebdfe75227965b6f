//! Cart error types.
//!
//! Nothing in this crate panics on user input or corrupt storage; failure
//! paths surface as values of these enums (or as counts inside the
//! validator's report types). Messages are user-facing.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors a cart mutation can report.
#[derive(Debug, Error)]
pub enum CartError {
    /// The storage backend rejected the write.
    #[error("could not save the cart: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be encoded for persistence.
    #[error("could not encode the cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// `add` was called with a zero quantity.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Only sale listings can be added to the cart.
    #[error("only sale listings can be added to the cart")]
    NotForSale,

    /// The listing has no price, or a non-positive one.
    #[error("listing has no valid price")]
    InvalidPrice,
}

/// Reasons a cart fails checkout validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Items without a positive price.
    #[error("{count} item(s) without a valid price")]
    InvalidPrice {
        /// Number of offending items.
        count: usize,
    },

    /// Items with a zero quantity.
    #[error("{count} item(s) with an invalid quantity")]
    InvalidQuantity {
        /// Number of offending items.
        count: usize,
    },

    /// The buyer owns some of the listings in the cart.
    #[error("you cannot buy your own listings ({count} item(s))")]
    OwnListings {
        /// Number of offending items.
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_messages() {
        assert_eq!(CheckoutError::EmptyCart.to_string(), "cart is empty");
        assert_eq!(
            CheckoutError::InvalidPrice { count: 2 }.to_string(),
            "2 item(s) without a valid price"
        );
        assert_eq!(
            CheckoutError::OwnListings { count: 1 }.to_string(),
            "you cannot buy your own listings (1 item(s))"
        );
    }

    #[test]
    fn test_cart_error_from_storage() {
        let err: CartError = StorageError::Unavailable("down".to_owned()).into();
        assert!(matches!(err, CartError::Storage(_)));
    }
}
