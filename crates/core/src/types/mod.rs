//! Domain types for the GameSwap client.

pub mod id;
pub mod listing;

pub use id::{GameId, ListingId, ObjectIdError, UserId, is_valid_object_id};
pub use listing::{GameRef, Listing, ListingKind, ListingKindError};
