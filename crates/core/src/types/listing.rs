//! Marketplace listing types.
//!
//! A [`Listing`] is the record the surrounding application hands to the
//! cart when the user clicks "add to cart". The cart never fetches
//! listings itself; it only snapshots the display fields it needs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{GameId, ListingId, UserId};

/// Error returned when parsing an unrecognized listing kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized listing kind: {0}")]
pub struct ListingKindError(pub String);

/// The kind of a marketplace listing.
///
/// Only [`Sale`](Self::Sale) listings carry a purchase price and can be
/// added to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// The seller offers the item for a fixed price.
    Sale,
    /// The seller wants to trade the item for another.
    Trade,
    /// The poster is looking for the item.
    Wanted,
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Trade => write!(f, "trade"),
            Self::Wanted => write!(f, "wanted"),
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = ListingKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "trade" => Ok(Self::Trade),
            "wanted" => Ok(Self::Wanted),
            _ => Err(ListingKindError(s.to_owned())),
        }
    }
}

/// Reference to the game a listing is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameRef {
    /// Id of the game record, when known.
    #[serde(default)]
    pub id: Option<GameId>,
    /// Display name of the game.
    #[serde(default)]
    pub name: Option<String>,
    /// Cover image for the game.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A marketplace listing as supplied by the surrounding application.
///
/// Optional fields default to `None` when the caller's payload omits
/// them; the cart falls back to the game reference for display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing id.
    pub id: ListingId,
    /// Listing title, shown in the cart.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Sale, trade, or wanted.
    pub kind: ListingKind,
    /// Asking price. Required for sale listings, absent otherwise.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Image uploaded with the listing.
    #[serde(default)]
    pub image_url: Option<String>,
    /// The game this listing is about.
    #[serde(default)]
    pub game: Option<GameRef>,
    /// Platform the copy runs on (e.g. "PS5").
    #[serde(default)]
    pub platform: Option<String>,
    /// Physical condition of the copy.
    #[serde(default)]
    pub condition: Option<String>,
    /// Id of the user who posted the listing.
    pub seller_id: UserId,
    /// Display name of the seller.
    #[serde(default)]
    pub seller_name: Option<String>,
}

impl Listing {
    /// The image to display for this listing: the listing's own image,
    /// falling back to the game's cover.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or_else(|| self.game.as_ref().and_then(|g| g.image_url.as_deref()))
    }

    /// The game name to display, when a game reference is attached.
    #[must_use]
    pub fn game_name(&self) -> Option<&str> {
        self.game.as_ref().and_then(|g| g.name.as_deref())
    }
}
