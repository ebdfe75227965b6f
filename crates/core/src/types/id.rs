//! Newtype ids for type-safe entity references.
//!
//! Backend entities are addressed by 24-character hexadecimal object ids.
//! Use the `define_object_id!` macro to create type-safe wrappers that
//! prevent accidentally mixing ids from different entity types.

/// Errors that can occur when parsing an object id.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// The input string is empty.
    #[error("object id cannot be empty")]
    Empty,
    /// The input has the wrong length.
    #[error("object id must be exactly {expected} characters (got {got})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the rejected input.
        got: usize,
    },
    /// The input contains a non-hexadecimal character.
    #[error("object id must contain only hexadecimal characters")]
    NotHex,
}

/// Length of a well-formed object id.
pub const OBJECT_ID_LENGTH: usize = 24;

/// Returns `true` iff `value` is a string of exactly 24 hexadecimal
/// characters.
///
/// This is the single definition of "well-formed id" used everywhere:
/// the id newtypes parse with it and the data validator re-checks
/// persisted values against it.
#[must_use]
pub fn is_valid_object_id(value: &str) -> bool {
    value.len() == OBJECT_ID_LENGTH && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Macro to define a type-safe object-id wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - a validating `parse()` constructor (24 hex characters)
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`; deserialization
///   is deliberately lenient (any string is accepted) because persisted
///   values are re-validated by the cleaning pass, not at decode time
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `as_str()`, `into_inner()`, `Display`, `FromStr`, `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use gameswap_core::define_object_id;
/// define_object_id!(SessionId);
///
/// let id = SessionId::parse("507f1f77bcf86cd799439011").unwrap();
/// assert_eq!(id.as_str(), "507f1f77bcf86cd799439011");
/// assert!(SessionId::parse("not-an-id").is_err());
/// ```
#[macro_export]
macro_rules! define_object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an id from a string, validating the 24-hex shape.
            ///
            /// # Errors
            ///
            /// Returns [`ObjectIdError`](crate::types::id::ObjectIdError)
            /// if the input is empty, has the wrong length, or contains a
            /// non-hexadecimal character.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::ObjectIdError> {
                if s.is_empty() {
                    return Err($crate::types::id::ObjectIdError::Empty);
                }
                if s.len() != $crate::types::id::OBJECT_ID_LENGTH {
                    return Err($crate::types::id::ObjectIdError::WrongLength {
                        expected: $crate::types::id::OBJECT_ID_LENGTH,
                        got: s.len(),
                    });
                }
                if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err($crate::types::id::ObjectIdError::NotHex);
                }
                Ok(Self(s.to_owned()))
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the id and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::types::id::ObjectIdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_object_id!(
    /// Id of a marketplace listing.
    ListingId
);
define_object_id!(
    /// Id of a user (seller or buyer).
    UserId
);
define_object_id!(
    /// Id of a game referenced by a listing.
    GameId
);
