//! GameSwap Core - Shared types library.
//!
//! This crate provides the domain types shared by the GameSwap client
//! components:
//! - `cart` - Persisted cart store and data validation
//! - `integration-tests` - Cross-crate test suite
//!
//! # Architecture
//!
//! The core crate contains only types and validation helpers - no I/O and
//! no storage access. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Object-id newtypes, listing kinds, and the listing record
//!   handed to the cart by the surrounding application

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
