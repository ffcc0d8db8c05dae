//! Tangelo Core - Shared cart and order types.
//!
//! This crate provides the pure state of the Tangelo storefront client:
//! - [`cart`] - The in-memory cart and its reducer-style mutations
//! - [`orders`] - Orders and their lifecycle classification
//! - [`types`] - Newtype wrappers for type-safe IDs
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no storage. Every mutation here is synchronous and deterministic;
//! persistence and network synchronization live in `tangelo-client`, which
//! drives these types from its sync coordinator.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod orders;
pub mod types;

pub use cart::{CartError, CartItem, CartState};
pub use orders::{Order, OrderBuckets};
pub use types::*;
