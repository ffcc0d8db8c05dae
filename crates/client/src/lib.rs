//! Tangelo Client - cart and order state-synchronization engine.
//!
//! This crate keeps the in-memory cart (`tangelo-core`) consistent with a
//! persisted local cache and with the authoritative remote order/cart
//! service, and classifies orders into lifecycle buckets for badge counts
//! and tabbed views.
//!
//! # Architecture
//!
//! - [`sync::SyncCoordinator`] - orchestrates everything: applies cart
//!   mutations synchronously, then persists and pushes best-effort; pulls
//!   remote state on session start and lets it win (last-pull-wins)
//! - [`remote`] - the boundary to the order/cart service; network calls
//!   only, no business logic
//! - [`cache`] - durable local mirror of the cart so it survives a cold
//!   start before the first remote pull completes
//! - [`catalog`] - read-only public catalog client, cached via `moka`;
//!   feeds `add_item` inputs and is otherwise outside the sync core
//!
//! Failures degrade, they do not block: a failed push or cache write is
//! logged and the cart keeps working from memory. Checkout is the one
//! operation whose failure is surfaced to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use tangelo_client::cache::FileCartCache;
//! use tangelo_client::config::ClientConfig;
//! use tangelo_client::remote::HttpOrderService;
//! use tangelo_client::sync::SyncCoordinator;
//!
//! let config = ClientConfig::from_env()?;
//! let service = HttpOrderService::new(&config)?;
//! let session = service.sign_in("you@example.com", "secret").await?;
//!
//! let cache = FileCartCache::new(&config.cache_dir);
//! let engine = SyncCoordinator::new(service, cache);
//! engine.start_session(session).await;
//! engine.add_item(item, 2).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod error;
pub mod remote;
pub mod sync;

pub use cache::{CacheError, CartCache, FileCartCache, MemoryCartCache};
pub use catalog::{CatalogClient, CatalogProduct};
pub use config::{ClientConfig, ConfigError};
pub use credential::{Credential, Profile, Session};
pub use error::SyncError;
pub use remote::{HttpOrderService, OrderService, ServiceError};
pub use sync::{Badges, SyncCoordinator, SyncPhase};
