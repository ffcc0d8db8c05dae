//! The sync coordinator: one owned state container for cart and orders.
//!
//! All engine state lives behind this coordinator. Screens read snapshots
//! (or subscribe to [`Badges`]) and never mutate shared state directly;
//! mutations come in through the operations here and re-enter the cart
//! serially, so the pure [`CartState`] needs no locking of its own.
//!
//! # State machine
//!
//! `Anonymous -> Syncing` on session start (sign-in or resume with a stored
//! credential): pull the remote cart and orders and let them win
//! (last-pull-wins); on any pull failure, degrade to whatever the local
//! cache holds and reach `Ready` anyway - a network fault never blocks the
//! UI. `Ready -> Mutating -> Ready` around each cart mutation: the change
//! is applied synchronously and visible immediately, then persisted and
//! pushed best-effort (last-write-wins, optimistic). `-> Anonymous` on
//! sign-out, clearing everything.
//!
//! Pushes from successive mutations are deliberately not serialized with
//! one another; the last push to land on the server determines server
//! state. Adding a monotonic sequence check at the adapter boundary would
//! strengthen this, at the cost of a protocol change.

use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use rust_decimal::Decimal;
use tangelo_core::{CartItem, CartState, OrderBuckets, OrderId, ProductId};

use crate::cache::CartCache;
use crate::credential::{Credential, Profile, Session};
use crate::error::SyncError;
use crate::remote::OrderService;

/// Where the engine is in its session/sync lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No credential; remote calls are skipped, cart works locally.
    Anonymous,
    /// Pulling remote state after a session started.
    Syncing,
    /// Idle with a session; remote mirror is as fresh as the last sync.
    Ready,
    /// A cart mutation is being applied.
    Mutating,
}

/// Badge counts consumed by the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Badges {
    /// Total units in the cart (cart tab badge).
    pub cart_items: u32,
    /// Number of pending (new) orders (orders tab badge).
    pub pending_orders: usize,
}

/// Read-only snapshot of the cart for rendering.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Current line items.
    pub items: Vec<CartItem>,
    /// Total units across all lines.
    pub item_count: u32,
    /// Sum of all line prices.
    pub subtotal: Decimal,
}

/// Mutable engine state, guarded by the coordinator's mutex.
struct EngineState {
    phase: SyncPhase,
    session: Option<Session>,
    cart: CartState,
    buckets: OrderBuckets,
}

/// Orchestrates the cart store, the local cache, and the remote service.
///
/// Generic over the service and cache boundaries so tests can drive the
/// whole engine with in-memory fakes.
pub struct SyncCoordinator<S, C> {
    service: S,
    cache: C,
    state: Mutex<EngineState>,
    badges: watch::Sender<Badges>,
}

impl<S, C> SyncCoordinator<S, C>
where
    S: OrderService,
    C: CartCache,
{
    /// Create a coordinator in the `Anonymous` phase with an empty cart.
    #[must_use]
    pub fn new(service: S, cache: C) -> Self {
        let (badges, _) = watch::channel(Badges::default());
        Self {
            service,
            cache,
            state: Mutex::new(EngineState {
                phase: SyncPhase::Anonymous,
                session: None,
                cart: CartState::new(),
                buckets: OrderBuckets::default(),
            }),
            badges,
        }
    }

    // =========================================================================
    // Read projections
    // =========================================================================

    /// The current lifecycle phase.
    pub async fn phase(&self) -> SyncPhase {
        self.state.lock().await.phase
    }

    /// Snapshot of the cart for the cart screen.
    pub async fn cart(&self) -> CartSnapshot {
        let state = self.state.lock().await;
        CartSnapshot {
            items: state.cart.items().to_vec(),
            item_count: state.cart.item_count(),
            subtotal: state.cart.subtotal(),
        }
    }

    /// Snapshot of the order buckets for the orders screen.
    pub async fn orders(&self) -> OrderBuckets {
        self.state.lock().await.buckets.clone()
    }

    /// The signed-in profile, if any.
    pub async fn profile(&self) -> Option<Profile> {
        self.state
            .lock()
            .await
            .session
            .as_ref()
            .map(|session| session.profile.clone())
    }

    /// Subscribe to badge count changes.
    ///
    /// The receiver always reflects the latest counts; consumers that only
    /// render badges need no other state access.
    #[must_use]
    pub fn badges(&self) -> watch::Receiver<Badges> {
        self.badges.subscribe()
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Start a session: `Anonymous -> Syncing -> Ready`.
    ///
    /// Pulls the remote cart and orders as ground truth. On pull failure the
    /// engine degrades to the local cache (or the previous classification
    /// for orders) and still reaches `Ready`.
    #[instrument(skip(self, session))]
    pub async fn start_session(&self, session: Session) {
        {
            let mut state = self.state.lock().await;
            state.phase = SyncPhase::Syncing;
            state.session = Some(session);
        }
        self.sync_from_remote().await;
    }

    /// Re-run the sync cycle (app resume with an existing session).
    ///
    /// A no-op when anonymous.
    #[instrument(skip(self))]
    pub async fn resume(&self) {
        {
            let mut state = self.state.lock().await;
            if state.session.is_none() {
                return;
            }
            state.phase = SyncPhase::Syncing;
        }
        self.sync_from_remote().await;
    }

    /// Sign out: clear credential, cache, cart, and order counts.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        {
            let mut state = self.state.lock().await;
            state.session = None;
            state.phase = SyncPhase::Anonymous;
            state.cart.replace_all(Vec::new());
            state.buckets = OrderBuckets::default();
            self.publish_badges(&state);
        }

        if let Err(error) = self.cache.clear().await {
            warn!(%error, "failed to clear local cart cache on sign-out");
        }
        info!("signed out; engine reset to anonymous");
    }

    // =========================================================================
    // Cart mutations (optimistic, local-first)
    // =========================================================================

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cart`] if `quantity` is zero; the cart is left
    /// untouched in that case.
    #[instrument(skip(self, item), fields(product_id = %item.id, quantity))]
    pub async fn add_item(&self, item: CartItem, quantity: u32) -> Result<(), SyncError> {
        self.apply_mutation(|cart| cart.add_item(item, quantity)).await
    }

    /// Set the quantity of an existing line (zero removes it).
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Cart`] if the line does not exist and
    /// `new_quantity` is positive.
    #[instrument(skip(self), fields(product_id = %id, new_quantity))]
    pub async fn set_quantity(&self, id: ProductId, new_quantity: u32) -> Result<(), SyncError> {
        self.apply_mutation(|cart| cart.set_quantity(id, new_quantity))
            .await
    }

    /// Remove a line from the cart. A no-op when the line is absent.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_item(&self, id: ProductId) {
        // remove_item cannot fail; the shared path only propagates Ok
        let _ = self
            .apply_mutation(|cart| {
                cart.remove_item(id);
                Ok(())
            })
            .await;
    }

    /// Apply a cart mutation synchronously, then persist and push
    /// best-effort outside the lock.
    async fn apply_mutation<F>(&self, mutate: F) -> Result<(), SyncError>
    where
        F: FnOnce(&mut CartState) -> Result<(), tangelo_core::CartError>,
    {
        let (items, credential) = {
            let mut state = self.state.lock().await;
            let was_ready = state.phase == SyncPhase::Ready;
            if was_ready {
                state.phase = SyncPhase::Mutating;
            }
            let result = mutate(&mut state.cart);
            if was_ready {
                state.phase = SyncPhase::Ready;
            }
            result?;

            self.publish_badges(&state);
            (
                state.cart.items().to_vec(),
                state
                    .session
                    .as_ref()
                    .map(|session| session.credential.clone()),
            )
        };

        // Lock released: rapid successive mutations may overlap here, so
        // the last push to land - not the last issued - wins on the server.
        if let Err(error) = self.cache.save(&items).await {
            warn!(%error, "failed to persist cart to local cache; continuing in memory");
        }

        let Some(credential) = credential else {
            return Ok(()); // no session: remote push skipped
        };
        if let Err(error) = self.service.push_cart(&credential, &items).await {
            warn!(%error, "cart push failed; remote mirror is stale until the next sync");
        }
        Ok(())
    }

    // =========================================================================
    // Checkout and order transitions
    // =========================================================================

    /// Convert the current cart into a new server-side order.
    ///
    /// On success the local and remote carts are cleared and the order
    /// buckets refreshed. On failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoSession`] without a session, or
    /// [`SyncError::Service`] if the service refuses the order - the one
    /// failure in the engine that blocks and must be acknowledged.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<(), SyncError> {
        let (items, credential) = {
            let state = self.state.lock().await;
            let Some(session) = state.session.as_ref() else {
                return Err(SyncError::NoSession);
            };
            (state.cart.items().to_vec(), session.credential.clone())
        };

        self.service.place_order(&credential, &items).await?;
        info!(count = items.len(), "order placed");

        {
            let mut state = self.state.lock().await;
            state.cart.replace_all(Vec::new());
            self.publish_badges(&state);
        }

        if let Err(error) = self.cache.clear().await {
            warn!(%error, "failed to clear local cart cache after checkout");
        }
        if let Err(error) = self.service.push_cart(&credential, &[]).await {
            warn!(%error, "failed to clear remote cart after checkout");
        }

        self.refresh_orders(&credential).await;
        Ok(())
    }

    /// Mark an order as paid, then refresh the buckets.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoSession`] without a session, or the service
    /// failure; local buckets are unchanged on failure.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn pay_order(&self, order_id: OrderId) -> Result<(), SyncError> {
        let credential = self.require_credential().await?;
        self.service
            .set_order_status(&credential, order_id, true, false)
            .await?;
        self.refresh_orders(&credential).await;
        Ok(())
    }

    /// Mark an order as delivered, then refresh the buckets.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NoSession`] without a session, or the service
    /// failure; local buckets are unchanged on failure.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn mark_delivered(&self, order_id: OrderId) -> Result<(), SyncError> {
        let credential = self.require_credential().await?;
        self.service
            .set_order_status(&credential, order_id, true, true)
            .await?;
        self.refresh_orders(&credential).await;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn require_credential(&self) -> Result<Credential, SyncError> {
        self.state
            .lock()
            .await
            .session
            .as_ref()
            .map(|session| session.credential.clone())
            .ok_or(SyncError::NoSession)
    }

    /// Pull remote cart and orders; remote wins, failures degrade.
    async fn sync_from_remote(&self) {
        let credential = {
            let state = self.state.lock().await;
            state
                .session
                .as_ref()
                .map(|session| session.credential.clone())
        };
        let Some(credential) = credential else {
            // Session vanished under us (sign-out during sync)
            return;
        };

        let items = match self.service.pull_cart(&credential).await {
            Ok(items) => items,
            Err(error) => {
                warn!(%error, "cart pull failed; falling back to local cache");
                self.cache.load().await.unwrap_or_else(|error| {
                    warn!(%error, "local cart cache unreadable; starting empty");
                    Vec::new()
                })
            }
        };

        let buckets = match self.service.pull_orders(&credential).await {
            Ok(orders) => Some(OrderBuckets::classify(orders)),
            Err(error) => {
                warn!(%error, "order pull failed; keeping previous classification");
                None
            }
        };

        let mut state = self.state.lock().await;
        state.cart.replace_all(items);
        if let Some(buckets) = buckets {
            state.buckets = buckets;
        }
        state.phase = SyncPhase::Ready;
        self.publish_badges(&state);
    }

    async fn refresh_orders(&self, credential: &Credential) {
        match self.service.pull_orders(credential).await {
            Ok(orders) => {
                let mut state = self.state.lock().await;
                state.buckets = OrderBuckets::classify(orders);
                self.publish_badges(&state);
            }
            Err(error) => {
                warn!(%error, "order refresh failed; badge counts may be stale");
            }
        }
    }

    fn publish_badges(&self, state: &EngineState) {
        self.badges.send_replace(Badges {
            cart_items: state.cart.item_count(),
            pending_orders: state.buckets.pending_count(),
        });
    }
}
