//! Unified error type for coordinator operations.

use thiserror::Error;

use tangelo_core::CartError;

use crate::remote::ServiceError;

/// Errors surfaced by [`crate::sync::SyncCoordinator`] operations.
///
/// Only a subset of engine failures ever reach the caller: cart contract
/// violations, checkout/status-flip failures, and calling an operation that
/// needs a session without one. Push and cache failures are logged and
/// swallowed by design.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Cart mutation contract violation.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Remote service failure on an operation that must surface it.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// The operation requires a signed-in session.
    #[error("No active session")]
    NoSession,
}
