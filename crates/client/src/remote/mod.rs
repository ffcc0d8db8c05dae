//! The boundary to the remote order/cart service.
//!
//! Network calls only - no business logic. Each operation is an independent
//! HTTP request carrying the caller's bearer credential; nothing here
//! retries, queues, or serializes calls. A failed call is terminal for that
//! attempt and the coordinator decides what (if anything) to do about it.

pub mod types;

use async_trait::async_trait;
use tracing::{error, instrument};
use url::Url;

use tangelo_core::{CartItem, Order, OrderId};

use crate::config::ClientConfig;
use crate::credential::{Credential, Profile, Session};

use types::{
    AccountResponse, CartPayload, OrdersResponse, SignInRequest, SignUpRequest,
    StatusUpdateRequest, UpdateProfileRequest,
};

/// Errors from the order/cart service boundary.
///
/// Always non-fatal to the engine core: the coordinator degrades to its
/// in-memory answer, and only checkout and status flips surface these to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// HTTP transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status code.
    #[error("Service returned status {0}")]
    Status(reqwest::StatusCode),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An order record's embedded line items failed the secondary decode.
    #[error("Malformed order {0}: embedded line items are not a valid JSON array")]
    MalformedOrder(OrderId),

    /// The service rejected the request at the application level.
    #[error("Rejected by service: {0}")]
    Rejected(String),
}

/// Boundary operations against the order/cart service.
///
/// The coordinator is generic over this trait so tests can drive it with an
/// in-memory fake; [`HttpOrderService`] is the production implementation.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Overwrite the server-side cart with the given items.
    async fn push_cart(
        &self,
        credential: &Credential,
        items: &[CartItem],
    ) -> Result<(), ServiceError>;

    /// Fetch the authoritative server-side cart.
    async fn pull_cart(&self, credential: &Credential) -> Result<Vec<CartItem>, ServiceError>;

    /// Fetch all of the user's orders.
    async fn pull_orders(&self, credential: &Credential) -> Result<Vec<Order>, ServiceError>;

    /// Flip an order's pay/deliver status flags.
    async fn set_order_status(
        &self,
        credential: &Credential,
        order_id: OrderId,
        is_paid: bool,
        is_delivered: bool,
    ) -> Result<(), ServiceError>;

    /// Convert the given cart into a new server-side order (checkout).
    ///
    /// The server clears its copy of the cart as part of this call.
    async fn place_order(
        &self,
        credential: &Credential,
        items: &[CartItem],
    ) -> Result<(), ServiceError>;
}

/// HTTP implementation of [`OrderService`], plus the account endpoints.
#[derive(Debug, Clone)]
pub struct HttpOrderService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderService {
    /// Create a service client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Build a full endpoint URL. The base URL always ends with a slash.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map non-success responses to `ServiceError::Status`, logging an
    /// excerpt of the body for diagnostics.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            status = %status,
            body = %body.chars().take(200).collect::<String>(),
            "Service returned non-success status"
        );
        Err(ServiceError::Status(status))
    }

    // =========================================================================
    // Account Methods
    // =========================================================================

    /// Sign in and obtain a session.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` when the service reports invalid
    /// credentials, or a transport/parse error otherwise.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let response = self
            .client
            .post(self.endpoint("users/signin"))
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let body: AccountResponse = Self::check(response).await?.json().await?;
        if body.is_error() {
            return Err(ServiceError::Rejected(body.error_message()));
        }

        let token = body
            .token
            .ok_or_else(|| ServiceError::Rejected("sign-in response missing token".to_string()))?;

        Ok(Session {
            credential: Credential::new(token),
            profile: Profile {
                name: body.name.unwrap_or_default(),
                email: body.email.unwrap_or_else(|| email.to_string()),
            },
        })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Rejected` when the service refuses the
    /// registration (e.g., email already in use).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("users/signup"))
            .json(&SignUpRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let body: AccountResponse = Self::check(response).await?.json().await?;
        if body.is_error() {
            return Err(ServiceError::Rejected(body.error_message()));
        }
        Ok(())
    }

    /// Update the signed-in user's display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the update or the request
    /// fails.
    #[instrument(skip(self, credential))]
    pub async fn update_profile(
        &self,
        credential: &Credential,
        profile: &Profile,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("users/update"))
            .bearer_auth(credential.token())
            .json(&UpdateProfileRequest {
                email: profile.email.clone(),
                name: profile.name.clone(),
            })
            .send()
            .await?;

        let body: AccountResponse = Self::check(response).await?.json().await?;
        if body.is_error() {
            return Err(ServiceError::Rejected(body.error_message()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[instrument(skip(self, credential, items), fields(count = items.len()))]
    async fn push_cart(
        &self,
        credential: &Credential,
        items: &[CartItem],
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .put(self.endpoint("cart"))
            .bearer_auth(credential.token())
            .json(&CartPayload {
                items: items.to_vec(),
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, credential))]
    async fn pull_cart(&self, credential: &Credential) -> Result<Vec<CartItem>, ServiceError> {
        let response = self
            .client
            .get(self.endpoint("cart"))
            .bearer_auth(credential.token())
            .send()
            .await?;

        let payload: CartPayload = Self::check(response).await?.json().await?;
        Ok(payload.items)
    }

    #[instrument(skip(self, credential))]
    async fn pull_orders(&self, credential: &Credential) -> Result<Vec<Order>, ServiceError> {
        let response = self
            .client
            .get(self.endpoint("orders/all"))
            .bearer_auth(credential.token())
            .send()
            .await?;

        let payload: OrdersResponse = Self::check(response).await?.json().await?;
        payload
            .orders
            .into_iter()
            .map(types::OrderRecord::decode)
            .collect()
    }

    #[instrument(skip(self, credential), fields(order_id = %order_id))]
    async fn set_order_status(
        &self,
        credential: &Credential,
        order_id: OrderId,
        is_paid: bool,
        is_delivered: bool,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("orders/updateorder"))
            .bearer_auth(credential.token())
            .json(&StatusUpdateRequest::new(order_id, is_paid, is_delivered))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, credential, items), fields(count = items.len()))]
    async fn place_order(
        &self,
        credential: &Credential,
        items: &[CartItem],
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.endpoint("orders/placeorder"))
            .bearer_auth(credential.token())
            .json(&CartPayload {
                items: items.to_vec(),
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig {
            api_base_url: Url::parse(base).unwrap(),
            catalog_base_url: Url::parse("https://fakestoreapi.com/").unwrap(),
            cache_dir: std::env::temp_dir(),
            request_timeout: std::time::Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let service = HttpOrderService::new(&config("https://shop.example.com/api/")).unwrap();
        assert_eq!(
            service.endpoint("orders/all"),
            "https://shop.example.com/api/orders/all"
        );
        assert_eq!(service.endpoint("cart"), "https://shop.example.com/api/cart");
    }
}
