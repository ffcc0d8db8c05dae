//! Wire types for the order/cart service.
//!
//! The service speaks plain JSON, with one quirk: an order's line items
//! arrive as a JSON-encoded *string* that needs a secondary decode. That
//! decode is modeled as an explicit typed step with its own failure mode
//! ([`super::ServiceError::MalformedOrder`]) instead of an unchecked parse.

use serde::{Deserialize, Serialize};

use tangelo_core::{CartItem, Order, OrderId};

use super::ServiceError;

/// Cart payload exchanged with the service (both push and pull).
#[derive(Debug, Serialize, Deserialize)]
pub struct CartPayload {
    /// The cart's line items.
    pub items: Vec<CartItem>,
}

/// Response envelope for `GET orders/all`.
#[derive(Debug, Deserialize)]
pub struct OrdersResponse {
    /// Raw order records, still carrying encoded line items.
    pub orders: Vec<OrderRecord>,
}

/// An order as it appears on the wire.
///
/// `order_items` is a JSON-encoded array of line items and the status flags
/// are `0|1` integers; [`OrderRecord::decode`] turns this into a typed
/// [`Order`].
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub order_items: String,
    pub total_price: i64,
    pub is_paid: u8,
    pub is_delivered: u8,
}

impl OrderRecord {
    /// Decode the wire record into a typed [`Order`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MalformedOrder`] if the embedded
    /// `order_items` string is not a valid line item array.
    pub fn decode(self) -> Result<Order, ServiceError> {
        let id = OrderId::new(self.id);
        let items: Vec<CartItem> = serde_json::from_str(&self.order_items)
            .map_err(|_| ServiceError::MalformedOrder(id))?;

        Ok(Order {
            id,
            items,
            total_price: self.total_price,
            is_paid: self.is_paid != 0,
            is_delivered: self.is_delivered != 0,
        })
    }
}

/// Request body for `POST orders/updateorder`.
#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    #[serde(rename = "orderID")]
    pub order_id: i64,
    #[serde(rename = "isPaid")]
    pub is_paid: u8,
    #[serde(rename = "isDelivered")]
    pub is_delivered: u8,
}

impl StatusUpdateRequest {
    /// Build a status update from the typed flags.
    #[must_use]
    pub fn new(order_id: OrderId, is_paid: bool, is_delivered: bool) -> Self {
        Self {
            order_id: order_id.as_i64(),
            is_paid: u8::from(is_paid),
            is_delivered: u8::from(is_delivered),
        }
    }
}

// =============================================================================
// Account wire types
// =============================================================================

/// Request body for `POST users/signin`.
#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST users/signup`.
#[derive(Debug, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST users/update`.
#[derive(Debug, Serialize)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub name: String,
}

/// Response envelope shared by the account endpoints.
///
/// On failure the service answers `{ "status": "error", "message": … }`
/// with a 200; on success the sign-in variant carries token and profile.
#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AccountResponse {
    /// Whether the service reported an application-level error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    /// The service's error message, or a generic fallback.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "request rejected by service".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_record_decode() {
        let record = OrderRecord {
            id: 12,
            order_items:
                r#"[{"id":3,"title":"Jacket","price":55.99,"image":"https://img.example/3.jpg","quantity":2}]"#
                    .to_string(),
            total_price: 11198,
            is_paid: 1,
            is_delivered: 0,
        };

        let order = record.decode().unwrap();
        assert_eq!(order.id, OrderId::new(12));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert!(order.is_paid);
        assert!(!order.is_delivered);
    }

    #[test]
    fn test_order_record_decode_malformed_items() {
        let record = OrderRecord {
            id: 12,
            order_items: "not json at all".to_string(),
            total_price: 100,
            is_paid: 0,
            is_delivered: 0,
        };

        assert!(matches!(
            record.decode(),
            Err(ServiceError::MalformedOrder(id)) if id == OrderId::new(12)
        ));
    }

    #[test]
    fn test_status_update_wire_keys() {
        let request = StatusUpdateRequest::new(OrderId::new(7), true, false);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["orderID"], 7);
        assert_eq!(json["isPaid"], 1);
        assert_eq!(json["isDelivered"], 0);
    }

    #[test]
    fn test_account_response_error_detection() {
        let response: AccountResponse =
            serde_json::from_str(r#"{"status":"error","message":"bad password"}"#).unwrap();
        assert!(response.is_error());
        assert_eq!(response.error_message(), "bad password");

        let ok: AccountResponse = serde_json::from_str(
            r#"{"token":"t","name":"Ana","email":"ana@example.com"}"#,
        )
        .unwrap();
        assert!(!ok.is_error());
    }
}
