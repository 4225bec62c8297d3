//! Request/response bodies for the four backend calls this engine makes.
//!
//! Field casing mirrors the backend's JSON. All monetary fields are integer
//! minor units; the backend recomputes totals authoritatively and nothing
//! price-shaped is ever trusted from the client side.

use super::checkout::{Coupon, PaymentMethod};
use serde::{Deserialize, Serialize};

/// `POST coupons/validate`
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationRequest {
    pub coupon_code: String,
    pub order_amount_minor: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidationResponse {
    pub valid: bool,
    pub message: String,
    pub discount_minor: i64,
    pub final_amount_minor: i64,
    pub coupon: Option<Coupon>,
}

/// `POST payments/create-order`
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOrderResponse {
    pub order_id: u64,
    /// Absent for COD orders, which never touch the gateway.
    pub gateway_order_id: Option<String>,
    pub gateway_key: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

/// `POST payments/verify`
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_wire_shape() {
        let request = CreateOrderRequest {
            items: vec![OrderItemRequest {
                product_id: 3,
                quantity: 2,
            }],
            shipping_address: ShippingAddress {
                full_name: "Asha Rao".into(),
                address_line1: "12 Hill Road".into(),
                address_line2: None,
                city: "Mumbai".into(),
                state: "MH".into(),
                postal_code: "400050".into(),
                country: "IN".into(),
            },
            coupon_code: Some("WELCOME10".into()),
            payment_method: PaymentMethod::Upi,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"productId\":3"));
        assert!(json.contains("\"shippingAddress\""));
        assert!(json.contains("\"paymentMethod\":\"UPI\""));
    }

    #[test]
    fn test_payment_order_response_without_gateway_fields() {
        // COD responses omit the gateway order id and key.
        let json = r#"{
            "orderId": 42,
            "gatewayOrderId": null,
            "gatewayKey": null,
            "amountMinor": 10000,
            "currency": "INR",
            "customerName": "Asha Rao",
            "customerEmail": "asha@example.com",
            "customerPhone": "9999999999"
        }"#;
        let response: PaymentOrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.order_id, 42);
        assert!(response.gateway_order_id.is_none());
    }
}
