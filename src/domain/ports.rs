//! Capability boundaries of the session engine.
//!
//! The engine depends on these interfaces but implements none of them
//! natively; production code injects real adapters, tests inject fakes.

use super::api::{
    CouponValidationRequest, CouponValidationResponse, CreateOrderRequest, PaymentOrderResponse,
    VerifyPaymentRequest,
};
use super::cart::CartItem;
use super::checkout::Order;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Durable key-value persistence for the cart item list.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Rehydrates the persisted item list.
    ///
    /// Missing or malformed data degrades to an empty list; rehydration is
    /// infallible by contract.
    async fn load(&self) -> Vec<CartItem>;

    /// Overwrites the stored representation. Awaited after every cart
    /// mutation, never batched or debounced.
    async fn save(&self, items: &[CartItem]) -> Result<()>;
}

/// The remote commerce backend, one method per endpoint consumed.
///
/// Bearer credentials and 401 handling belong to the transport adapter
/// behind this trait, not to the engine.
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    async fn validate_coupon(
        &self,
        request: CouponValidationRequest,
    ) -> Result<CouponValidationResponse>;

    async fn create_order(&self, request: CreateOrderRequest) -> Result<PaymentOrderResponse>;

    async fn confirm_cod(&self, order_id: u64) -> Result<Order>;

    async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<Order>;
}

/// Parameters handed to the external gateway when opening its session.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    pub key: String,
    pub amount_minor: i64,
    pub currency: String,
    pub order_id: String,
    pub prefill: CustomerPrefill,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Identifiers the gateway supplies on a successful payment.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCompletion {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// The third-party payment widget.
///
/// Its UI is fully external; the engine's responsibility ends at invoking
/// `open` with correct parameters and resuming on the completion it yields.
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    /// One-time lazy load of the external capability. Must resolve to ready
    /// or failed rather than hang; the orchestrator additionally bounds it
    /// with a timeout.
    async fn load(&self) -> Result<()>;

    async fn open(&self, options: GatewayOptions) -> Result<GatewayCompletion>;
}

pub type CartRepositoryBox = Box<dyn CartRepository>;
pub type CommerceBackendHandle = Arc<dyn CommerceBackend>;
pub type PaymentGatewayBox = Box<dyn PaymentGatewayClient>;
