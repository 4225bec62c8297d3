use crate::domain::api::{
    CouponValidationRequest, CouponValidationResponse, CreateOrderRequest, PaymentOrderResponse,
    VerifyPaymentRequest,
};
use crate::domain::cart::CartItem;
use crate::domain::checkout::{Coupon, Order, OrderLineItem, OrderStatus};
use crate::domain::ports::{
    CartRepository, CommerceBackend, GatewayCompletion, GatewayOptions, PaymentGatewayClient,
};
use crate::error::{Result, StorefrontError};
use crate::money;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A volatile cart repository for tests and demo sessions.
///
/// `Clone` shares the underlying list, so a clone can stand in for a second
/// browser session against the same persisted cart.
#[derive(Default, Clone)]
pub struct InMemoryCartRepository {
    items: Arc<RwLock<Vec<CartItem>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn load(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    async fn save(&self, items: &[CartItem]) -> Result<()> {
        *self.items.write().await = items.to_vec();
        Ok(())
    }
}

/// Signature scheme shared by [`InMemoryBackend`] and [`InMemoryGateway`],
/// standing in for the real gateway's HMAC.
fn expected_signature(gateway_order_id: &str, payment_id: &str) -> String {
    format!("sig({gateway_order_id},{payment_id})")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    Percentage,
    Flat,
}

/// A coupon rule as the backend would hold it. Rule evaluation lives here
/// and only here; the engine never evaluates coupons client-side.
#[derive(Debug, Clone)]
pub struct CouponRule {
    pub code: String,
    pub description: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_order_minor: i64,
    pub max_discount_minor: Option<i64>,
    pub active: bool,
}

impl CouponRule {
    fn discount_for(&self, amount_minor: i64) -> i64 {
        let discount = match self.kind {
            DiscountKind::Percentage => amount_minor * self.value / 100,
            DiscountKind::Flat => self.value,
        };
        let discount = match self.max_discount_minor {
            Some(cap) => discount.min(cap),
            None => discount,
        };
        discount.min(amount_minor)
    }
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    price_minor: i64,
}

/// An in-memory stand-in for the remote commerce backend.
///
/// Recomputes order totals from its own catalog (client-supplied prices are
/// never trusted), evaluates coupon rules, and finalizes orders the way the
/// real backend does: COD confirmation moves an order to `Processing`,
/// signature verification moves it to `Paid`.
pub struct InMemoryBackend {
    catalog: HashMap<u64, CatalogEntry>,
    coupons: Vec<CouponRule>,
    orders: RwLock<HashMap<u64, Order>>,
    gateway_orders: RwLock<HashMap<String, u64>>,
    next_order_id: AtomicU64,
    fail_all: AtomicBool,
    fail_confirmations: AtomicBool,
    calls: std::sync::Mutex<Vec<&'static str>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            catalog: HashMap::new(),
            coupons: Vec::new(),
            orders: RwLock::new(HashMap::new()),
            gateway_orders: RwLock::new(HashMap::new()),
            next_order_id: AtomicU64::new(1),
            fail_all: AtomicBool::new(false),
            fail_confirmations: AtomicBool::new(false),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// The demo catalog and coupon book the original deployment seeds.
    pub fn with_demo_data() -> Self {
        Self::new()
            .with_product(1, "Mug", 1_000)
            .with_product(2, "Shirt", 2_450)
            .with_product(3, "Boots", 150_000)
            .with_coupon(CouponRule {
                code: "WELCOME10".into(),
                description: "10% off on orders above 500.00".into(),
                kind: DiscountKind::Percentage,
                value: 10,
                min_order_minor: 50_000,
                max_discount_minor: None,
                active: true,
            })
            .with_coupon(CouponRule {
                code: "SAVE500".into(),
                description: "Flat 500.00 off on orders above 2000.00".into(),
                kind: DiscountKind::Flat,
                value: 50_000,
                min_order_minor: 200_000,
                max_discount_minor: None,
                active: true,
            })
            .with_coupon(CouponRule {
                code: "MEGA20".into(),
                description: "20% off on orders above 3000.00".into(),
                kind: DiscountKind::Percentage,
                value: 20,
                min_order_minor: 300_000,
                max_discount_minor: Some(100_000),
                active: true,
            })
    }

    pub fn with_product(mut self, id: u64, name: &str, price_minor: i64) -> Self {
        self.catalog.insert(
            id,
            CatalogEntry {
                name: name.into(),
                price_minor,
            },
        );
        self
    }

    pub fn with_coupon(mut self, rule: CouponRule) -> Self {
        self.coupons.push(rule);
        self
    }

    /// Every request fails with a transport error.
    pub fn failing(self) -> Self {
        self.fail_all.store(true, Ordering::SeqCst);
        self
    }

    /// Order creation succeeds but confirmation/verification calls fail.
    pub fn failing_confirmations(self) -> Self {
        self.fail_confirmations.store(true, Ordering::SeqCst);
        self
    }

    /// Endpoint names invoked so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub async fn order(&self, order_id: u64) -> Option<Order> {
        self.orders.read().await.get(&order_id).cloned()
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check_reachable(&self) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(StorefrontError::Backend("connection refused".into()));
        }
        Ok(())
    }

    fn evaluate_coupon(&self, code: &str, amount_minor: i64) -> CouponValidationResponse {
        let rule = self
            .coupons
            .iter()
            .find(|rule| rule.code == code && rule.active);
        let Some(rule) = rule else {
            return CouponValidationResponse {
                valid: false,
                message: "Invalid or expired coupon code".into(),
                discount_minor: 0,
                final_amount_minor: amount_minor,
                coupon: None,
            };
        };
        if amount_minor < rule.min_order_minor {
            return CouponValidationResponse {
                valid: false,
                message: format!(
                    "Minimum order amount is {}",
                    money::from_minor_units(rule.min_order_minor)
                ),
                discount_minor: 0,
                final_amount_minor: amount_minor,
                coupon: None,
            };
        }
        let discount = rule.discount_for(amount_minor);
        CouponValidationResponse {
            valid: true,
            message: "Coupon applied successfully".into(),
            discount_minor: discount,
            final_amount_minor: money::payable_total_minor(amount_minor, discount),
            coupon: Some(Coupon {
                code: rule.code.clone(),
                description: rule.description.clone(),
                discount_minor: discount,
            }),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommerceBackend for InMemoryBackend {
    async fn validate_coupon(
        &self,
        request: CouponValidationRequest,
    ) -> Result<CouponValidationResponse> {
        self.record("validate_coupon");
        self.check_reachable()?;
        Ok(self.evaluate_coupon(&request.coupon_code, request.order_amount_minor))
    }

    async fn create_order(&self, request: CreateOrderRequest) -> Result<PaymentOrderResponse> {
        self.record("create_order");
        self.check_reachable()?;
        if request.items.is_empty() {
            return Err(StorefrontError::Backend(
                "order must contain at least one item".into(),
            ));
        }

        let mut subtotal = 0i64;
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            if item.quantity == 0 {
                return Err(StorefrontError::Backend("quantity must be at least 1".into()));
            }
            let entry = self.catalog.get(&item.product_id).ok_or_else(|| {
                StorefrontError::Backend(format!("unknown product {}", item.product_id))
            })?;
            subtotal += entry.price_minor * i64::from(item.quantity);
            lines.push(OrderLineItem {
                product_id: item.product_id,
                name: entry.name.clone(),
                quantity: item.quantity,
                price_minor: entry.price_minor,
            });
        }

        let discount = match &request.coupon_code {
            Some(code) => {
                let evaluation = self.evaluate_coupon(code, subtotal);
                if evaluation.valid { evaluation.discount_minor } else { 0 }
            }
            None => 0,
        };
        let total = money::payable_total_minor(subtotal, discount);

        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = Order {
            id: order_id,
            status: OrderStatus::PendingPayment,
            total_minor: total,
            discount_minor: discount,
            items: lines,
        };
        self.orders.write().await.insert(order_id, order);

        let gateway_order_id = if request.payment_method.is_cod() {
            None
        } else {
            let gateway_order_id = format!("gw_order_{order_id}");
            self.gateway_orders
                .write()
                .await
                .insert(gateway_order_id.clone(), order_id);
            Some(gateway_order_id)
        };
        Ok(PaymentOrderResponse {
            order_id,
            gateway_key: gateway_order_id.as_ref().map(|_| "key_demo".into()),
            gateway_order_id,
            amount_minor: total,
            currency: "INR".into(),
            customer_name: "Demo Shopper".into(),
            customer_email: "shopper@example.com".into(),
            customer_phone: "9999999999".into(),
        })
    }

    async fn confirm_cod(&self, order_id: u64) -> Result<Order> {
        self.record("confirm_cod");
        self.check_reachable()?;
        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err(StorefrontError::Backend("connection reset".into()));
        }

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StorefrontError::Backend(format!("order {order_id} not found")))?;
        if order.status != OrderStatus::PendingPayment {
            return Err(StorefrontError::Backend(
                "order is not awaiting payment".into(),
            ));
        }
        // COD payment stays pending until delivery; the order moves on.
        order.status = OrderStatus::Processing;
        Ok(order.clone())
    }

    async fn verify_payment(&self, request: VerifyPaymentRequest) -> Result<Order> {
        self.record("verify_payment");
        self.check_reachable()?;
        if self.fail_confirmations.load(Ordering::SeqCst) {
            return Err(StorefrontError::Backend("connection reset".into()));
        }

        let order_id = self
            .gateway_orders
            .read()
            .await
            .get(&request.gateway_order_id)
            .copied()
            .ok_or_else(|| {
                StorefrontError::Backend(format!(
                    "no order for gateway order {}",
                    request.gateway_order_id
                ))
            })?;
        let expected =
            expected_signature(&request.gateway_order_id, &request.gateway_payment_id);
        if request.gateway_signature != expected {
            return Err(StorefrontError::Backend("invalid payment signature".into()));
        }

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StorefrontError::Backend(format!("order {order_id} not found")))?;
        order.status = OrderStatus::Paid;
        Ok(order.clone())
    }
}

/// A gateway fake that resolves the payment synchronously, standing in for
/// the external widget whose callback the engine resumes on.
pub struct InMemoryGateway {
    load_calls: Arc<AtomicU32>,
    next_payment: AtomicU64,
    fail_load: bool,
    hang_load: bool,
    tamper: bool,
    decline: bool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            load_calls: Arc::new(AtomicU32::new(0)),
            next_payment: AtomicU64::new(1),
            fail_load: false,
            hang_load: false,
            tamper: false,
            decline: false,
        }
    }

    /// The external script fails to load.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// The external script load never resolves on its own.
    pub fn hanging_load(mut self) -> Self {
        self.hang_load = true;
        self
    }

    /// Completes payments with a signature the backend will reject.
    pub fn tampering(mut self) -> Self {
        self.tamper = true;
        self
    }

    /// The shopper dismisses the payment window.
    pub fn declining(mut self) -> Self {
        self.decline = true;
        self
    }

    pub fn load_call_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.load_calls)
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGatewayClient for InMemoryGateway {
    async fn load(&self) -> Result<()> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_load {
            std::future::pending::<()>().await;
        }
        if self.fail_load {
            return Err(StorefrontError::Gateway("script failed to load".into()));
        }
        Ok(())
    }

    async fn open(&self, options: GatewayOptions) -> Result<GatewayCompletion> {
        if self.decline {
            return Err(StorefrontError::Gateway(
                "payment window was dismissed".into(),
            ));
        }
        let payment_id = format!("pay_{}", self.next_payment.fetch_add(1, Ordering::SeqCst));
        let signature = if self.tamper {
            "forged".into()
        } else {
            expected_signature(&options.order_id, &payment_id)
        };
        Ok(GatewayCompletion {
            order_id: options.order_id,
            payment_id,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api::{OrderItemRequest, ShippingAddress};
    use crate::domain::checkout::PaymentMethod;
    use rust_decimal_macros::dec;

    fn order_request(method: PaymentMethod, coupon: Option<&str>) -> CreateOrderRequest {
        CreateOrderRequest {
            items: vec![OrderItemRequest {
                product_id: 3,
                quantity: 1,
            }],
            shipping_address: ShippingAddress::default(),
            coupon_code: coupon.map(Into::into),
            payment_method: method,
        }
    }

    #[tokio::test]
    async fn test_cart_repository_round_trip() {
        let repository = InMemoryCartRepository::new();
        let items = vec![CartItem::new(1, "Mug", dec!(10.00), 10).with_quantity(2)];

        repository.save(&items).await.unwrap();
        assert_eq!(repository.load().await, items);

        repository.save(&[]).await.unwrap();
        assert!(repository.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_totals_recomputed_from_catalog() {
        let backend = InMemoryBackend::with_demo_data();
        let response = backend
            .create_order(order_request(PaymentMethod::Cod, None))
            .await
            .unwrap();
        // Catalog price for product 3, regardless of anything client-side.
        assert_eq!(response.amount_minor, 150_000);
        assert!(response.gateway_order_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let backend = InMemoryBackend::new();
        let error = backend
            .create_order(order_request(PaymentMethod::Cod, None))
            .await
            .unwrap_err();
        assert!(matches!(error, StorefrontError::Backend(_)));
    }

    #[tokio::test]
    async fn test_flat_coupon_and_percentage_cap() {
        let backend = InMemoryBackend::with_demo_data();

        let flat = backend.evaluate_coupon("SAVE500", 250_000);
        assert!(flat.valid);
        assert_eq!(flat.discount_minor, 50_000);
        assert_eq!(flat.final_amount_minor, 200_000);

        // MEGA20 on 10000.00 would be 2000.00 but is capped at 1000.00.
        let capped = backend.evaluate_coupon("MEGA20", 1_000_000);
        assert!(capped.valid);
        assert_eq!(capped.discount_minor, 100_000);
    }

    #[tokio::test]
    async fn test_gateway_flow_verifies_and_pays() {
        let backend = InMemoryBackend::with_demo_data();
        let response = backend
            .create_order(order_request(PaymentMethod::Upi, None))
            .await
            .unwrap();
        let gateway_order_id = response.gateway_order_id.unwrap();

        let gateway = InMemoryGateway::new();
        gateway.load().await.unwrap();
        let completion = gateway
            .open(GatewayOptions {
                key: response.gateway_key.unwrap(),
                amount_minor: response.amount_minor,
                currency: response.currency,
                order_id: gateway_order_id.clone(),
                prefill: Default::default(),
            })
            .await
            .unwrap();

        let order = backend
            .verify_payment(VerifyPaymentRequest {
                gateway_order_id: completion.order_id,
                gateway_payment_id: completion.payment_id,
                gateway_signature: completion.signature,
            })
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let backend = InMemoryBackend::with_demo_data();
        let response = backend
            .create_order(order_request(PaymentMethod::Upi, None))
            .await
            .unwrap();

        let error = backend
            .verify_payment(VerifyPaymentRequest {
                gateway_order_id: response.gateway_order_id.unwrap(),
                gateway_payment_id: "pay_1".into(),
                gateway_signature: "forged".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, StorefrontError::Backend(_)));
    }

    #[tokio::test]
    async fn test_confirm_cod_moves_order_to_processing() {
        let backend = InMemoryBackend::with_demo_data();
        let response = backend
            .create_order(order_request(PaymentMethod::Cod, None))
            .await
            .unwrap();

        let order = backend.confirm_cod(response.order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        // A second confirmation finds the order no longer pending.
        let error = backend.confirm_cod(response.order_id).await.unwrap_err();
        assert!(matches!(error, StorefrontError::Backend(_)));
    }

    #[tokio::test]
    async fn test_declining_gateway() {
        let gateway = InMemoryGateway::new().declining();
        let error = gateway
            .open(GatewayOptions {
                key: "key_demo".into(),
                amount_minor: 1_000,
                currency: "INR".into(),
                order_id: "gw_order_1".into(),
                prefill: Default::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, StorefrontError::Gateway(_)));
    }
}
