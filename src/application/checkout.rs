use crate::application::cart::CartStore;
use crate::domain::api::{CreateOrderRequest, OrderItemRequest, ShippingAddress, VerifyPaymentRequest};
use crate::domain::checkout::{CheckoutState, Order, PaymentMethod, PaymentSession};
use crate::domain::ports::{
    CommerceBackendHandle, CustomerPrefill, GatewayCompletion, GatewayOptions, PaymentGatewayBox,
};
use crate::error::{Result, StorefrontError};
use std::time::Duration;
use tokio::sync::watch;

/// Upper bound on the external gateway script load, so a stalled load
/// resolves to failed instead of hanging the checkout.
pub const GATEWAY_LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Everything the shopper chose at checkout time.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub method: PaymentMethod,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<String>,
}

/// Drives a checkout attempt from a cart snapshot to a terminal outcome.
///
/// States: `Idle -> CreatingOrder -> (AwaitingGatewayInteraction |
/// ConfirmingCod) -> VerifyingPayment -> Completed`, with `Failed`
/// reachable from `CreatingOrder`, `AwaitingGatewayInteraction` and
/// `VerifyingPayment`. Terminal states end the session; the next `submit`
/// starts a fresh one with a new backend order.
///
/// All transitions run on one logical thread of control; suspension points
/// (the backend calls and the gateway interaction) leave the machine in a
/// well-defined intermediate state visible to subscribers.
pub struct PaymentOrchestrator {
    backend: CommerceBackendHandle,
    gateway: PaymentGatewayBox,
    gateway_ready: bool,
    session: Option<PaymentSession>,
    state: watch::Sender<CheckoutState>,
}

impl PaymentOrchestrator {
    pub fn new(backend: CommerceBackendHandle, gateway: PaymentGatewayBox) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            backend,
            gateway,
            gateway_ready: false,
            session: None,
            state,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state.borrow().clone()
    }

    /// State change notifications for progress rendering.
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// The session of the current or most recent checkout attempt.
    pub fn session(&self) -> Option<&PaymentSession> {
        self.session.as_ref()
    }

    /// Starts a checkout attempt from the live cart snapshot.
    ///
    /// Rejected with [`StorefrontError::CheckoutInProgress`] unless the
    /// machine is idle or in a terminal state. The order-creation request
    /// carries item ids and quantities only; the backend recomputes all
    /// totals authoritatively.
    ///
    /// An order-creation failure is transient: nothing has been committed,
    /// the machine returns to `Idle`, and the caller may simply retry.
    pub async fn submit(&mut self, cart: &mut CartStore, request: CheckoutRequest) -> Result<Order> {
        if !self.state().accepts_submit() {
            return Err(StorefrontError::CheckoutInProgress);
        }
        let snapshot = cart.snapshot();
        if snapshot.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".into()));
        }

        self.session = None;
        self.transition(CheckoutState::CreatingOrder);

        let order_request = CreateOrderRequest {
            items: snapshot
                .items
                .iter()
                .map(|item| OrderItemRequest {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: request.shipping_address,
            coupon_code: request.coupon_code,
            payment_method: request.method,
        };
        let response = match self.backend.create_order(order_request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "order creation failed");
                self.transition(CheckoutState::Idle);
                return Err(error);
            }
        };
        tracing::info!(
            order_id = response.order_id,
            amount_minor = response.amount_minor,
            method = ?request.method,
            "backend accepted order"
        );
        self.session = Some(PaymentSession {
            method: request.method,
            backend_order_id: response.order_id,
            gateway_order_id: response.gateway_order_id.clone(),
            amount_minor: response.amount_minor,
        });

        if request.method.is_cod() {
            self.confirm_cod(cart, response.order_id).await
        } else {
            let order_id = response.order_id;
            self.transition(CheckoutState::AwaitingGatewayInteraction);

            if let Err(error) = self.ensure_gateway_loaded().await {
                // The backend order stays PENDING_PAYMENT; reconciling
                // abandoned orders is the backend's concern.
                self.fail("gateway unavailable");
                return Err(error);
            }
            let Some(gateway_order_id) = response.gateway_order_id else {
                self.fail("gateway unavailable");
                return Err(StorefrontError::Backend(format!(
                    "no gateway order issued for order {order_id}"
                )));
            };

            let options = GatewayOptions {
                key: response.gateway_key.unwrap_or_default(),
                amount_minor: response.amount_minor,
                currency: response.currency,
                order_id: gateway_order_id,
                prefill: CustomerPrefill {
                    name: response.customer_name,
                    email: response.customer_email,
                    contact: response.customer_phone,
                },
            };
            match self.gateway.open(options).await {
                Ok(completion) => self.verify(cart, completion).await,
                Err(error) => {
                    tracing::warn!(%error, "gateway interaction ended without payment");
                    self.fail("payment was not completed");
                    Err(error)
                }
            }
        }
    }

    /// Resumes the machine on the gateway's success callback, posting the
    /// three gateway-supplied identifiers for signature verification.
    ///
    /// A verification rejection is fatal for the session and never retried
    /// automatically: a bad signature may indicate tampering.
    pub async fn verify(
        &mut self,
        cart: &mut CartStore,
        completion: GatewayCompletion,
    ) -> Result<Order> {
        if self.state() != CheckoutState::AwaitingGatewayInteraction {
            return Err(StorefrontError::Validation(
                "no gateway interaction in flight".into(),
            ));
        }
        self.transition(CheckoutState::VerifyingPayment);

        let request = VerifyPaymentRequest {
            gateway_order_id: completion.order_id,
            gateway_payment_id: completion.payment_id,
            gateway_signature: completion.signature,
        };
        match self.backend.verify_payment(request).await {
            Ok(order) => Ok(self.complete(cart, order).await),
            Err(error) => {
                tracing::warn!(%error, "payment verification rejected");
                self.fail("verification failed");
                Err(StorefrontError::VerificationFailed)
            }
        }
    }

    async fn confirm_cod(&mut self, cart: &mut CartStore, order_id: u64) -> Result<Order> {
        self.transition(CheckoutState::ConfirmingCod);
        match self.backend.confirm_cod(order_id).await {
            Ok(order) => Ok(self.complete(cart, order).await),
            Err(error) => {
                tracing::warn!(%error, order_id, "cash-on-delivery confirmation failed");
                self.fail("order confirmation failed");
                Err(error)
            }
        }
    }

    /// Loads the gateway capability once per orchestrator, bounded by
    /// [`GATEWAY_LOAD_TIMEOUT`].
    async fn ensure_gateway_loaded(&mut self) -> Result<()> {
        if self.gateway_ready {
            return Ok(());
        }
        match tokio::time::timeout(GATEWAY_LOAD_TIMEOUT, self.gateway.load()).await {
            Ok(Ok(())) => {
                self.gateway_ready = true;
                Ok(())
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "gateway capability failed to load");
                Err(StorefrontError::GatewayUnavailable)
            }
            Err(_elapsed) => {
                tracing::warn!("gateway capability load timed out");
                Err(StorefrontError::GatewayUnavailable)
            }
        }
    }

    async fn complete(&mut self, cart: &mut CartStore, order: Order) -> Order {
        self.transition(CheckoutState::Completed { order_id: order.id });
        // The checkout already settled; a local persistence hiccup while
        // clearing must not demote the outcome.
        if let Err(error) = cart.clear().await {
            tracing::warn!(%error, "failed to clear cart after completed checkout");
        }
        tracing::info!(order_id = order.id, status = ?order.status, "checkout completed");
        order
    }

    fn fail(&mut self, reason: &str) {
        self.transition(CheckoutState::Failed {
            reason: reason.into(),
        });
    }

    fn transition(&mut self, next: CheckoutState) {
        tracing::debug!(state = ?next, "checkout transition");
        self.state.send_replace(next);
    }
}
