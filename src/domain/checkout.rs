use serde::{Deserialize, Serialize};

/// Payment methods offered at checkout. Wire names match the backend enum.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Upi,
    NetBanking,
    Wallet,
    Cod,
}

impl PaymentMethod {
    /// Cash-on-delivery settles without a gateway interaction.
    pub fn is_cod(self) -> bool {
        self == Self::Cod
    }
}

/// Lifecycle of a backend order. Owned by the backend; read-only here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: u64,
    pub name: String,
    pub quantity: u32,
    pub price_minor: i64,
}

/// Finalized order record as returned by the backend.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    pub total_minor: i64,
    #[serde(default)]
    pub discount_minor: i64,
    pub items: Vec<OrderLineItem>,
}

/// A coupon accepted by the backend, held only for the active checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub description: String,
    pub discount_minor: i64,
}

/// One checkout attempt, created when an order is accepted by the backend
/// and discarded when the attempt reaches a terminal state.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    pub method: PaymentMethod,
    pub backend_order_id: u64,
    pub gateway_order_id: Option<String>,
    pub amount_minor: i64,
}

/// Observable state of the checkout state machine.
///
/// `Completed` and `Failed` are terminal for a session; a fresh `submit`
/// always starts a new session with a new backend order.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Idle,
    CreatingOrder,
    AwaitingGatewayInteraction,
    ConfirmingCod,
    VerifyingPayment,
    Completed { order_id: u64 },
    Failed { reason: String },
}

impl CheckoutState {
    /// States from which a new `submit` may begin.
    pub fn accepts_submit(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Completed { .. } | Self::Failed { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}
