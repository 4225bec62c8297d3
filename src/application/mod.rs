//! Application services composing the domain with the injected
//! capabilities: the cart store, the coupon validator, and the checkout
//! orchestrator.

pub mod cart;
pub mod checkout;
pub mod coupon;
