pub mod api;
pub mod cart;
pub mod checkout;
pub mod ports;
