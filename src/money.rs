use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Minor units per major currency unit (cents per rupee/dollar).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Converts a display amount to integer minor units (`12.50` -> `1250`).
///
/// Everything crossing the backend boundary is expressed in minor units so
/// the client and backend never disagree over floating rounding. Rounds
/// half-away-from-zero to the nearest minor unit; saturates on overflow.
pub fn to_minor_units(amount: Decimal) -> i64 {
    let scaled = (amount * Decimal::from(MINOR_UNITS_PER_MAJOR)).round_dp_with_strategy(
        0,
        rust_decimal::RoundingStrategy::MidpointAwayFromZero,
    );
    scaled.to_i64().unwrap_or(i64::MAX)
}

/// Converts integer minor units back to a display amount (`1250` -> `12.50`).
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}

/// Payable total after a discount, clamped so it can never go negative.
pub fn payable_total(subtotal: Decimal, discount: Decimal) -> Decimal {
    (subtotal - discount).max(Decimal::ZERO)
}

/// Minor-unit counterpart of [`payable_total`].
pub fn payable_total_minor(subtotal_minor: i64, discount_minor: i64) -> i64 {
    (subtotal_minor - discount_minor).max(0)
}
