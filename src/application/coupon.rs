use crate::domain::api::CouponValidationRequest;
use crate::domain::checkout::Coupon;
use crate::domain::ports::CommerceBackendHandle;

/// Outcome of a coupon check for the active checkout session.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponDecision {
    Valid {
        coupon: Coupon,
        discount_minor: i64,
        message: String,
    },
    Invalid {
        reason: String,
    },
}

impl CouponDecision {
    pub fn discount_minor(&self) -> i64 {
        match self {
            Self::Valid { discount_minor, .. } => *discount_minor,
            Self::Invalid { .. } => 0,
        }
    }
}

/// Stateless adapter over the backend's discount-validation endpoint.
///
/// All rule evaluation (minimum-order thresholds, percentage vs flat
/// discounts, expiry, usage caps) lives on the backend; every call is a
/// fresh remote check, never cached or retried.
pub struct CouponValidator {
    backend: CommerceBackendHandle,
}

impl CouponValidator {
    pub fn new(backend: CommerceBackendHandle) -> Self {
        Self { backend }
    }

    /// Validates `code` against the candidate order amount in minor units.
    ///
    /// A transport failure surfaces as `Invalid`, never as a silently
    /// accepted coupon.
    pub async fn validate(&self, code: &str, amount_minor: i64) -> CouponDecision {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return CouponDecision::Invalid {
                reason: "coupon code is empty".into(),
            };
        }

        let request = CouponValidationRequest {
            coupon_code: code,
            order_amount_minor: amount_minor,
        };
        match self.backend.validate_coupon(request).await {
            Ok(response) => match (response.valid, response.coupon) {
                (true, Some(coupon)) => CouponDecision::Valid {
                    discount_minor: response.discount_minor,
                    message: response.message,
                    coupon,
                },
                _ => CouponDecision::Invalid {
                    reason: response.message,
                },
            },
            Err(error) => {
                tracing::warn!(%error, "coupon validation request failed");
                CouponDecision::Invalid {
                    reason: "request failed".into(),
                }
            }
        }
    }
}
