use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, StorefrontError>;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("a checkout attempt is already in progress")]
    CheckoutInProgress,
    #[error("payment gateway unavailable")]
    GatewayUnavailable,
    #[error("payment gateway error: {0}")]
    Gateway(String),
    #[error("payment verification failed")]
    VerificationFailed,
    #[cfg(feature = "storage-rocksdb")]
    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}
