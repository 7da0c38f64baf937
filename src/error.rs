use crate::domain::payment::PaymentId;
use thiserror::Error;

/// Errors surfaced by the payment lifecycle engine and its adapters.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Bad request shape or content; always correctable by the caller.
    #[error("{0}")]
    Validation(String),
    #[error("payment not found: {0}")]
    NotFound(PaymentId),
    /// Cancellation is only allowed until 23:59:59 of the creation day.
    #[error("payment {0} can no longer be cancelled after the day of creation")]
    CancellationWindowExpired(PaymentId),
    /// The stored version no longer matches the version read; callers
    /// must re-read and decide whether to retry.
    #[error("payment {0} was modified concurrently")]
    ConcurrentModification(PaymentId),
    /// Defensive: the kind resolver saw a currency the validator should
    /// have rejected. Indicates a broken invariant upstream.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;

impl PaymentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
