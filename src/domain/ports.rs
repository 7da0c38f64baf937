use super::payment::{NotificationOutcome, Payment, PaymentId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Durable keyed storage for payments.
///
/// `save` is the optimistic-concurrency write: it succeeds only when the
/// caller's `version` matches the persisted one, bumps the version, and
/// otherwise fails with `ConcurrentModification`. `create` assigns the
/// id and version 1 and needs no version check.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>>;
    async fn save(&self, payment: Payment) -> Result<Payment>;
    async fn active_ids_by_amount(&self, amount: Decimal) -> Result<Vec<PaymentId>>;
    async fn all_active_ids(&self) -> Result<Vec<PaymentId>>;
}

/// Best-effort creation notification.
///
/// Infallible by contract: transport failures, timeouts and non-2xx
/// responses are encoded in the returned outcome, never propagated, so
/// the notification step can never fail a creation.
#[async_trait]
pub trait CreationNotifier: Send + Sync {
    async fn notify_created(&self, payment: &Payment) -> NotificationOutcome;
}

/// Source of "now" for deadline checks and fee computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type NotifierBox = Box<dyn CreationNotifier>;
pub type ClockBox = Box<dyn Clock>;
