use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory payment store.
///
/// Uses `Arc<RwLock<HashMap<..>>>` for shared concurrent access; the
/// optimistic version check in `save` runs under the write lock, so
/// conflicting writers observe `ConcurrentModification` rather than
/// lost updates. `Clone` shares the underlying map.
#[derive(Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<u64, Payment>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self {
            payments: Arc::default(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    async fn collect_active_ids<F>(&self, matches: F) -> Vec<PaymentId>
    where
        F: Fn(&Payment) -> bool,
    {
        let payments = self.payments.read().await;
        let mut ids: Vec<PaymentId> = payments
            .values()
            .filter(|payment| payment.is_active() && matches(payment))
            .map(|payment| payment.id)
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, mut payment: Payment) -> Result<Payment> {
        payment.id = PaymentId(self.next_id.fetch_add(1, Ordering::SeqCst));
        payment.version = 1;

        let mut payments = self.payments.write().await;
        payments.insert(payment.id.0, payment.clone());
        Ok(payment)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id.0).cloned())
    }

    async fn save(&self, mut payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        let current = payments
            .get(&payment.id.0)
            .ok_or(PaymentError::NotFound(payment.id))?;

        if current.version != payment.version {
            return Err(PaymentError::ConcurrentModification(payment.id));
        }

        payment.version += 1;
        payments.insert(payment.id.0, payment.clone());
        Ok(payment)
    }

    async fn active_ids_by_amount(&self, amount: Decimal) -> Result<Vec<PaymentId>> {
        Ok(self
            .collect_active_ids(|payment| payment.amount.value() == amount)
            .await)
    }

    async fn all_active_ids(&self) -> Result<Vec<PaymentId>> {
        Ok(self.collect_active_ids(|_| true).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, Currency, PaymentKind};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn payment(amount: Decimal) -> Payment {
        Payment {
            id: PaymentId(0),
            amount: Amount::new(amount).unwrap(),
            currency: Currency::Eur,
            debtor_iban: "DE02120300000000202051".into(),
            creditor_iban: "LT601010012345678901".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            kind: PaymentKind::Sepa {
                details: "rent".into(),
            },
            cancelled: false,
            cancellation_fee: None,
            notification: None,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_and_version_one() {
        let store = InMemoryPaymentStore::new();

        let first = store.create(payment(dec!(10))).await.unwrap();
        let second = store.create(payment(dec!(20))).await.unwrap();

        assert_eq!(first.id, PaymentId(1));
        assert_eq!(second.id, PaymentId(2));
        assert_eq!(first.version, 1);

        let found = store.find_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(found, first);
        assert!(store.find_by_id(PaymentId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let store = InMemoryPaymentStore::new();
        let mut created = store.create(payment(dec!(10))).await.unwrap();

        created.cancelled = true;
        created.cancellation_fee = Some(dec!(0.05));
        let saved = store.save(created).await.unwrap();
        assert_eq!(saved.version, 2);

        let stored = store.find_by_id(saved.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert!(stored.cancelled);
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let store = InMemoryPaymentStore::new();
        let created = store.create(payment(dec!(10))).await.unwrap();

        // Two readers of version 1; only the first write commits.
        let mut first = created.clone();
        let mut second = created;
        first.cancelled = true;
        second.cancelled = true;

        store.save(first).await.unwrap();
        let result = store.save(second).await;
        assert!(matches!(
            result,
            Err(PaymentError::ConcurrentModification(_))
        ));
    }

    #[tokio::test]
    async fn test_save_unknown_payment() {
        let store = InMemoryPaymentStore::new();
        let mut ghost = payment(dec!(10));
        ghost.id = PaymentId(7);
        ghost.version = 1;
        assert!(matches!(
            store.save(ghost).await,
            Err(PaymentError::NotFound(PaymentId(7)))
        ));
    }

    #[tokio::test]
    async fn test_active_id_queries_skip_cancelled() {
        let store = InMemoryPaymentStore::new();
        let a = store.create(payment(dec!(10))).await.unwrap();
        let b = store.create(payment(dec!(10))).await.unwrap();
        let c = store.create(payment(dec!(25))).await.unwrap();

        let mut cancelled = a.clone();
        cancelled.cancelled = true;
        cancelled.cancellation_fee = Some(dec!(0.05));
        store.save(cancelled).await.unwrap();

        assert_eq!(store.all_active_ids().await.unwrap(), vec![b.id, c.id]);
        assert_eq!(
            store.active_ids_by_amount(dec!(10)).await.unwrap(),
            vec![b.id]
        );
        assert_eq!(
            store.active_ids_by_amount(dec!(10.00)).await.unwrap(),
            vec![b.id]
        );
        assert!(
            store
                .active_ids_by_amount(dec!(99))
                .await
                .unwrap()
                .is_empty()
        );
    }
}
