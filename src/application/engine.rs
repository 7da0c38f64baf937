use crate::domain::fee;
use crate::domain::payment::{Amount, Payment, PaymentId};
use crate::domain::ports::{ClockBox, NotifierBox, PaymentStoreBox, SystemClock};
use crate::domain::request::{self, CreatePayment};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

/// Read-side fee projection: what cancelling a payment would cost as of
/// "now". Computed without mutating the payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeQuote {
    pub id: PaymentId,
    pub cancellation_fee: Decimal,
}

/// The payment lifecycle engine.
///
/// Orchestrates creation, same-day cancellation and the read-side
/// queries. Owns the storage, notification and clock ports; all shared
/// mutable state lives behind the store, whose versioned `save`
/// serializes concurrent mutation of a single payment.
pub struct PaymentEngine {
    store: PaymentStoreBox,
    notifier: NotifierBox,
    clock: ClockBox,
}

impl PaymentEngine {
    pub fn new(store: PaymentStoreBox, notifier: NotifierBox) -> Self {
        Self::with_clock(store, notifier, Box::new(SystemClock))
    }

    /// Like [`PaymentEngine::new`] but with an injected clock, so tests
    /// can drive the cancellation deadline and fee hours directly.
    pub fn with_clock(store: PaymentStoreBox, notifier: NotifierBox, clock: ClockBox) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Validates and persists a new payment.
    ///
    /// For Sepa and Ach payments the notification service is told about
    /// the creation and the outcome is persisted as a second mutation;
    /// a failed dispatch is recorded as not-notified and never fails
    /// the creation.
    pub async fn create_payment(&self, request: CreatePayment) -> Result<Payment> {
        request::validate(&request)?;
        let (kind, currency) = request::resolve_kind(&request)?;
        let amount = Amount::new(request.amount.unwrap_or(Decimal::ZERO))?;

        let payment = Payment {
            // id and version are assigned by the store
            id: PaymentId(0),
            amount,
            currency,
            debtor_iban: request.debtor_iban.unwrap_or_default(),
            creditor_iban: request.creditor_iban.unwrap_or_default(),
            created_at: self.clock.now(),
            kind,
            cancelled: false,
            cancellation_fee: None,
            notification: None,
            version: 0,
        };

        let mut payment = self.store.create(payment).await?;
        info!(id = %payment.id, kind = payment.kind.name(), "payment created");

        if payment.kind.notifies_on_creation() {
            let outcome = self.notifier.notify_created(&payment).await;
            if outcome.notified {
                info!(id = %payment.id, status = ?outcome.status_code, "creation notified");
            } else {
                warn!(id = %payment.id, status = ?outcome.status_code, "creation notification failed");
            }
            payment.notification = Some(outcome);
            payment = self.store.save(payment).await?;
        }

        // Return whatever is persisted, notification bookkeeping included.
        self.store
            .find_by_id(payment.id)
            .await?
            .ok_or(PaymentError::NotFound(payment.id))
    }

    /// Cancels a payment within its same-day cancellation window and
    /// fixes the fee. Cancelling an already cancelled payment is an
    /// idempotent no-op: the stored state, fee included, is returned
    /// unchanged.
    pub async fn cancel_payment(&self, id: PaymentId) -> Result<Payment> {
        let mut payment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        if payment.cancelled {
            return Ok(payment);
        }

        let now = self.clock.now();
        if now > payment.cancellation_deadline() {
            return Err(PaymentError::CancellationWindowExpired(id));
        }

        let cancellation_fee = fee::cancellation_fee_for(&payment, now);
        payment.cancelled = true;
        payment.cancellation_fee = Some(cancellation_fee);

        let payment = self.store.save(payment).await?;
        info!(id = %id, fee = %cancellation_fee, "payment cancelled");
        Ok(payment)
    }

    /// Current cancellation fee for a payment, active or not, without
    /// mutating any state.
    pub async fn fee_quote(&self, id: PaymentId) -> Result<FeeQuote> {
        let payment = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        Ok(FeeQuote {
            id: payment.id,
            cancellation_fee: fee::cancellation_fee_for(&payment, self.clock.now()),
        })
    }

    /// Ids of non-cancelled payments, optionally filtered by exact
    /// amount.
    pub async fn active_payment_ids(&self, amount: Option<Decimal>) -> Result<Vec<PaymentId>> {
        match amount {
            Some(amount) => self.store.active_ids_by_amount(amount).await,
            None => self.store.all_active_ids().await,
        }
    }
}
