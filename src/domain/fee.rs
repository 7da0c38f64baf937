use crate::domain::payment::{Currency, Payment, PaymentKind};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fixed conversion rate: 1 USD = 0.92 EUR.
pub const USD_TO_EUR: Decimal = dec!(0.92);

/// Computes the cancellation fee for a payment as of `now`.
///
/// `fee = whole_hours_elapsed * kind_coefficient`, converted from USD at
/// the fixed rate when applicable. The result is always expressed in
/// EUR, rounded half-up to 2 decimal places. Pure function of its
/// inputs; callers may invoke it concurrently without coordination.
pub fn cancellation_fee(
    kind: &PaymentKind,
    currency: Currency,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Decimal {
    let hours = (now - created_at).num_hours().max(0);
    let mut fee = Decimal::from(hours) * kind.fee_coefficient();
    if currency == Currency::Usd {
        fee *= USD_TO_EUR;
    }
    fee.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convenience wrapper over [`cancellation_fee`] for a stored payment.
pub fn cancellation_fee_for(payment: &Payment, now: DateTime<Utc>) -> Decimal {
    cancellation_fee(&payment.kind, payment.currency, payment.created_at, now)
}
