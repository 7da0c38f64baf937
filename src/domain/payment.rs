use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque payment identifier, assigned by the store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PaymentId(pub u64);

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A positive monetary amount.
///
/// Wrapper around `rust_decimal::Decimal` so that payment amounts are
/// positive by construction and never a binary floating type.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::validation("amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    /// Parses the wire form ("EUR"/"USD"). Anything else is outside the
    /// supported set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EUR" => Some(Self::Eur),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }
}

/// The closed set of payment shapes, fixed at creation time.
///
/// Which kind applies is decided from the request: a creditor BIC
/// always makes the payment a `Swift` transfer, otherwise the currency
/// picks between `Sepa` (EUR, mandatory details) and `Ach` (USD,
/// optional details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "payment_type", rename_all = "lowercase")]
pub enum PaymentKind {
    Sepa {
        details: String,
    },
    Ach {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
    Swift {
        creditor_bic: String,
    },
}

impl PaymentKind {
    /// Per-kind multiplier applied to whole elapsed hours when computing
    /// the cancellation fee.
    pub fn fee_coefficient(&self) -> Decimal {
        match self {
            Self::Sepa { .. } => dec!(0.05),
            Self::Ach { .. } => dec!(0.10),
            Self::Swift { .. } => dec!(0.15),
        }
    }

    /// Whether the external notification service is told about newly
    /// created payments of this kind. Swift transfers are not notified.
    pub fn notifies_on_creation(&self) -> bool {
        matches!(self, Self::Sepa { .. } | Self::Ach { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sepa { .. } => "sepa",
            Self::Ach { .. } => "ach",
            Self::Swift { .. } => "swift",
        }
    }
}

/// Result of the best-effort creation notification, recorded at most
/// once per payment shortly after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub notified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl NotificationOutcome {
    pub fn failed() -> Self {
        Self {
            notified: false,
            status_code: None,
        }
    }
}

/// A payment order.
///
/// Everything except the cancellation and notification bookkeeping is
/// immutable after creation. `version` increases on every persisted
/// mutation and backs the store's optimistic concurrency check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Amount,
    pub currency: Currency,
    pub debtor_iban: String,
    pub creditor_iban: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: PaymentKind,
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_fee: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationOutcome>,
    pub version: u64,
}

impl Payment {
    pub fn is_active(&self) -> bool {
        !self.cancelled
    }

    /// Last instant at which cancellation is still permitted: 23:59:59
    /// on the calendar day the payment was created.
    pub fn cancellation_deadline(&self) -> DateTime<Utc> {
        self.created_at
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .expect("23:59:59 is a valid time of day")
            .and_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_amount_must_be_positive() {
        assert!(Amount::new(dec!(0.01)).is_ok());
        assert!(matches!(
            Amount::new(Decimal::ZERO),
            Err(PaymentError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-5.0)),
            Err(PaymentError::Validation(_))
        ));
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::parse("EUR"), Some(Currency::Eur));
        assert_eq!(Currency::parse("USD"), Some(Currency::Usd));
        assert_eq!(Currency::parse("GBP"), None);
        assert_eq!(Currency::parse("eur"), None);
    }

    #[test]
    fn test_cancellation_deadline_is_end_of_creation_day() {
        let payment = Payment {
            id: PaymentId(1),
            amount: Amount::new(dec!(10)).unwrap(),
            currency: Currency::Eur,
            debtor_iban: "DE02120300000000202051".into(),
            creditor_iban: "LT601010012345678901".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            kind: PaymentKind::Sepa {
                details: "invoice 42".into(),
            },
            cancelled: false,
            cancellation_fee: None,
            notification: None,
            version: 1,
        };

        assert_eq!(
            payment.cancellation_deadline(),
            Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_payment_json_flattens_kind() {
        let payment = Payment {
            id: PaymentId(5),
            amount: Amount::new(dec!(12.34)).unwrap(),
            currency: Currency::Usd,
            debtor_iban: "DE02120300000000202051".into(),
            creditor_iban: "LT601010012345678901".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            kind: PaymentKind::Swift {
                creditor_bic: "AGBLLT2X".into(),
            },
            cancelled: false,
            cancellation_fee: None,
            notification: None,
            version: 1,
        };

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["payment_type"], "swift");
        assert_eq!(json["creditor_bic"], "AGBLLT2X");
        assert_eq!(json["currency"], "USD");
        assert!(json.get("cancellation_fee").is_none());

        let back: Payment = serde_json::from_value(json).unwrap();
        assert_eq!(back, payment);
    }
}
