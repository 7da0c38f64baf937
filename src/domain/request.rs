use crate::domain::payment::{Currency, PaymentKind};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Payment creation request as it arrives over the wire.
///
/// All fields are optional here so that missing or malformed input is
/// rejected by [`validate`] with a precise message instead of failing
/// body deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePayment {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub debtor_iban: Option<String>,
    pub creditor_iban: Option<String>,
    pub details: Option<String>,
    pub creditor_bic: Option<String>,
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// Checks a creation request and fails on the first violation found.
///
/// Violations are reported in a fixed priority order: amount, currency,
/// debtor IBAN, creditor IBAN, then the EUR details rule. A request
/// carrying a creditor BIC never needs details; a USD request without a
/// BIC does not either.
pub fn validate(request: &CreatePayment) -> Result<()> {
    match request.amount {
        Some(amount) if amount > Decimal::ZERO => {}
        _ => return Err(PaymentError::validation("amount must be positive")),
    }

    let currency = request
        .currency
        .as_deref()
        .and_then(Currency::parse)
        .ok_or_else(|| PaymentError::validation("currency must be EUR or USD"))?;

    if is_blank(&request.debtor_iban) {
        return Err(PaymentError::validation("debtor IBAN is required"));
    }
    if is_blank(&request.creditor_iban) {
        return Err(PaymentError::validation("creditor IBAN is required"));
    }

    if currency == Currency::Eur && is_blank(&request.creditor_bic) && is_blank(&request.details) {
        return Err(PaymentError::validation(
            "details are required for EUR payments without a BIC",
        ));
    }

    Ok(())
}

/// Classifies a validated request into its payment kind.
///
/// First match wins: a non-blank creditor BIC makes the payment a Swift
/// transfer regardless of currency; otherwise EUR maps to Sepa and USD
/// to Ach. Assumes [`validate`] has already passed, so the
/// unsupported-currency arm indicates a broken invariant upstream.
pub fn resolve_kind(request: &CreatePayment) -> Result<(PaymentKind, Currency)> {
    let currency = request
        .currency
        .as_deref()
        .and_then(Currency::parse)
        .ok_or_else(|| {
            PaymentError::UnsupportedCurrency(request.currency.clone().unwrap_or_default())
        })?;

    if let Some(bic) = request
        .creditor_bic
        .as_deref()
        .filter(|bic| !bic.trim().is_empty())
    {
        return Ok((
            PaymentKind::Swift {
                creditor_bic: bic.to_string(),
            },
            currency,
        ));
    }

    let kind = match currency {
        Currency::Eur => PaymentKind::Sepa {
            details: request.details.clone().unwrap_or_default(),
        },
        Currency::Usd => PaymentKind::Ach {
            details: request
                .details
                .clone()
                .filter(|details| !details.trim().is_empty()),
        },
    };
    Ok((kind, currency))
}
