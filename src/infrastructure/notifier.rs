use crate::domain::payment::{NotificationOutcome, Payment};
use crate::domain::ports::CreationNotifier;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Notifies an external service about created payments over HTTP.
///
/// The endpoint is `{base_url}/{kind}/{id}`. Every request runs with a
/// bounded timeout; timeouts, connection errors and non-2xx responses
/// all collapse into a not-notified outcome so that the creation path
/// can never be failed by this call.
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url_for(&self, payment: &Payment) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            payment.kind.name(),
            payment.id
        )
    }
}

#[async_trait]
impl CreationNotifier for HttpNotifier {
    async fn notify_created(&self, payment: &Payment) -> NotificationOutcome {
        let url = self.url_for(payment);
        debug!(id = %payment.id, url, "sending creation notification");

        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                NotificationOutcome {
                    notified: status.is_success(),
                    status_code: Some(status.as_u16()),
                }
            }
            Err(err) => {
                warn!(id = %payment.id, error = %err, "creation notification request failed");
                NotificationOutcome::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, Currency, PaymentId, PaymentKind};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn payment(kind: PaymentKind) -> Payment {
        Payment {
            id: PaymentId(42),
            amount: Amount::new(dec!(10)).unwrap(),
            currency: Currency::Eur,
            debtor_iban: "DE02120300000000202051".into(),
            creditor_iban: "LT601010012345678901".into(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
            kind,
            cancelled: false,
            cancellation_fee: None,
            notification: None,
            version: 1,
        }
    }

    #[test]
    fn test_endpoint_includes_kind_and_id() {
        let notifier =
            HttpNotifier::new("https://notify.example.com/payments/", Duration::from_secs(1))
                .unwrap();

        let sepa = payment(PaymentKind::Sepa {
            details: "rent".into(),
        });
        assert_eq!(
            notifier.url_for(&sepa),
            "https://notify.example.com/payments/sepa/42"
        );

        let ach = payment(PaymentKind::Ach { details: None });
        assert_eq!(
            notifier.url_for(&ach),
            "https://notify.example.com/payments/ach/42"
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_yields_failed_outcome() {
        // Reserved TEST-NET address, nothing listens there.
        let notifier =
            HttpNotifier::new("http://192.0.2.1/payments", Duration::from_millis(100)).unwrap();

        let outcome = notifier
            .notify_created(&payment(PaymentKind::Sepa {
                details: "rent".into(),
            }))
            .await;

        assert_eq!(outcome, NotificationOutcome::failed());
    }
}
