//! REST surface over the payment engine.
//!
//! Thin pass-through plumbing: handlers deserialize, call the engine
//! and map `PaymentError` onto status codes. All decision logic lives
//! in the domain and application layers.

use crate::application::engine::{FeeQuote, PaymentEngine};
use crate::domain::payment::{Payment, PaymentId};
use crate::domain::request::CreatePayment;
use crate::error::PaymentError;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Builds the API router:
///
/// - `POST /payments` — create (201)
/// - `POST /payments/{id}/cancel` — cancel (200)
/// - `GET /payments?amount=` — active ids, optionally filtered (200)
/// - `GET /payments/{id}` — fee quote (200)
pub fn router(engine: Arc<PaymentEngine>) -> Router {
    Router::new()
        .route("/payments", post(create_payment).get(list_active_payments))
        .route("/payments/{id}/cancel", post(cancel_payment))
        .route("/payments/{id}", get(fee_quote))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    amount: Option<Decimal>,
}

/// Error body mirrored to clients: `{"status": 400, "message": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: u16,
    message: String,
}

/// Wrapper tying `PaymentError` to HTTP semantics.
struct ApiError(PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PaymentError::Validation(_) | PaymentError::CancellationWindowExpired(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            PaymentError::NotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            PaymentError::ConcurrentModification(_) => (StatusCode::CONFLICT, self.0.to_string()),
            PaymentError::UnsupportedCurrency(_) | PaymentError::Storage(_) => {
                // Internal faults are logged in full but not leaked.
                error!(error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unexpected error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                status: status.as_u16(),
                message,
            }),
        )
            .into_response()
    }
}

async fn create_payment(
    State(engine): State<Arc<PaymentEngine>>,
    Json(request): Json<CreatePayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = engine.create_payment(request).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn cancel_payment(
    State(engine): State<Arc<PaymentEngine>>,
    Path(id): Path<u64>,
) -> Result<Json<Payment>, ApiError> {
    let payment = engine.cancel_payment(PaymentId(id)).await?;
    Ok(Json(payment))
}

async fn fee_quote(
    State(engine): State<Arc<PaymentEngine>>,
    Path(id): Path<u64>,
) -> Result<Json<FeeQuote>, ApiError> {
    let quote = engine.fee_quote(PaymentId(id)).await?;
    Ok(Json(quote))
}

async fn list_active_payments(
    State(engine): State<Arc<PaymentEngine>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PaymentId>>, ApiError> {
    let ids = engine.active_payment_ids(params.amount).await?;
    Ok(Json(ids))
}
