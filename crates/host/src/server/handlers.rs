//! Axum request handlers for all host endpoints.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use common::protocol::{ErrorResponse, HealthResponse, InvokeRequest, InvokeResponse};
use common::ContractError;
use contract::{LedgerError, Transient};
use thiserror::Error;
use tracing::{info, info_span, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use super::state::AppState;

/// Why an invocation produced no committed result.
#[derive(Debug, Error)]
enum InvokeFailure {
    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error("commit rejected: {0}")]
    Commit(#[from] LedgerError),
}

impl InvokeFailure {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            InvokeFailure::Contract(e) => (
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorResponse::from(e),
            ),
            InvokeFailure::Commit(LedgerError::Conflict(_)) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("mvcc_conflict", self.to_string()),
            ),
            InvokeFailure::Commit(LedgerError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("ledger_unavailable", self.to_string()),
            ),
        }
    }
}

/// `POST /invoke` — run one contract invocation in its own ledger transaction.
///
/// The transaction is committed only if dispatch succeeds. Transient values
/// are base64 decoded and the encoded copies wiped at once; the decoded bytes
/// are handed to the contract and wiped afterwards.
pub async fn invoke(State(state): State<AppState>, Json(mut req): Json<InvokeRequest>) -> Response {
    let mut transient = match decode_transient(&mut req.transient) {
        Ok(t) => t,
        Err(field) => {
            let err = ErrorResponse::new(
                "bad_request",
                format!("transient field {field} is not valid base64"),
            );
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let tx_id = Uuid::new_v4();
    let span = info_span!("invoke", %tx_id, function = %req.function);
    let result = span.in_scope(|| run_invocation(&state, &req, &transient));
    scrub(&mut transient);

    match result {
        Ok((payload, height)) => {
            span.in_scope(|| info!(height, payload_len = payload.len(), "invocation committed"));
            let body = InvokeResponse {
                tx_id: tx_id.to_string(),
                payload: STANDARD.encode(&payload),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(failure) => {
            let (status, body) = failure.status_and_body();
            span.in_scope(|| warn!(code = %body.code, status = status.as_u16(), "invocation failed"));
            (status, Json(body)).into_response()
        }
    }
}

/// `GET /health` — liveness plus a summary of committed ledger state.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        height: state.ledger.height(),
        records: state.ledger.len(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn run_invocation(
    state: &AppState,
    req: &InvokeRequest,
    transient: &Transient,
) -> Result<(Bytes, u64), InvokeFailure> {
    let mut tx = state.ledger.begin();
    let payload = state
        .contract
        .dispatch(&mut tx, &req.function, &req.args, transient)?;
    let height = tx.commit()?;
    Ok((payload, height))
}

/// Decode every transient value, returning the name of the first bad field.
///
/// The encoded values in `raw` are wiped whether or not decoding succeeds.
fn decode_transient(raw: &mut BTreeMap<String, String>) -> Result<Transient, String> {
    let decoded: Result<Transient, String> = raw
        .iter()
        .map(|(name, value)| {
            STANDARD
                .decode(value)
                .map(|bytes| (name.clone(), bytes))
                .map_err(|_| name.clone())
        })
        .collect();
    raw.values_mut().for_each(Zeroize::zeroize);
    decoded
}

fn scrub(transient: &mut Transient) {
    transient.values_mut().for_each(Zeroize::zeroize);
}
