use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::LedgerError;
use serde::Serialize;
use tracing::error;

use crate::constants::MSG_MISSING_VALUES;

#[derive(Debug)]
pub enum ApiError {
    MissingValues,
    InvalidBody(String),
    Ledger(LedgerError),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingValues => (StatusCode::BAD_REQUEST, MSG_MISSING_VALUES.to_string()),
            ApiError::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Ledger(e) => {
                error!(error = %e, "ledger error");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("proof search failed: {err}"))
    }
}
