use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sheets_client::errors::SheetsError;
use tracing::{error, warn};

pub type ServerResult<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Sheets(#[from] SheetsError),

    /// The request couldn't be turned into operation inputs.
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ServerError {
    /// Every failure is reported the same way: 500 with the error's message.
    fn into_response(self) -> Response {
        match &self {
            ServerError::Sheets(e) => error!(kind = %e.kind(), %e, "operation failed"),
            ServerError::InvalidRequest(msg) => warn!(%msg, "invalid request"),
            ServerError::Io(e) => error!(%e, "io error"),
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
