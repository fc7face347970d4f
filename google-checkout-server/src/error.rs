//! Server error types with HTTP response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use google_checkout::CheckoutError;
use thiserror::Error;

/// Errors raised while starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Library error while handling a request or loading configuration.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Socket bind or serve failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Checkout(CheckoutError::MalformedDocument(_)) => StatusCode::BAD_REQUEST,
            Self::Checkout(_) | Self::Io(_) => {
                tracing::error!(error = %self, "internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
