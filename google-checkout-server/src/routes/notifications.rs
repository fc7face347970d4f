//! `POST /notifications`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use google_checkout::webhook::NotificationHandler;

use crate::{AppState, error::ServerError};

/// Content type of acknowledgment responses.
pub const ACK_CONTENT_TYPE: &str = "application/xml;charset=UTF-8";

/// Receives one notification and answers with its acknowledgment.
///
/// Unparseable bodies get 400 so the sender retries; every parsed document gets 200,
/// including unrecognized kinds and ones the handler failed on.
///
/// # Errors
///
/// [`ServerError::Checkout`] when the body is not well-formed XML.
pub async fn receive<H: NotificationHandler + 'static>(
    State(state): State<Arc<AppState<H>>>,
    body: Bytes,
) -> Result<Response, ServerError> {
    match state.receiver().receive(&body) {
        Ok(ack) => {
            state.record_received();
            Ok((StatusCode::OK, [(header::CONTENT_TYPE, ACK_CONTENT_TYPE)], ack.into_body())
                .into_response())
        }
        Err(e) => {
            state.record_rejected();
            Err(e.into())
        }
    }
}
