use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use calguard_core::GuardError;

/// Guard error rendered as an HTTP response.
///
/// Both veto kinds become `429 Too Many Requests`; a known retry hint is sent
/// as `Retry-After`.
#[derive(Debug)]
pub struct GuardRejection(pub GuardError);

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(json!({
            "code": code.as_str(),
            "message": self.0.to_string(),
        }));

        let mut resp = (status, body).into_response();
        if let Some(secs) = self.0.retry_after_secs() {
            resp.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        resp
    }
}
