//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map backend status codes to HTTP status codes
//! - Render every gateway failure as a JSON `{code, message}` envelope
//! - Wrap bare error responses from middleware (body limit, request
//!   timeout) in the same envelope
//!
//! # Design Decisions
//! - `code` is the numeric gRPC code so clients can branch on it
//! - Backend messages are relayed verbatim
//! - Backend timeouts result in 504 Gateway Timeout

use axum::body::Body;
use axum::extract::{rejection::BytesRejection, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tonic::Code;

use crate::net::CallError;
use crate::rpc::contract::ContractError;

/// Longest middleware error body carried over into an envelope message.
const MAX_BARE_MESSAGE: usize = 1024;

/// Error body returned for every non-200 relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: i32,
    pub message: String,
}

/// Per-request gateway failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
    #[error("invalid request body: {0}")]
    InvalidArgument(#[from] serde_json::Error),
    #[error("unreadable request body: {0}")]
    Body(#[from] BytesRejection),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl GatewayError {
    /// gRPC code reported in the envelope.
    pub fn code(&self) -> Code {
        match self {
            GatewayError::UnknownMethod(_) => Code::NotFound,
            GatewayError::InvalidArgument(_) => Code::InvalidArgument,
            GatewayError::Body(rejection) => code_for_status(rejection.status()),
            GatewayError::Call(CallError::Dial(_)) => Code::Unavailable,
            GatewayError::Call(CallError::Rpc(status)) => status.code(),
            GatewayError::Call(CallError::DeadlineExceeded(_)) => Code::DeadlineExceeded,
            GatewayError::Contract(_) => Code::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Body(rejection) => rejection.status(),
            other => http_status_for(other.code()),
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let message = match self {
            GatewayError::Call(CallError::Rpc(status)) => status.message().to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            code: self.code() as i32,
            message,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        envelope_response(self.status(), &self.envelope())
    }
}

fn envelope_response(status: StatusCode, envelope: &ErrorEnvelope) -> Response {
    let body = match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(_) => return status.into_response(),
    };
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}

/// Middleware giving error responses that were not produced by the gateway
/// (body limit, request timeout) the JSON envelope. JSON responses and
/// successes pass through untouched.
pub async fn envelope_bare_errors(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let message = match axum::body::to_bytes(response.into_body(), MAX_BARE_MESSAGE).await {
        Ok(bytes) if !bytes.is_empty() => String::from_utf8_lossy(&bytes).into_owned(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    envelope_response(
        status,
        &ErrorEnvelope {
            code: code_for_status(status) as i32,
            message,
        },
    )
}

fn is_json(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"))
}

/// gRPC code reported for an HTTP failure raised outside the backend call.
pub fn code_for_status(status: StatusCode) -> Code {
    match status {
        StatusCode::BAD_REQUEST => Code::InvalidArgument,
        StatusCode::UNAUTHORIZED => Code::Unauthenticated,
        StatusCode::FORBIDDEN => Code::PermissionDenied,
        StatusCode::NOT_FOUND => Code::NotFound,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => Code::Unimplemented,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Code::DeadlineExceeded,
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::TOO_MANY_REQUESTS => Code::ResourceExhausted,
        StatusCode::SERVICE_UNAVAILABLE => Code::Unavailable,
        s if s.is_client_error() => Code::InvalidArgument,
        _ => Code::Internal,
    }
}

/// HTTP status for a gRPC code.
pub fn http_status_for(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => client_closed_request(),
        Code::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
        Code::FailedPrecondition => StatusCode::BAD_REQUEST,
        Code::Aborted => StatusCode::CONFLICT,
        Code::OutOfRange => StatusCode::BAD_REQUEST,
        Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        Code::Internal => StatusCode::BAD_GATEWAY,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::DataLoss => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
    }
}

// Non-standard "client closed request".
fn client_closed_request() -> StatusCode {
    StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::Status;

    #[test]
    fn status_table() {
        assert_eq!(http_status_for(Code::Internal), StatusCode::BAD_GATEWAY);
        assert_eq!(http_status_for(Code::Unavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(http_status_for(Code::DeadlineExceeded), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(http_status_for(Code::Cancelled).as_u16(), 499);
        assert_eq!(http_status_for(Code::InvalidArgument), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_message_is_relayed_verbatim() {
        let err = GatewayError::Call(CallError::Rpc(Status::permission_denied("no access")));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            err.envelope(),
            ErrorEnvelope {
                code: Code::PermissionDenied as i32,
                message: "no access".to_string(),
            }
        );
    }

    #[test]
    fn gateway_failures_have_envelopes() {
        let timeout = GatewayError::Call(CallError::DeadlineExceeded(Duration::from_secs(1)));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.envelope().code, 4);

        let unknown = GatewayError::UnknownMethod("nope".into());
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(unknown.envelope().code, 5);
    }

    #[test]
    fn middleware_statuses_have_codes() {
        assert_eq!(code_for_status(StatusCode::PAYLOAD_TOO_LARGE), Code::ResourceExhausted);
        assert_eq!(code_for_status(StatusCode::REQUEST_TIMEOUT), Code::DeadlineExceeded);
        assert_eq!(code_for_status(StatusCode::UNSUPPORTED_MEDIA_TYPE), Code::InvalidArgument);
        assert_eq!(code_for_status(StatusCode::INTERNAL_SERVER_ERROR), Code::Internal);
    }

    #[tokio::test]
    async fn bare_errors_are_wrapped() {
        use axum::{middleware, routing::get, Router};
        use tower::ServiceExt;

        let app = Router::new()
            .route("/timeout", get(|| async { StatusCode::REQUEST_TIMEOUT }))
            .route("/unknown", get(|| async { GatewayError::UnknownMethod("x".into()) }))
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(envelope_bare_errors));

        let get_path = |path: &'static str| {
            axum::http::Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(get_path("/timeout")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.code, Code::DeadlineExceeded as i32);
        assert_eq!(envelope.message, "Request Timeout");

        let response = app.clone().oneshot(get_path("/unknown")).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.message, "unknown method 'x'");

        let response = app.oneshot(get_path("/ok")).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"fine");
    }

    #[test]
    fn envelope_is_json() {
        let response = GatewayError::UnknownMethod("x".into()).into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
