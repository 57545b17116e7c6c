//!
//! # Error handling
//!
//! `AppError` is the single error type raised by the business logic. Each
//! variant carries a stable machine-readable code and maps to one HTTP
//! status, so "no token" (401), "wrong role" (403), "wrong password" (401,
//! own code) and "email collision" (409) stay distinguishable at the wire.
//!
//! The `ErrorEnvelope` middleware rewrites every error response into the
//! uniform envelope `{code, message, status, url, reqMethod, timestamp}`,
//! including errors produced by actix itself (payload deserialization,
//! unmatched routes) that never went through `AppError`.

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::StatusCode,
    Error, HttpResponse,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    /// No credentials, or credentials that could not be resolved to an
    /// identity (HTTP 401).
    Unauthorized(String),
    /// Authenticated, but the resolved role does not permit the operation
    /// (HTTP 403). Never collapsed into `Unauthorized`.
    AccessDenied(String),
    /// User or task absent, or soft-deleted and therefore invisible
    /// (HTTP 404).
    NotFound(String),
    /// Registration against an already-taken normalized email (HTTP 409).
    DuplicateEmail(String),
    /// Known user, wrong password (HTTP 401, own code).
    InvalidCredentials(String),
    /// Malformed input caught by `validator` (HTTP 422).
    Validation(String),
    /// Error from the backing store (HTTP 500).
    Database(String),
    /// Any other server-side failure (HTTP 500).
    Internal(String),
}

impl AppError {
    /// Stable error code surfaced in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "TD-0007",
            AppError::AccessDenied(_) => "TD-0006",
            AppError::NotFound(_) => "TD-0004",
            AppError::DuplicateEmail(_) => "TD-0017",
            AppError::InvalidCredentials(_) => "TD-0018",
            AppError::Validation(_) => "TD-0002",
            AppError::Database(_) | AppError::Internal(_) => "TD-0001",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::AccessDenied(msg)
            | AppError::NotFound(msg)
            | AppError::DuplicateEmail(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Validation(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::AccessDenied(msg) => write!(f, "Access denied: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::DuplicateEmail(msg) => write!(f, "Duplicate email: {}", msg),
            AppError::InvalidCredentials(msg) => write!(f, "Invalid credentials: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Partial envelope; `ErrorEnvelope` fills in the request context when
    // it is mounted (which it always is outside of unit tests).
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "code": self.code(),
            "message": self.message(),
            "status": self.status_code().as_u16(),
            "timestamp": Utc::now(),
        }))
    }
}

/// `RowNotFound` becomes `NotFound`. A unique violation becomes
/// `DuplicateEmail`: two registrations racing past the existence check
/// both reach INSERT, and the unique index on `users.email` decides.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::DuplicateEmail("Email already exists".into())
            }
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Code for error responses that did not originate from an `AppError`
/// (actix extractor failures, unmatched routes).
fn code_for_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED => "TD-0007",
        StatusCode::FORBIDDEN => "TD-0006",
        StatusCode::NOT_FOUND => "TD-0004",
        StatusCode::CONFLICT => "TD-0017",
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => "TD-0002",
        _ => "TD-0001",
    }
}

/// Middleware that rewrites every error response into the uniform
/// envelope, adding the request URL and method that `ResponseError`
/// cannot see.
pub struct ErrorEnvelope;

impl<S, B> Transform<S, ServiceRequest> for ErrorEnvelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = ErrorEnvelopeService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorEnvelopeService { service }))
    }
}

pub struct ErrorEnvelopeService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for ErrorEnvelopeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            let status = res.status();
            if !status.is_client_error() && !status.is_server_error() {
                return Ok(res.map_into_boxed_body());
            }

            let url = res.request().uri().to_string();
            let method = res.request().method().to_string();
            let (code, message) = match res
                .response()
                .error()
                .and_then(|e| e.as_error::<AppError>())
            {
                Some(app_err) => (app_err.code(), app_err.message().to_string()),
                None => {
                    let message = res
                        .response()
                        .error()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| {
                            status.canonical_reason().unwrap_or("Error").to_string()
                        });
                    (code_for_status(status), message)
                }
            };

            if status.is_server_error() {
                log::error!("{} {} -> {}: {}", method, url, status, message);
            }

            let body = json!({
                "code": code,
                "message": message,
                "status": status.as_u16(),
                "url": url,
                "reqMethod": method,
                "timestamp": Utc::now(),
            });
            let (req, _) = res.into_parts();
            let envelope = HttpResponse::build(status).json(body);
            Ok(ServiceResponse::new(req, envelope))
        })
    }
}
