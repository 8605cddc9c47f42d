//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure the service can report, from malformed input to a rejected bearer token,
//! is classified here at the point where it is detected.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers and middleware can
//! turn it into an HTTP response with a `{"error": ..., "details": ...}` JSON body.
//! `From` implementations for `validator::ValidationErrors`, `jsonwebtoken::errors::Error`
//! and `bcrypt::BcryptError` allow conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Malformed input: bad JSON, missing fields or failed validation rules (HTTP 400).
    ValidationError(String),
    /// Registration attempted with a username that is already taken (HTTP 400).
    DuplicateUsername,
    /// Unknown username or wrong password at login (HTTP 401).
    InvalidCredentials,
    /// No `Authorization` header on a protected request (HTTP 401).
    MissingCredential,
    /// An `Authorization` header that is not of the form `Bearer <token>` (HTTP 401).
    MalformedCredential,
    /// Bad signature, malformed token, or a token outside its validity window (HTTP 401).
    InvalidToken,
    /// The token was valid but its user no longer exists (HTTP 401).
    IdentityNotFound,
    /// The caller's role is not in the set allowed for the operation (HTTP 403).
    InsufficientRole,
    /// A user or task lookup missed (HTTP 404).
    NotFound(String),
    /// An unexpected server-side failure (HTTP 500).
    /// The message is logged but never sent to the client.
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DuplicateUsername => write!(f, "username already exists"),
            AppError::InvalidCredentials => write!(f, "invalid credentials"),
            AppError::MissingCredential => write!(f, "missing authorization header"),
            AppError::MalformedCredential => write!(f, "invalid authorization header"),
            AppError::InvalidToken => write!(f, "invalid token"),
            AppError::IdentityNotFound => write!(f, "user not found"),
            AppError::InsufficientRole => write!(f, "insufficient privileges"),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Only `ValidationError` carries a `details` field; internal errors are reduced
/// to a generic message so nothing about the server leaks to the client.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidToken
            | AppError::IdentityNotFound => StatusCode::UNAUTHORIZED,
            AppError::InsufficientRole => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(details) => json!({
                "error": "invalid request payload",
                "details": details
            }),
            AppError::NotFound(msg) => json!({ "error": msg }),
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                json!({ "error": "internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Any failure to decode or validate a JWT is reported as `InvalidToken`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::InvalidToken
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("password hashing failed: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::InternalServerError(format!("blocking task failed: {}", error))
    }
}
