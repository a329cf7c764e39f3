use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::auth::login_redirect_url;

/// Field name → messages. `__all__` holds errors that belong to no single field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key for form errors not attached to a field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Body of every 404, whether no route matched or the route's id did not parse.
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation error: {0}")]
    Validation(String),
    /// Rejected form submission: field errors plus the submitted values to re-fill the form.
    #[error("Form has {} invalid field(s)", .errors.len())]
    Form {
        errors: FieldErrors,
        input: serde_json::Value,
    },
    /// Anonymous access to a protected page; answered with a redirect to the login page.
    #[error("Login required to access {next}")]
    LoginRequired { next: String },
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Email error: {0}")]
    Email(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::Form { .. } => StatusCode::BAD_REQUEST,
            Self::LoginRequired { .. } => StatusCode::SEE_OTHER,
            Self::Database(_) | Self::Jwt(_) | Self::Bcrypt(_) | Self::Email(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::Auth(msg) | Self::Forbidden(msg) | Self::Validation(msg) => {
                msg.clone()
            }
            Self::Form { .. } => "Please correct the errors below".to_string(),
            Self::LoginRequired { .. } => "Authentication required".to_string(),
            Self::Database(_) | Self::Jwt(_) | Self::Bcrypt(_) | Self::Email(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

/// An id segment that is not a number can never name a row, so it is a 404
/// like any other miss. Use with `WithRejection<Path<i32>, ApiError>`.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameter: {}", rejection.body_text());
        Self::NotFound(NOT_FOUND_MESSAGE.to_string())
    }
}

/// Malformed or mistyped JSON bodies get the same JSON error shape as every
/// other client error.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(_) | Self::Jwt(_) | Self::Bcrypt(_) | Self::Email(_) | Self::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Self::Auth(_) | Self::Forbidden(_) | Self::LoginRequired { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Self::NotFound(_) | Self::Validation(_) | Self::Form { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        match self {
            Self::LoginRequired { next } => Redirect::to(&login_redirect_url(&next)).into_response(),
            Self::Form { errors, input } => {
                let body = json!({
                    "message": "Please correct the errors below",
                    "errors": errors,
                    "input": input,
                });
                (status, Json(body)).into_response()
            }
            other => (status, Json(json!({ "error": other.user_message() }))).into_response(),
        }
    }
}

/// Collects field errors while a form is being validated.
#[derive(Debug, Default)]
pub struct FormErrors(FieldErrors);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was collected, otherwise a [`ApiError::Form`] echoing `input`.
    pub fn finish<T: Serialize>(self, input: &T) -> Result<(), ApiError> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(self.into_error(input))
    }

    pub fn into_error<T: Serialize>(self, input: &T) -> ApiError {
        ApiError::Form {
            errors: self.0,
            input: serde_json::to_value(input).unwrap_or(serde_json::Value::Null),
        }
    }
}
