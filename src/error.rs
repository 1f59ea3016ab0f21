/// Application Error Handling
///
/// One error type for the whole service, built from small domain enums
/// (input validation, persistence, auth, config). `AppError` renders itself as
/// an HTTP response and logs under a fresh error id that is echoed to the client.
///
/// Error messages never carry plaintext passwords, credential hashes or token material.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

// ============================================================================
// DOMAIN ERRORS
// ============================================================================

/// Rejected request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
    /// Plaintext exceeds the maximum number of bytes the hasher accepts
    InputTooLong(usize),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} is not valid", field),
            ValidationError::InputTooLong(max) => {
                write!(f, "password length exceeds {} bytes", max)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Failures reported by a `Storage` backend
#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness rule was hit (duplicate email)
    Conflict(String),
    NotFound(String),
    StoreUnavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(what) => write!(f, "Conflicting record: {}", what),
            StoreError::NotFound(what) => write!(f, "No such {}", what),
            StoreError::StoreUnavailable(reason) => write!(f, "Store unavailable: {}", reason),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("record".to_string()),
            // 23505: unique_violation
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::StoreUnavailable(err.to_string()),
        }
    }
}

/// Startup configuration problems
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(key) => write!(f, "Missing required setting: {}", key),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid setting: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication and authorization failures
///
/// `InvalidCredentials` is a single variant: callers cannot tell an unknown
/// email from a wrong password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    MissingToken,
    Malformed,
    BadSignature,
    Expired,
    /// Refresh token unknown, expired or revoked
    Unauthorized,
    /// Authenticated, but not the owner
    Forbidden,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AuthError::InvalidCredentials => "Incorrect email or password",
            AuthError::MissingToken => "Missing authentication token",
            AuthError::Malformed => "Malformed token",
            AuthError::BadSignature => "Token signature is invalid",
            AuthError::Expired => "Token has expired",
            AuthError::Unauthorized => "Invalid refresh token",
            AuthError::Forbidden => "Not allowed to modify this resource",
        };
        f.write_str(msg)
    }
}

impl StdError for AuthError {}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::Malformed => "TOKEN_MALFORMED",
            AuthError::BadSignature => "TOKEN_BAD_SIGNATURE",
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::Unauthorized => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
        }
    }
}

// ============================================================================
// APPLICATION ERROR
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Store(StoreError),
    Auth(AuthError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    /// The auth error carried by this value, if any
    pub fn as_auth(&self) -> Option<AuthError> {
        match self {
            AppError::Auth(e) => Some(*e),
            _ => None,
        }
    }

    /// Machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Store(StoreError::Conflict(_)) => "DUPLICATE_ENTRY",
            AppError::Store(StoreError::NotFound(_)) => "NOT_FOUND",
            AppError::Store(StoreError::StoreUnavailable(_)) => "STORE_UNAVAILABLE",
            AppError::Auth(e) => e.code(),
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients; server-side details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Store(StoreError::Conflict(_)) => "Resource already exists".to_string(),
            AppError::Store(e @ StoreError::NotFound(_)) => e.to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Config(_) => "Server configuration error".to_string(),
            AppError::Store(StoreError::StoreUnavailable(_)) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Store(StoreError::NotFound(_)) => {
                tracing::info!(error_id = error_id, error = %self, "Record not found");
            }
            AppError::Store(StoreError::Conflict(_)) => {
                tracing::warn!(error_id = error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Store(e) => {
                tracing::error!(error_id = error_id, error = %e, "Storage failure");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(error_id = error_id, "Invalid credentials attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Config(e) => {
                tracing::error!(error_id = error_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(StoreError::from(err))
    }
}

// ============================================================================
// HTTP MAPPING
// ============================================================================

/// JSON body of every error response
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Matches the `error_id` field of the server log line
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    /// RFC 3339
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn from_error(err: &AppError, error_id: String) -> Self {
        Self {
            error_id,
            message: err.public_message(),
            code: err.code().to_string(),
            status: err.status_code().as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Store(StoreError::StoreUnavailable(_))
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        HttpResponse::build(self.status_code()).json(ErrorResponse::from_error(self, error_id))
    }
}
