//! Error taxonomy shared by the workflow and response adapters.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Field name to the list of user-facing messages for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The kind of a [`CmsError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Internal,
    BadGateway,
    Publish,
}

impl ErrorKind {
    /// Every kind, in table order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::MethodNotAllowed,
        ErrorKind::Internal,
        ErrorKind::BadGateway,
        ErrorKind::Publish,
    ];

    /// HTTP status for this kind.
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::BadGateway => StatusCode::BAD_GATEWAY,
            ErrorKind::Publish => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable key used in i18n lookups (`errors.NotFoundError`) and in
    /// rendered error models.
    pub const fn key(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequestError",
            ErrorKind::Unauthorized => "UnauthorizedError",
            ErrorKind::Forbidden => "ForbiddenError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::MethodNotAllowed => "MethodNotAllowedError",
            ErrorKind::Internal => "InternalServerError",
            ErrorKind::BadGateway => "BadGatewayError",
            ErrorKind::Publish => "PublishError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors produced by content operations.
///
/// Every variant carries an optional cause. Only [`CmsError::BadRequest`]
/// carries per-field messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsError {
    #[error("bad request")]
    BadRequest {
        cause: Option<String>,
        errors: FieldErrors,
    },

    #[error("unauthorized")]
    Unauthorized { cause: Option<String> },

    #[error("forbidden")]
    Forbidden { cause: Option<String> },

    #[error("not found")]
    NotFound { cause: Option<String> },

    #[error("method not allowed")]
    MethodNotAllowed { cause: Option<String> },

    #[error("internal server error")]
    Internal { cause: Option<String> },

    #[error("bad gateway")]
    BadGateway { cause: Option<String> },

    #[error("publish failed")]
    Publish { cause: Option<String> },
}

impl CmsError {
    /// Build an error of the given kind with an optional cause.
    ///
    /// A bad-request built this way has no field errors.
    pub fn new(kind: ErrorKind, cause: Option<String>) -> Self {
        match kind {
            ErrorKind::BadRequest => CmsError::BadRequest {
                cause,
                errors: FieldErrors::new(),
            },
            ErrorKind::Unauthorized => CmsError::Unauthorized { cause },
            ErrorKind::Forbidden => CmsError::Forbidden { cause },
            ErrorKind::NotFound => CmsError::NotFound { cause },
            ErrorKind::MethodNotAllowed => CmsError::MethodNotAllowed { cause },
            ErrorKind::Internal => CmsError::Internal { cause },
            ErrorKind::BadGateway => CmsError::BadGateway { cause },
            ErrorKind::Publish => CmsError::Publish { cause },
        }
    }

    /// Bad request carrying the given field errors.
    pub fn bad_request(errors: FieldErrors) -> Self {
        CmsError::BadRequest {
            cause: None,
            errors,
        }
    }

    /// Bad request with a single message for a single field.
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.into(), vec![message.into()]);
        Self::bad_request(errors)
    }

    pub fn not_found(cause: impl Into<String>) -> Self {
        CmsError::NotFound {
            cause: Some(cause.into()),
        }
    }

    pub fn internal(cause: impl Into<String>) -> Self {
        CmsError::Internal {
            cause: Some(cause.into()),
        }
    }

    pub fn publish(cause: impl Into<String>) -> Self {
        CmsError::Publish {
            cause: Some(cause.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CmsError::BadRequest { .. } => ErrorKind::BadRequest,
            CmsError::Unauthorized { .. } => ErrorKind::Unauthorized,
            CmsError::Forbidden { .. } => ErrorKind::Forbidden,
            CmsError::NotFound { .. } => ErrorKind::NotFound,
            CmsError::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            CmsError::Internal { .. } => ErrorKind::Internal,
            CmsError::BadGateway { .. } => ErrorKind::BadGateway,
            CmsError::Publish { .. } => ErrorKind::Publish,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    pub fn cause(&self) -> Option<&str> {
        match self {
            CmsError::BadRequest { cause, .. }
            | CmsError::Unauthorized { cause }
            | CmsError::Forbidden { cause }
            | CmsError::NotFound { cause }
            | CmsError::MethodNotAllowed { cause }
            | CmsError::Internal { cause }
            | CmsError::BadGateway { cause }
            | CmsError::Publish { cause } => cause.as_deref(),
        }
    }

    /// Per-field messages; `None` unless this is a bad request.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            CmsError::BadRequest { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, CmsError::BadRequest { .. })
    }

    /// Serializable view of the error, used as a template model.
    pub fn to_model(&self) -> ErrorModel {
        ErrorModel {
            error_key: self.kind().key(),
            status: self.status().as_u16(),
            cause: self.cause().map(str::to_string),
            errors: self.field_errors().cloned(),
        }
    }
}

impl From<anyhow::Error> for CmsError {
    fn from(err: anyhow::Error) -> Self {
        CmsError::internal(format!("{err:#}"))
    }
}

impl From<&CmsError> for StatusCode {
    fn from(err: &CmsError) -> Self {
        err.status()
    }
}

impl From<ErrorKind> for StatusCode {
    fn from(kind: ErrorKind) -> Self {
        kind.status()
    }
}

/// Template model for a [`CmsError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorModel {
    pub error_key: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Result type alias using CmsError.
pub type CmsResult<T> = Result<T, CmsError>;
