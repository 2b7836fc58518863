use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pkg_quota::QuotaError;
use pkg_state::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Machine-readable error code rendered in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    MissingRequired,
    MaxLimitExceeded,
    MethodNotAllowed,
    InvalidBodyContent,
    InvalidFormat,
    NotFound,
    AlreadyExists,
    ServerError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingRequired
            | ErrorCode::MaxLimitExceeded
            | ErrorCode::InvalidBodyContent
            | ErrorCode::InvalidFormat => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned by API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// One of a pair of fields that must be set together is absent.
    #[error("{field} is required")]
    MissingRequired { field: String },

    #[error("{field} {message}")]
    MaxLimitExceeded { field: String, message: String },

    #[error("{0}")]
    MethodNotAllowed(String),

    /// A payload field does not have the expected shape.
    #[error("invalid {field}: {source}")]
    Conversion {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Quota(#[from] QuotaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
        }
    }

    pub fn method_not_allowed(msg: impl Into<String>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::MissingRequired { .. } => ErrorCode::MissingRequired,
            ApiError::MaxLimitExceeded { .. } => ErrorCode::MaxLimitExceeded,
            ApiError::MethodNotAllowed(_) => ErrorCode::MethodNotAllowed,
            ApiError::Conversion { .. } => ErrorCode::InvalidBodyContent,
            ApiError::Quota(_) => ErrorCode::InvalidFormat,
            ApiError::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorCode::NotFound,
                StoreError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
                StoreError::Codec { .. } | StoreError::Invalid { .. } => {
                    ErrorCode::InvalidBodyContent
                }
                StoreError::Backend(_) => ErrorCode::ServerError,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.code().status()
    }

    /// Payload field the error refers to, if any.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ApiError::MissingRequired { field }
            | ApiError::MaxLimitExceeded { field, .. }
            | ApiError::Conversion { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Message shown to the caller alongside the field name.
    pub fn message(&self) -> String {
        match self {
            ApiError::MaxLimitExceeded { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    status: u16,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_name: Option<&'a str>,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("API error: {}", self);
        }
        let body = ErrorBody {
            kind: "error",
            status: status.as_u16(),
            code: self.code(),
            field_name: self.field_name(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}
