use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fxstat_core::{StatsError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Request-level errors mapped to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Both start and end dates are required")]
    MissingDates { example: &'static str },

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat { example: &'static str },

    #[error(transparent)]
    Validation(ValidationError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    /// Maps a request validation failure, singling out unparsable dates.
    pub fn from_validation(error: ValidationError, example: &'static str) -> Self {
        match error {
            ValidationError::InvalidDate { .. } => Self::InvalidDateFormat { example },
            other => Self::Validation(other),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingDates { .. } | Self::InvalidDateFormat { .. } | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Stats(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::MissingDates { example } | Self::InvalidDateFormat { example } => ErrorBody {
                error: self.to_string(),
                example: Some(*example),
                details: None,
            },
            Self::Validation(_) => ErrorBody {
                error: self.to_string(),
                example: None,
                details: None,
            },
            Self::Stats(error) => ErrorBody {
                error: error.to_string(),
                example: None,
                details: error.detail().map(str::to_owned),
            },
        };

        if status.is_server_error() {
            tracing::error!(error = %self, details = ?body.details, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}

/// Startup and serve failures of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
