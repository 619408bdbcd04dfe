use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const MISSING_PARAMS: &str = "Artist and song are required";

/// Errors the proxy reports to the browser as `{ "error": "..." }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `artist` or `song` absent or empty.
    MissingParams,
    /// Upstream answered non-2xx; `status` is forwarded.
    Upstream {
        status: StatusCode,
        message: &'static str,
    },
    /// Upstream unreachable or returned garbage.
    Unavailable(&'static str),
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ApiError {
    pub fn upstream(status: u16, message: &'static str) -> Self {
        ApiError::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParams => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::MissingParams => MISSING_PARAMS,
            ApiError::Upstream { message, .. } => *message,
            ApiError::Unavailable(message) => *message,
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::NotFound => "Not found",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_passthrough() {
        assert_eq!(ApiError::upstream(502, "x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::upstream(429, "x").status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::upstream(42, "x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::MissingParams.message(), MISSING_PARAMS);
    }
}
