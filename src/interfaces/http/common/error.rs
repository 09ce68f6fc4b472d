//! `AppError` → HTTP response

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::ApiResponse;
use crate::shared::AppError;

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);

        let message = if self.is_client_error() {
            warn!(code = self.code(), error = %self, "Request rejected");
            self.to_string()
        } else {
            error!(code = self.code(), error = %self, "Request failed");
            "Internal server error".to_string()
        };

        let mut response =
            (status, Json(ApiResponse::<()>::error(self.code(), message))).into_response();

        if let AppError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
