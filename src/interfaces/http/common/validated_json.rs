//! JSON body extractor with `validator` rules.
//!
//! Malformed JSON → 400 `INVALID_JSON`; rule violations → 422
//! `VALIDATION_ERROR` listing every failing field.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;
use crate::shared::AppError;

/// `Json<T>` that also runs `T::validate()`.
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

/// `field: message; field: message`, fields in alphabetical order.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {msg}")
            })
        })
        .collect();

    if parts.is_empty() {
        "Validation failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    "INVALID_JSON",
                    format!("Invalid JSON: {}", rejection.body_text()),
                )),
            )
                .into_response(),
            Self::Invalid(errors) => AppError::Validation(describe(&errors)).into_response(),
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}
