use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Stable machine-readable code carried in the `error` field of the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Whether the message is safe to show to API clients.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. }
                | AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::RateLimited { .. }
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
