use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::RepositoryError;
use crate::services::{BookingError, SelectionError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid selection: {0}")]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Selection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Booking(e) => match e {
                BookingError::SlotTaken
                | BookingError::InvalidTransition { .. }
                | BookingError::CancellationWindowClosed { .. } => StatusCode::CONFLICT,
                BookingError::NotesTooLong => StatusCode::UNPROCESSABLE_ENTITY,
                BookingError::Repository(e) => repository_status(e),
            },
            AppError::Repository(e) => repository_status(e),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {self}");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

fn repository_status(e: &RepositoryError) -> StatusCode {
    match e {
        RepositoryError::NotFound(_) => StatusCode::NOT_FOUND,
        RepositoryError::DuplicateId(_) | RepositoryError::SlotTaken => StatusCode::CONFLICT,
        RepositoryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
