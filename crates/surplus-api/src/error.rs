use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use surplus_types::api::ErrorResponse;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields";
pub const FILL_REQUIRED_FIELDS: &str = "Please fill in all required fields";

/// Every failure reaches the user as a single line of alert text.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingFields(&'static str),

    #[error("{0}")]
    InvalidField(&'static str),

    #[error("Food item not found")]
    NotFound,

    #[error("{0} has already been requested")]
    AlreadyRequested(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingFields(_) | AppError::InvalidField(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyRequested(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let alert = match &self {
            AppError::Internal(e) => {
                error!("{:#}", e);
                "Something went wrong, please try again".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { alert })).into_response()
    }
}

/// Joins a blocking store task, mapping a panicked task to an internal error.
pub(crate) fn join_error(e: tokio::task::JoinError) -> AppError {
    error!("spawn_blocking join error: {}", e);
    AppError::Internal(anyhow::anyhow!("store task failed"))
}
