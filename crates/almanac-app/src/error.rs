use salvo::http::StatusCode;
use thiserror::Error;

use crate::app::api::dav::extract::body::DecodeError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] almanac_service::error::ServiceError),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    #[error(transparent)]
    DecodeError(#[from] DecodeError),

    #[error("Failed to read request body: {0}")]
    BodyError(String),
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(e) => e.status_code(),
            Self::DecodeError(_) | Self::BodyError(_) => StatusCode::BAD_REQUEST,
            Self::CoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
