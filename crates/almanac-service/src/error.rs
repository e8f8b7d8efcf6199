use salvo::http::StatusCode;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Casbin error: {0}")]
    CasbinError(#[from] casbin::Error),

    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// ## Summary
    /// HTTP status a request handler answers with when a collaborator fails.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedCredentials(_) | Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::CasbinError(_)
            | Self::CoreError(_)
            | Self::IoError(_)
            | Self::XmlError(_)
            | Self::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
