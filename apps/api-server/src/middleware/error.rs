//! Error handling - RFC 7807 problem bodies and the commit envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use folio_core::error::{DomainError, PublishError, RepoError};
use folio_shared::{ErrorResponse, FieldErrorDto, PublishResponse};

const GENERIC_FAILURE: &str = "Something went wrong while saving. Please try again.";

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The problem body for this error, without a request id.
    pub fn problem(&self) -> ErrorResponse {
        let status = self.status_code().as_u16();
        match self {
            AppError::NotFound(detail) => ErrorResponse::new(status, "Not Found").with_detail(detail),
            AppError::BadRequest(detail) => {
                ErrorResponse::new(status, "Bad Request").with_detail(detail)
            }
            AppError::Unauthorized(detail) => {
                ErrorResponse::new(status, "Unauthorized").with_detail(detail)
            }
            AppError::Forbidden => ErrorResponse::new(status, "Forbidden"),
            AppError::Conflict(detail) => ErrorResponse::new(status, "Conflict").with_detail(detail),
            AppError::Internal(_) => ErrorResponse::new(status, "Internal Server Error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!("Internal error: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(self.problem())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Forbidden,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::from(DomainError::from(err))
    }
}

/// Failure of a commit endpoint, answered with the
/// `{success: false, error, errors?}` envelope instead of a problem body.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl EnvelopeError {
    fn envelope(&self) -> PublishResponse {
        match self {
            EnvelopeError::Publish(e) if e.is_user_error() => {
                let errors = e
                    .field_errors()
                    .into_iter()
                    .map(|f| FieldErrorDto {
                        field: f.field,
                        message: f.message,
                    })
                    .collect();
                PublishResponse::failed(e.to_string()).with_errors(errors)
            }
            EnvelopeError::Domain(DomainError::Validation(msg)) => {
                PublishResponse::failed(msg.clone())
            }
            _ => PublishResponse::failed(GENERIC_FAILURE),
        }
    }
}

impl ResponseError for EnvelopeError {
    fn status_code(&self) -> StatusCode {
        match self {
            EnvelopeError::Publish(e) => match e {
                PublishError::Validation(_) | PublishError::InvalidTaxonomyName { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PublishError::SlugTaken(_) | PublishError::TaxonomyConflict { .. } => {
                    StatusCode::CONFLICT
                }
                PublishError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                PublishError::NotFound => StatusCode::NOT_FOUND,
                PublishError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            EnvelopeError::Domain(e) => match e {
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::Duplicate(_) => StatusCode::CONFLICT,
                DomainError::Unauthorized => StatusCode::FORBIDDEN,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "commit failed");
        } else {
            tracing::debug!(error = %self, "commit rejected");
        }
        HttpResponse::build(status).json(self.envelope())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
