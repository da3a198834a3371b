//! Domain-level error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::TermKind;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Clone, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// A store-level uniqueness constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// A validation problem attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Taxonomy resolution failures.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("{kind} name must contain at least one letter or digit")]
    InvalidName { kind: TermKind },

    #[error("{kind} '{name}' could not be created or found after retrying")]
    Conflict { kind: TermKind, name: String },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Failures of the publishing workflow.
///
/// Validation and uniqueness problems are expected outcomes and carry enough
/// detail to be shown next to the offending field.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Slug '{0}' is already used by another post")]
    SlugTaken(String),

    #[error("{kind} name must contain at least one letter or digit")]
    InvalidTaxonomyName { kind: TermKind },

    #[error("{kind} '{name}' could not be created or found after retrying")]
    TaxonomyConflict { kind: TermKind, name: String },

    #[error("Sign in to publish")]
    NotAuthenticated,

    #[error("Post not found")]
    NotFound,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] RepoError),
}

impl PublishError {
    /// Field-level details, when the error maps onto specific inputs.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            PublishError::Validation(errors) => errors.clone(),
            PublishError::SlugTaken(slug) => vec![FieldError::new(
                "slug",
                format!("'{slug}' is already used by another post"),
            )],
            PublishError::InvalidTaxonomyName { kind } => vec![FieldError::new(
                kind.field_name(),
                format!("{kind} name must contain at least one letter or digit"),
            )],
            _ => Vec::new(),
        }
    }

    /// Whether the error is an expected, author-correctable outcome.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            PublishError::Persistence(_) | PublishError::TaxonomyConflict { .. }
        )
    }
}

impl From<TaxonomyError> for PublishError {
    fn from(err: TaxonomyError) -> Self {
        match err {
            TaxonomyError::InvalidName { kind } => PublishError::InvalidTaxonomyName { kind },
            TaxonomyError::Conflict { kind, name } => PublishError::TaxonomyConflict { kind, name },
            TaxonomyError::Repo(e) => PublishError::Persistence(e),
        }
    }
}
