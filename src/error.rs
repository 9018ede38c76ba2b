use std::fmt::Display;

use thiserror::Error;

/// Coarse classification of a failed operation, as reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Validation,
    BadRequest,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("not authorized to access {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Validation(_) => ErrorKind::Validation,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Sqlite(err) if is_constraint_violation(err) => ErrorKind::Conflict,
            Self::Sqlite(_) | Self::Json(_) | Self::Io(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::ConstraintViolation)
    )
}
