use std::fmt::Display;

use models::errors::{is_unique_violation, ModelError};
use sea_orm::DbErr;
use thiserror::Error;

/// Failures surfaced by the user service.
#[derive(Debug, Error)]
pub enum UserError {
    /// Malformed or missing input; raised before any store call.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A write hit a unique index.
    #[error("conflict: {0}")]
    Conflict(String),
    /// No active row for the targeted id.
    #[error("not found: {0}")]
    NotFound(String),
    /// Anything else the store reported, including failed begin/commit.
    #[error("store error: {0}")]
    Store(String),
}

impl UserError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            UserError::Validation(_) => 2001,
            UserError::Conflict(_) => 2002,
            UserError::NotFound(_) => 2003,
            UserError::Store(_) => 2100,
        }
    }

    pub fn not_found(id: i32) -> Self { Self::NotFound(format!("user {id} not found")) }

    pub(crate) fn store(context: &str, err: impl Display) -> Self {
        Self::Store(format!("{context}: {err}"))
    }
}

impl From<DbErr> for UserError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            UserError::Conflict(err.to_string())
        } else {
            UserError::Store(err.to_string())
        }
    }
}

impl From<ModelError> for UserError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => UserError::Validation(msg),
            ModelError::Db(e) => e.into(),
        }
    }
}
