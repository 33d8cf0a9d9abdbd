//! Errors surfaced by the journal stores.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Which column rule a rejected write broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Required,
    Format,
    Unique,
    Range,
    ForeignKey,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConstraintKind::Required => "value is required",
            ConstraintKind::Format => "invalid format",
            ConstraintKind::Unique => "already taken",
            ConstraintKind::Range => "out of range",
            ConstraintKind::ForeignKey => "unknown reference",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("constraint violation on {field}: {kind}")]
    ConstraintViolation {
        field: &'static str,
        kind: ConstraintKind,
    },

    /// Returned both for rows that do not exist and rows owned by someone else.
    #[error("not permitted")]
    NotPermitted,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn violation(field: &'static str, kind: ConstraintKind) -> Self {
        StoreError::ConstraintViolation { field, kind }
    }
}
