//! Error taxonomy for the grading engine.
//!
//! Engine operations return [`EngineError`]; the IPC layer maps each variant to
//! a stable error code. Infrastructure code (opening the workspace, backups)
//! stays on `anyhow`.

use rusqlite::ffi;
use serde::Serialize;
use thiserror::Error;

/// One failing input field and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Input rejected before any write. Lists every failing field.
    #[error("validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldError> },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique or foreign-key constraint refused the write.
    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Stable code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Storage(_) => "db_error",
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn extended_code(e: &rusqlite::Error) -> Option<i32> {
    match e {
        rusqlite::Error::SqliteFailure(f, _) => Some(f.extended_code),
        _ => None,
    }
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        extended_code(e),
        Some(ffi::SQLITE_CONSTRAINT_UNIQUE) | Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

pub fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
    extended_code(e) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_lists_every_field() {
        let e = EngineError::validation(vec![
            FieldError::new("attendancePercentage", "must be between 5 and 20"),
            FieldError::new("total", "percentages must sum to 100 (remaining: 1)"),
        ]);
        assert_eq!(
            e.to_string(),
            "validation failed: attendancePercentage: must be between 5 and 20; \
             total: percentages must sum to 100 (remaining: 1)"
        );
        assert_eq!(e.code(), "validation_failed");
    }

    #[test]
    fn not_found_names_entity_and_key() {
        let e = EngineError::not_found("assessment", "a-1");
        assert_eq!(e.to_string(), "assessment not found: a-1");
        assert_eq!(e.code(), "not_found");
    }

    #[test]
    fn unique_violation_is_detected() {
        let conn = rusqlite::Connection::open_in_memory().expect("open");
        conn.execute("CREATE TABLE t(a TEXT NOT NULL UNIQUE)", [])
            .expect("create");
        conn.execute("INSERT INTO t(a) VALUES('x')", []).expect("insert");
        let e = conn
            .execute("INSERT INTO t(a) VALUES('x')", [])
            .expect_err("duplicate");
        assert!(is_unique_violation(&e));
        assert!(!is_foreign_key_violation(&e));
    }
}
