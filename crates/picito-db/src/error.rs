//! Database-specific error types and conversions.

use picito_core::error::PicitoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored record could not be decoded: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    UniqueViolation { entity: String },

    #[error("Transaction on {entity} conflicted with a concurrent write")]
    Conflict { entity: String },
}

impl DbError {
    /// Classifies a failed statement. Unique-index and duplicate record
    /// id failures become [`DbError::UniqueViolation`], aborted
    /// transactions become [`DbError::Conflict`], so the raw store
    /// message never reaches callers.
    pub fn from_statement(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") || message.contains("already exists") {
            DbError::UniqueViolation {
                entity: entity.into(),
            }
        } else if is_conflict(&message) {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// Commit-time write conflicts, and the statements of a transaction
/// that was rolled back because of one.
fn is_conflict(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("conflict")
        || message.contains("can be retried")
        || message.contains("failed transaction")
        || message.contains("cancelled transaction")
}

impl From<DbError> for PicitoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PicitoError::NotFound { entity, id },
            DbError::UniqueViolation { entity } => PicitoError::AlreadyExists { entity },
            DbError::Conflict { entity } => PicitoError::ConcurrentModification { entity },
            other => PicitoError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_already_exists() {
        let err: PicitoError = DbError::UniqueViolation {
            entity: "user".into(),
        }
        .into();
        assert!(matches!(err, PicitoError::AlreadyExists { entity } if entity == "user"));
    }

    #[test]
    fn conflict_maps_to_concurrent_modification() {
        let err: PicitoError = DbError::Conflict {
            entity: "membership".into(),
        }
        .into();
        assert!(matches!(err, PicitoError::ConcurrentModification { entity } if entity == "membership"));
    }

    #[test]
    fn aborted_transaction_messages_are_conflicts() {
        assert!(is_conflict(
            "Failed to commit transaction due to a read or write conflict. \
             This transaction can be retried"
        ));
        assert!(is_conflict("The query was not executed due to a failed transaction"));
        assert!(!is_conflict("Found 'x' for field `role`, but expected a string"));
    }

    #[test]
    fn query_failure_maps_to_database() {
        let err: PicitoError = DbError::Query("boom".into()).into();
        assert!(matches!(err, PicitoError::Database(_)));
    }
}
