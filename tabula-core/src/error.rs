//! Error types for Tabula

use thiserror::Error;

/// The main error type for Tabula operations
#[derive(Error, Debug)]
pub enum Error {
    /// Failure to establish the underlying connection
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Constraint violation reported by the engine (unique, foreign key,
    /// not-null, check)
    #[error("constraint violation: {0}")]
    Constraint(#[source] sqlx::Error),

    /// Any other statement execution failure
    #[error("execution error: {0}")]
    Execution(#[source] sqlx::Error),

    /// Invalid statement configuration
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Row decode error
    #[error("row decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Convenience Result type for Tabula operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// True if the engine rejected the statement over a constraint
    pub fn is_constraint(&self) -> bool {
        matches!(self, Self::Constraint(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        let kind = e.as_database_error().map(|db| db.kind());
        match kind {
            Some(ErrorKind::UniqueViolation)
            | Some(ErrorKind::ForeignKeyViolation)
            | Some(ErrorKind::NotNullViolation)
            | Some(ErrorKind::CheckViolation) => Self::Constraint(e),
            _ => Self::Execution(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_error() {
        let err = Error::invalid_query("update requires at least one set column");
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert_eq!(
            err.to_string(),
            "invalid query: update requires at least one set column"
        );
    }

    #[test]
    fn test_execution_classification() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Execution(_)));
        assert!(!err.is_constraint());
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Decode(_)));
    }
}
