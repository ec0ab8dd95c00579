//! Error types for yoursql

use thiserror::Error;

/// Result type alias for yoursql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Which argument of `limit` / `offset` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitArg {
    Limit,
    Offset,
}

impl std::fmt::Display for LimitArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitArg::Limit => f.write_str("limit"),
            LimitArg::Offset => f.write_str("offset"),
        }
    }
}

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum SqlError {
    /// An asserted primitive type does not match the value
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// An asserted object class has no registered encoder
    #[error("No encoder registered for type '{0}'")]
    UnregisteredType(String),

    /// The value cannot be rendered as SQL at all
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// A bulk operation received no rows
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A column selection resolved to zero columns
    #[error("Column selection resolves to no columns")]
    EmptyColumns,

    /// A SET clause resolved to zero assignments
    #[error("SET clause resolves to no assignments")]
    EmptyAssignment,

    /// A SET value is not a pre-rendered SQL expression
    #[error("SET value for '{column}' must be a SQL expression string, got {actual}")]
    InvalidSetValue { column: String, actual: String },

    /// `limit` / `offset` received a non-numeric argument
    #[error("Invalid {arg} type: expected number or bigint, got {actual}")]
    InvalidLimitType { arg: LimitArg, actual: String },

    /// A value inside a row could not be encoded
    #[error("Failed to encode row {row}, column '{column}': {source}")]
    RowEncode {
        row: usize,
        column: String,
        #[source]
        source: Box<SqlError>,
    },

    /// Row validation against table metadata failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// A transaction already has a statement in flight
    #[error("Transaction is busy: another statement is still running")]
    TransactionBusy,

    /// The transaction was already committed or rolled back
    #[error("Transaction is already {0}")]
    TransactionClosed(&'static str),

    /// The pooled connection was already released
    #[error("Connection has been released")]
    ConnectionReleased,

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SqlError {
    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Attach row/column context to an encoding failure.
    pub fn in_row(self, row: usize, column: impl Into<String>) -> Self {
        Self::RowEncode {
            row,
            column: column.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error came from building SQL text (as opposed to running it)
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::UnregisteredType(_)
                | Self::UnsupportedType(_)
                | Self::EmptyInput(_)
                | Self::EmptyColumns
                | Self::EmptyAssignment
                | Self::InvalidSetValue { .. }
                | Self::InvalidLimitType { .. }
                | Self::RowEncode { .. }
        )
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a busy-transaction rejection
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::TransactionBusy)
    }

    /// Parse a tokio_postgres error into a more specific SqlError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::UniqueViolation(format!("{}: {}", constraint, message)),
                "23503" => {
                    return Self::ForeignKeyViolation(format!("{}: {}", constraint, message));
                }
                "23514" => return Self::CheckViolation(format!("{}: {}", constraint, message)),
                _ => {}
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
