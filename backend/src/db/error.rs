//! Errors raised by the persistence layer.

/// Error returned by the generic persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A uniqueness, not-null or check constraint rejected the write.
    #[error("{message}")]
    Validation {
        message: String,
        /// Columns of the violated constraint, when they could be resolved.
        fields: Vec<String>,
        object_id: Option<i64>,
    },

    /// A referenced row does not exist.
    #[error("{message}")]
    ForeignKey {
        message: String,
        object_id: Option<i64>,
    },

    /// An update targeted a primary key with no row behind it.
    #[error("{entity} {id} not found")]
    RowNotFound { entity: &'static str, id: i64 },

    /// A filter referenced a column the record does not have.
    #[error("unknown column `{column}` for {entity}")]
    UnknownColumn {
        entity: &'static str,
        column: &'static str,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}
