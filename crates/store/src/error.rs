use thiserror::Error;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalog has no item with this name.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// An item with this name is already in the catalog.
    #[error("Item already exists: {0}")]
    ItemAlreadyExists(String),

    /// A user with this username already exists.
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    /// A submission without lines was appended.
    #[error("Cannot append a submission without lines")]
    EmptySubmission,

    /// A stored row could not be mapped back to its type.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
