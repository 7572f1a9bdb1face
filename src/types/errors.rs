use std::fmt;

// === StoreError ===

/// Errors raised by a bookmark store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given ID exists.
    NotFound(String),
    /// The store refused the operation (e.g. editing a root folder).
    InvalidOperation(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            StoreError::InvalidOperation(msg) => write!(f, "Invalid bookmark operation: {}", msg),
            StoreError::DatabaseError(msg) => write!(f, "Bookmark database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

// === NavigationError ===

/// Errors surfaced by the tree navigation core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A referenced record no longer exists. Expected under concurrent mutation.
    NotFound(String),
    /// Caller misuse, e.g. opening a level for a bookmark.
    InvalidTransition(String),
    /// The underlying store rejected a call.
    StoreUnavailable(String),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::NotFound(id) => write!(f, "Tree not found: {}", id),
            NavigationError::InvalidTransition(msg) => {
                write!(f, "Invalid navigation transition: {}", msg)
            }
            NavigationError::StoreUnavailable(msg) => {
                write!(f, "Bookmark store unavailable: {}", msg)
            }
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<StoreError> for NavigationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => NavigationError::NotFound(id),
            other => NavigationError::StoreUnavailable(other.to_string()),
        }
    }
}

// === PreferencesError ===

/// Errors related to user preferences.
#[derive(Debug)]
pub enum PreferencesError {
    /// The option name is not part of the schema.
    InvalidKey(String),
    /// The value does not satisfy the option's type, choices or bounds.
    InvalidValue(String),
    /// File system I/O error.
    IoError(String),
    /// JSON serialization/deserialization error.
    SerializationError(String),
}

impl fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferencesError::InvalidKey(key) => write!(f, "Unknown option: {}", key),
            PreferencesError::InvalidValue(msg) => write!(f, "Invalid option value: {}", msg),
            PreferencesError::IoError(msg) => write!(f, "Preferences I/O error: {}", msg),
            PreferencesError::SerializationError(msg) => {
                write!(f, "Preferences serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for PreferencesError {}

// === HistoryError ===

/// Errors related to the persisted navigation history.
#[derive(Debug)]
pub enum HistoryError {
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::DatabaseError(msg) => write!(f, "Navigation history database error: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {}
