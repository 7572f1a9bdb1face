use popup_bookmarks::types::errors::*;

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::NotFound("42".to_string()).to_string(),
        "Bookmark not found: 42"
    );
    assert_eq!(
        StoreError::InvalidOperation("can't modify the root bookmark folders: 1".to_string()).to_string(),
        "Invalid bookmark operation: can't modify the root bookmark folders: 1"
    );
    assert_eq!(
        StoreError::DatabaseError("disk full".to_string()).to_string(),
        "Bookmark database error: disk full"
    );
}

#[test]
fn store_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StoreError::NotFound("id".to_string()));
    assert!(err.source().is_none());
}

// === NavigationError Tests ===

#[test]
fn navigation_error_display_variants() {
    assert_eq!(
        NavigationError::NotFound("7".to_string()).to_string(),
        "Tree not found: 7"
    );
    assert_eq!(
        NavigationError::InvalidTransition("8 is not a child of 1".to_string()).to_string(),
        "Invalid navigation transition: 8 is not a child of 1"
    );
    assert_eq!(
        NavigationError::StoreUnavailable("locked".to_string()).to_string(),
        "Bookmark store unavailable: locked"
    );
}

#[test]
fn navigation_error_from_store_not_found_keeps_id() {
    let err: NavigationError = StoreError::NotFound("12".to_string()).into();
    assert_eq!(err, NavigationError::NotFound("12".to_string()));
}

#[test]
fn navigation_error_from_other_store_errors_is_store_unavailable() {
    let err: NavigationError = StoreError::DatabaseError("busy".to_string()).into();
    assert_eq!(
        err,
        NavigationError::StoreUnavailable("Bookmark database error: busy".to_string())
    );

    let err: NavigationError = StoreError::InvalidOperation("nope".to_string()).into();
    assert!(matches!(err, NavigationError::StoreUnavailable(_)));
}

// === PreferencesError Tests ===

#[test]
fn preferences_error_display_variants() {
    assert_eq!(
        PreferencesError::InvalidKey("colour".to_string()).to_string(),
        "Unknown option: colour"
    );
    assert_eq!(
        PreferencesError::InvalidValue("fontSize: 99 is outside 10..=30".to_string()).to_string(),
        "Invalid option value: fontSize: 99 is outside 10..=30"
    );
    assert_eq!(
        PreferencesError::IoError("permission denied".to_string()).to_string(),
        "Preferences I/O error: permission denied"
    );
    assert_eq!(
        PreferencesError::SerializationError("trailing comma".to_string()).to_string(),
        "Preferences serialization error: trailing comma"
    );
}

// === HistoryError Tests ===

#[test]
fn history_error_display() {
    assert_eq!(
        HistoryError::DatabaseError("no such table".to_string()).to_string(),
        "Navigation history database error: no such table"
    );
}

#[test]
fn all_errors_are_boxable() {
    let errors: Vec<Box<dyn std::error::Error>> = vec![
        Box::new(StoreError::NotFound("a".to_string())),
        Box::new(NavigationError::NotFound("b".to_string())),
        Box::new(PreferencesError::InvalidKey("c".to_string())),
        Box::new(HistoryError::DatabaseError("d".to_string())),
    ];
    assert_eq!(errors.len(), 4);
}
