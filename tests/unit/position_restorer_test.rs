//! Unit tests for restoring the last used position.

use std::sync::Arc;

use popup_bookmarks::database::Database;
use popup_bookmarks::managers::bookmark_store::{BookmarkStore, SqliteBookmarkStore};
use popup_bookmarks::services::position_restorer::restore;
use popup_bookmarks::services::tree_builder::TreeLevelBuilder;
use popup_bookmarks::types::bookmark::{CreateDetails, MoveDestination};
use popup_bookmarks::types::errors::NavigationError;

fn setup() -> (Arc<SqliteBookmarkStore>, TreeLevelBuilder<SqliteBookmarkStore>) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let store = Arc::new(SqliteBookmarkStore::new(Arc::new(db)));
    let builder = TreeLevelBuilder::new(store.clone());
    (store, builder)
}

async fn folder(store: &SqliteBookmarkStore, parent_id: &str, title: &str) -> String {
    store
        .create(CreateDetails {
            parent_id: parent_id.to_string(),
            index: None,
            title: title.to_string(),
            url: None,
        })
        .await
        .unwrap()
        .id
}

fn chain(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_empty_chain_gives_default_root() {
    let (_, builder) = setup();
    let stack = restore(&builder, &[], "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1"]);
}

#[tokio::test]
async fn test_full_chain_is_restored() {
    let (store, builder) = setup();
    let a = folder(&store, "1", "A").await;
    let b = folder(&store, &a, "B").await;
    let c = folder(&store, &b, "C").await;

    let stack = restore(&builder, &chain(&["1", &a, &b, &c]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1".to_string(), a, b, c]);
}

#[tokio::test]
async fn test_missing_middle_uses_current_ancestry() {
    let (store, builder) = setup();
    let a = folder(&store, "1", "A").await;
    let b = folder(&store, &a, "B").await;
    let c = folder(&store, &b, "C").await;

    // C is rescued into A, then B is deleted.
    store
        .move_item(
            &c,
            MoveDestination {
                parent_id: Some(a.clone()),
                index: None,
            },
        )
        .await
        .unwrap();
    store.remove_tree(&b).await.unwrap();

    let stack = restore(&builder, &chain(&[&a, &b, &c]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1".to_string(), a, c]);
}

#[tokio::test]
async fn test_missing_tail_falls_back_to_deepest_survivor() {
    let (store, builder) = setup();
    let a = folder(&store, "1", "A").await;
    let b = folder(&store, &a, "B").await;
    store.remove_tree(&b).await.unwrap();

    let stack = restore(&builder, &chain(&["1", &a, &b, "9999"]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1".to_string(), a]);
}

#[tokio::test]
async fn test_folder_outside_default_root_gives_default_root() {
    let (store, builder) = setup();
    let elsewhere = folder(&store, "2", "Elsewhere").await;

    let stack = restore(&builder, &chain(&["1", &elsewhere]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1"]);
}

#[tokio::test]
async fn test_nothing_resolves_gives_default_root() {
    let (_, builder) = setup();
    let stack = restore(&builder, &chain(&["77", "78"]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1"]);
}

#[tokio::test]
async fn test_chain_stops_at_default_root() {
    let (store, builder) = setup();
    let a = folder(&store, "1", "A").await;

    // Everything before the default root is ignored.
    let stack = restore(&builder, &chain(&[&a, "1"]), "1").await.unwrap();
    assert_eq!(stack.folder_ids(), vec!["1"]);
}

#[tokio::test]
async fn test_missing_default_root_is_an_error() {
    let (_, builder) = setup();
    let result = restore(&builder, &[], "404").await;
    assert!(matches!(result, Err(NavigationError::NotFound(_))));
}
