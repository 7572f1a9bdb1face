//! Unit tests for the debounced change reactor.
//!
//! Time is paused so debounce windows elapse deterministically.

use std::sync::Arc;

use popup_bookmarks::database::Database;
use popup_bookmarks::managers::bookmark_store::{BookmarkStore, SqliteBookmarkStore};
use popup_bookmarks::managers::navigation_stack::NavigationStack;
use popup_bookmarks::managers::popup_state::PopupState;
use popup_bookmarks::services::change_reactor::ChangeReactor;
use popup_bookmarks::services::tree_builder::TreeLevelBuilder;
use popup_bookmarks::types::bookmark::{BookmarkEvent, CreateDetails, MoveDestination};
use popup_bookmarks::types::preferences::Options;
use popup_bookmarks::types::tree::TreeItem;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

const WINDOW: Duration = Duration::from_millis(30);

struct Fixture {
    store: Arc<SqliteBookmarkStore>,
    builder: TreeLevelBuilder<SqliteBookmarkStore>,
    state: Arc<Mutex<PopupState>>,
    reactor: ChangeReactor<SqliteBookmarkStore>,
}

async fn setup(root_id: &str) -> Fixture {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let store = Arc::new(SqliteBookmarkStore::new(Arc::new(db)));
    let builder = TreeLevelBuilder::new(store.clone());
    let stack = NavigationStack::new(builder.build_level(root_id).await.unwrap());
    let state = Arc::new(Mutex::new(PopupState::new(stack, Options::default())));
    let reactor = ChangeReactor::new(state.clone(), builder.clone(), WINDOW);
    Fixture {
        store,
        builder,
        state,
        reactor,
    }
}

async fn add(store: &SqliteBookmarkStore, parent_id: &str, title: &str, url: Option<&str>) -> String {
    store
        .create(CreateDetails {
            parent_id: parent_id.to_string(),
            index: None,
            title: title.to_string(),
            url: url.map(str::to_string),
        })
        .await
        .unwrap()
        .id
}

fn changed(id: &str) -> BookmarkEvent {
    BookmarkEvent::Changed {
        id: id.to_string(),
        title: "t".to_string(),
        url: None,
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_notifications_rebuilds_once() {
    let fx = setup("1").await;

    for _ in 0..5 {
        fx.reactor.notify(&changed("1"));
        sleep(Duration::from_millis(2)).await;
    }
    assert!(fx.reactor.is_pending());
    assert_eq!(fx.reactor.rebuild_count(), 0);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(fx.reactor.rebuild_count(), 1);
    assert!(!fx.reactor.is_pending());
}

#[tokio::test(start_paused = true)]
async fn test_window_restarts_with_each_notification() {
    let fx = setup("1").await;

    fx.reactor.notify(&changed("1"));
    sleep(Duration::from_millis(20)).await;
    fx.reactor.notify(&changed("1"));
    sleep(Duration::from_millis(20)).await;
    // 40ms after the first notification but only 20ms after the last.
    assert_eq!(fx.reactor.rebuild_count(), 0);

    sleep(Duration::from_millis(20)).await;
    assert_eq!(fx.reactor.rebuild_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_rebuild_separately() {
    let fx = setup("1").await;

    fx.reactor.notify(&changed("1"));
    sleep(Duration::from_millis(50)).await;
    fx.reactor.notify(&changed("1"));
    sleep(Duration::from_millis(50)).await;
    assert_eq!(fx.reactor.rebuild_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_removed_open_folder_closes_its_level() {
    let fx = setup("1").await;
    let a = add(&fx.store, "1", "A", None).await;
    let b = add(&fx.store, &a, "B", None).await;
    {
        let mut state = fx.state.lock().await;
        state.rebuild_after_change(&fx.builder, &[]).await.unwrap();
        state.open_folder(&fx.builder, 0, &a).await.unwrap();
        state.open_folder(&fx.builder, 1, &b).await.unwrap();
        assert_eq!(state.stack().len(), 3);
    }

    let _listener = fx.reactor.listen(fx.store.subscribe());
    fx.store.remove_tree(&a).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    let state = fx.state.lock().await;
    assert_eq!(state.stack().len(), 1);
    assert!(state.stack().root().child(&a).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_moved_open_folder_closes_its_level() {
    let fx = setup("1").await;
    let a = add(&fx.store, "1", "A", None).await;
    let b = add(&fx.store, &a, "B", None).await;
    add(&fx.store, &a, "page", Some("https://page.example")).await;
    {
        let mut state = fx.state.lock().await;
        state.rebuild_after_change(&fx.builder, &[]).await.unwrap();
        state.open_folder(&fx.builder, 0, &a).await.unwrap();
        state.open_folder(&fx.builder, 1, &b).await.unwrap();
    }

    fx.reactor.notify(&BookmarkEvent::Moved {
        id: b.clone(),
        parent_id: a.clone(),
        index: 1,
        old_parent_id: a.clone(),
        old_index: 0,
    });
    sleep(Duration::from_millis(100)).await;

    let state = fx.state.lock().await;
    assert_eq!(state.stack().folder_ids(), vec!["1".to_string(), a]);
}

#[tokio::test(start_paused = true)]
async fn test_created_bookmark_appears_after_rebuild() {
    let fx = setup("1").await;
    let _listener = fx.reactor.listen(fx.store.subscribe());

    let id = add(&fx.store, "1", "new page", Some("https://new.example")).await;
    sleep(Duration::from_millis(100)).await;

    let state = fx.state.lock().await;
    assert!(state.stack().root().child(&id).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_rebuild_dismisses_menu_and_editor() {
    let fx = setup("1").await;
    let id = add(&fx.store, "1", "page", Some("https://page.example")).await;
    {
        let mut state = fx.state.lock().await;
        state.rebuild_after_change(&fx.builder, &[]).await.unwrap();
        let item = TreeItem::Record(fx.store.get(&id).await.unwrap());
        state.open_menu(item.clone());
        assert!(state.menu_target().is_some());
        state.set_keyboard_target(Some(item));
    }

    fx.reactor.notify(&changed(&id));
    sleep(Duration::from_millis(100)).await;

    let state = fx.state.lock().await;
    assert!(state.menu_target().is_none());
    assert!(state.editor_target().is_none());
    assert!(state.keyboard_target().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_failed_rebuild_is_absorbed() {
    let fx = setup("1").await;
    let top = add(&fx.store, "1", "top", None).await;
    {
        let mut state = fx.state.lock().await;
        *state = PopupState::new(
            NavigationStack::new(fx.builder.build_level(&top).await.unwrap()),
            Options::default(),
        );
    }
    fx.store.remove_tree(&top).await.unwrap();

    fx.reactor.notify(&changed(&top));
    sleep(Duration::from_millis(100)).await;

    assert_eq!(fx.reactor.rebuild_count(), 1);
    let state = fx.state.lock().await;
    assert_eq!(state.stack().root().folder_id(), top);
}

#[tokio::test(start_paused = true)]
async fn test_generation_is_bumped_per_rebuild() {
    let fx = setup("1").await;
    let mut generation = fx.reactor.subscribe_generation();
    assert_eq!(*generation.borrow(), 0);

    fx.reactor.request_rebuild();
    generation.changed().await.unwrap();
    assert_eq!(*generation.borrow_and_update(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sort_burst_triggers_single_rebuild() {
    let fx = setup("1").await;
    for title in ["d", "c", "b", "a"] {
        add(&fx.store, "1", title, Some("https://x.example")).await;
    }
    let _listener = fx.reactor.listen(fx.store.subscribe());

    let children = fx.store.get_children("1").await.unwrap();
    for (i, child) in children.iter().rev().enumerate() {
        fx.store
            .move_item(
                &child.id,
                MoveDestination {
                    parent_id: None,
                    index: Some(i),
                },
            )
            .await
            .unwrap();
    }
    sleep(Duration::from_millis(100)).await;

    assert_eq!(fx.reactor.rebuild_count(), 1);
}
