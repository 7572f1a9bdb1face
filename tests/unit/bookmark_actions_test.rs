//! Unit tests for bookmark actions and open planning.

use std::sync::Arc;

use popup_bookmarks::database::Database;
use popup_bookmarks::managers::bookmark_store::{BookmarkStore, SqliteBookmarkStore};
use popup_bookmarks::services::bookmark_actions::{
    open_plan, separator_title, BookmarkActions, OpenAction, OpenAllOptions, OpenPlan,
};
use popup_bookmarks::types::bookmark::{BookmarkKind, BookmarkRecord, CreateDetails};
use popup_bookmarks::types::errors::NavigationError;
use popup_bookmarks::types::preferences::{ClickType, Options};
use popup_bookmarks::types::tree::{ClipboardEntry, ClipboardMode, TreeItem};
use rstest::rstest;

fn setup() -> (Arc<SqliteBookmarkStore>, BookmarkActions<SqliteBookmarkStore>) {
    let db = Database::open_in_memory().expect("Failed to open in-memory database");
    let store = Arc::new(SqliteBookmarkStore::new(Arc::new(db)));
    let actions = BookmarkActions::new(store.clone());
    (store, actions)
}

async fn add(store: &SqliteBookmarkStore, parent_id: &str, title: &str, url: Option<&str>) -> BookmarkRecord {
    store
        .create(CreateDetails {
            parent_id: parent_id.to_string(),
            index: None,
            title: title.to_string(),
            url: url.map(str::to_string),
        })
        .await
        .unwrap()
}

async fn child_titles(store: &SqliteBookmarkStore, parent_id: &str) -> Vec<String> {
    store
        .get_children(parent_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect()
}

fn page(url: &str) -> BookmarkRecord {
    BookmarkRecord {
        id: "42".to_string(),
        parent_id: Some("1".to_string()),
        title: "page".to_string(),
        url: Some(url.to_string()),
        index: 0,
        date_added: 0,
        date_group_modified: None,
    }
}

#[tokio::test]
async fn test_add_page_goes_right_after_target() {
    let (store, actions) = setup();
    let first = add(&store, "1", "first", Some("https://1.example")).await;
    add(&store, "1", "last", Some("https://3.example")).await;

    let created = actions
        .add_page(&TreeItem::Record(first), "middle", "https://2.example")
        .await
        .unwrap();
    assert_eq!(created.index, 1);
    assert_eq!(child_titles(&store, "1").await, vec!["first", "middle", "last"]);
}

#[tokio::test]
async fn test_add_into_empty_folder_via_placeholder() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "empty", None).await;

    let created = actions
        .add_folder(
            &TreeItem::Placeholder {
                parent_id: folder.id.clone(),
            },
            "inner",
        )
        .await
        .unwrap();
    assert_eq!(created.parent_id.as_deref(), Some(folder.id.as_str()));
    assert_eq!(created.index, 0);
    assert_eq!(created.kind(), BookmarkKind::Folder);
}

#[tokio::test]
async fn test_add_separator() {
    let (store, actions) = setup();
    let first = add(&store, "1", "first", Some("https://1.example")).await;

    let created = actions.add_separator(&TreeItem::Record(first)).await.unwrap();
    assert_eq!(created.kind(), BookmarkKind::Separator);
    assert_eq!(created.title, separator_title());
}

#[tokio::test]
async fn test_cannot_add_next_to_top_level_folder() {
    let (store, actions) = setup();
    let bar = store.get("1").await.unwrap();
    let result = actions.add_folder(&TreeItem::Record(bar), "nope").await;
    assert!(matches!(result, Err(NavigationError::InvalidTransition(_))));
}

#[tokio::test]
async fn test_edit_folder_ignores_url() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "folder", None).await;
    let bookmark = add(&store, "1", "page", Some("https://old.example")).await;

    let renamed = actions
        .edit(&folder, "renamed", Some("https://ignored.example"))
        .await
        .unwrap();
    assert_eq!(renamed.title, "renamed");
    assert_eq!(renamed.url, None);

    let edited = actions
        .edit(&bookmark, "page 2", Some("https://new.example"))
        .await
        .unwrap();
    assert_eq!(edited.url.as_deref(), Some("https://new.example"));
}

#[tokio::test]
async fn test_remove_folder_takes_contents() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "folder", None).await;
    let inner = add(&store, &folder.id, "inner", Some("https://i.example")).await;

    actions.remove(&folder).await.unwrap();
    assert!(store.get(&folder.id).await.is_err());
    assert!(store.get(&inner.id).await.is_err());
}

#[tokio::test]
async fn test_sort_by_name_orders_runs() {
    let (store, actions) = setup();
    add(&store, "1", "b page", Some("https://b.example")).await;
    add(&store, "1", "Z folder", None).await;
    add(&store, "1", "a page", Some("https://a.example")).await;
    add(&store, "1", "sep", Some("http://separatethis.com/")).await;
    add(&store, "1", "d page", Some("https://d.example")).await;
    add(&store, "1", "c folder", None).await;

    let moves = actions.sort_by_name("1").await.unwrap();
    assert!(moves > 0);
    assert_eq!(
        child_titles(&store, "1").await,
        vec!["Z folder", "a page", "b page", "sep", "c folder", "d page"]
    );

    // Sorting sorted children makes no moves.
    assert_eq!(actions.sort_by_name("1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_sort_missing_folder_fails() {
    let (_, actions) = setup();
    assert!(actions.sort_by_name("404").await.is_err());
}

#[tokio::test]
async fn test_paste_cut_moves_entry() {
    let (store, actions) = setup();
    let moving = add(&store, "1", "moving", Some("https://m.example")).await;
    let target = add(&store, "2", "target", Some("https://t.example")).await;

    let entry = ClipboardEntry {
        mode: ClipboardMode::Cut,
        id: moving.id.clone(),
    };
    let moved = actions.paste(&entry, &TreeItem::Record(target)).await.unwrap();
    assert_eq!(moved.id, moving.id);
    assert_eq!(moved.parent_id.as_deref(), Some("2"));
    assert_eq!(child_titles(&store, "2").await, vec!["target", "moving"]);
    assert!(child_titles(&store, "1").await.is_empty());
}

#[tokio::test]
async fn test_paste_copy_duplicates_subtree() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "folder", None).await;
    add(&store, &folder.id, "one", Some("https://1.example")).await;
    let nested = add(&store, &folder.id, "nested", None).await;
    add(&store, &nested.id, "deep", Some("https://deep.example")).await;

    let entry = ClipboardEntry {
        mode: ClipboardMode::Copy,
        id: folder.id.clone(),
    };
    let copy = actions
        .paste(&entry, &TreeItem::Placeholder { parent_id: "2".to_string() })
        .await
        .unwrap();

    assert_ne!(copy.id, folder.id);
    assert_eq!(copy.parent_id.as_deref(), Some("2"));
    assert_eq!(child_titles(&store, &copy.id).await, vec!["one", "nested"]);
    let nested_copy = store.get_children(&copy.id).await.unwrap()[1].clone();
    assert_eq!(child_titles(&store, &nested_copy.id).await, vec!["deep"]);
    // The original stays.
    assert_eq!(child_titles(&store, &folder.id).await, vec!["one", "nested"]);
}

#[tokio::test]
async fn test_open_all_plan_tabs() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "folder", None).await;
    add(&store, &folder.id, "a", Some("https://a.example")).await;
    add(&store, &folder.id, "sub", None).await;
    add(&store, &folder.id, "sep", Some("http://separatethis.com/")).await;
    add(&store, &folder.id, "b", Some("https://b.example")).await;

    let plan = actions
        .open_all_plan(&folder, OpenAllOptions::default())
        .await
        .unwrap();
    assert_eq!(
        plan,
        OpenPlan {
            actions: vec![
                OpenAction::CreateTab {
                    url: "https://a.example".to_string(),
                    active: false
                },
                OpenAction::CreateTab {
                    url: "https://b.example".to_string(),
                    active: false
                },
            ],
            close_popup: true,
            needs_confirmation: false,
        }
    );
}

#[tokio::test]
async fn test_open_all_plan_window_with_warning() {
    let (store, actions) = setup();
    let folder = add(&store, "1", "folder", None).await;
    for i in 0..6 {
        add(&store, &folder.id, &format!("p{}", i), Some(&format!("https://{}.example", i))).await;
    }

    let options = OpenAllOptions {
        new_window: true,
        incognito: true,
        warn_when_open_many: true,
    };
    let plan = actions.open_all_plan(&folder, options).await.unwrap();
    assert!(plan.needs_confirmation);
    match &plan.actions[..] {
        [OpenAction::CreateWindow { urls, incognito }] => {
            assert_eq!(urls.len(), 6);
            assert!(*incognito);
        }
        other => panic!("unexpected actions: {:?}", other),
    }

    let quiet = OpenAllOptions {
        warn_when_open_many: false,
        ..options
    };
    assert!(!actions.open_all_plan(&folder, quiet).await.unwrap().needs_confirmation);
}

#[rstest]
#[case(ClickType::Left, OpenAction::UpdateCurrentTab { url: "https://x.example".to_string() }, true)]
#[case(ClickType::Middle, OpenAction::CreateTab { url: "https://x.example".to_string(), active: true }, true)]
#[case(ClickType::LeftCtrl, OpenAction::CreateTab { url: "https://x.example".to_string(), active: false }, false)]
#[case(ClickType::LeftShift, OpenAction::CreateWindow { urls: vec!["https://x.example".to_string()], incognito: false }, true)]
fn test_open_plan_follows_click_options(#[case] click: ClickType, #[case] expected: OpenAction, #[case] closes: bool) {
    let plan = open_plan(&page("https://x.example"), click, &Options::default()).unwrap();
    assert_eq!(plan.actions, vec![expected]);
    assert_eq!(plan.close_popup, closes);
    assert!(!plan.needs_confirmation);
}

#[test]
fn test_open_plan_runs_scripts_in_place() {
    let plan = open_plan(&page("javascript:alert(1)"), ClickType::Middle, &Options::default()).unwrap();
    assert_eq!(
        plan.actions,
        vec![OpenAction::ExecuteScript {
            code: "javascript:alert(1)".to_string()
        }]
    );
}

#[test]
fn test_open_plan_unknown_method_only_closes() {
    let options = Options {
        click_by_left: 9,
        ..Options::default()
    };
    let plan = open_plan(&page("https://x.example"), ClickType::Left, &options).unwrap();
    assert!(plan.actions.is_empty());
    assert!(plan.close_popup);
}

#[test]
fn test_open_plan_rejects_non_bookmarks() {
    let mut folder = page("https://x.example");
    folder.url = None;
    assert!(matches!(
        open_plan(&folder, ClickType::Left, &Options::default()),
        Err(NavigationError::InvalidTransition(_))
    ));
}
