//! popup-bookmarks: bookmark tree navigation core for a popup bookmark browser.
//!
//! Entry point: runs a console demo against an in-memory bookmark store.
//! The popup UI talks to the `popup-bookmarks-rpc` binary instead.

use std::error::Error;
use std::sync::Arc;

use popup_bookmarks::app::{App, ArrowKey};
use popup_bookmarks::database::Database;
use popup_bookmarks::managers::bookmark_store::BookmarkStore;
use popup_bookmarks::services::context_menu::menu_layout;
use popup_bookmarks::services::preferences::JsonPreferenceStore;
use popup_bookmarks::types::bookmark::CreateDetails;
use popup_bookmarks::types::preferences::ClickType;
use popup_bookmarks::types::tree::{TreeItem, TreeLevel};

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn print_level(index: usize, level: &TreeLevel) {
    println!("  [{}] {} ({})", index, level.folder.title, level.folder_id());
    for item in &level.children {
        match item {
            TreeItem::Record(record) => println!("      {:?}: {}", record.kind(), record.title),
            TreeItem::Placeholder { .. } => println!("      (empty)"),
        }
    }
}

async fn create(app: &App, parent_id: &str, title: &str, url: Option<&str>) -> Result<String, Box<dyn Error>> {
    let record = app
        .store
        .create(CreateDetails {
            parent_id: parent_id.to_string(),
            index: None,
            title: title.to_string(),
            url: url.map(str::to_string),
        })
        .await?;
    Ok(record.id)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            popup-bookmarks v{} - Demo Mode                ║", env!("CARGO_PKG_VERSION"));
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let prefs_dir = std::env::temp_dir().join("popup-bookmarks-demo");
    let db = Arc::new(Database::open_in_memory()?);
    let mut app = App::with_database(db, JsonPreferenceStore::new(Some(prefs_dir.join("preferences.json")))).await?;
    app.startup();

    section("Bookmark store");
    let rust = create(&app, "1", "Rust", None).await?;
    create(&app, &rust, "The Book", Some("https://doc.rust-lang.org/book/")).await?;
    create(&app, &rust, "crates.io", Some("https://crates.io/")).await?;
    let async_folder = create(&app, &rust, "Async", None).await?;
    create(&app, &async_folder, "Tokio", Some("https://tokio.rs/")).await?;
    create(&app, "1", "Zed", Some("https://zed.dev/")).await?;
    create(&app, "1", "alpha", Some("https://example.com/alpha")).await?;
    println!("  Created 7 records under the bookmarks bar");
    println!();

    // Let the reactor pick the new records up.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    section("Navigation");
    app.open_folder(0, &rust).await?;
    let snapshot = app.open_folder(1, &async_folder).await?;
    for (index, level) in snapshot.levels.iter().enumerate() {
        print_level(index, level);
    }
    let snapshot = app.press_arrow(ArrowKey::Down).await?;
    println!("  Keyboard target: {:?}", snapshot.keyboard_target.map(|item| item.display_id()));
    let snapshot = app.press_arrow(ArrowKey::Left).await?;
    println!("  After left: {} levels open", snapshot.levels.len());
    println!();

    section("Sort by name");
    let moves = app.actions.sort_by_name("1").await?;
    println!("  Applied {} moves", moves);
    for child in app.store.get_children("1").await? {
        println!("      {:?}: {}", child.kind(), child.title);
    }
    println!();

    section("Search");
    let snapshot = app.search("tok").await?;
    print_level(0, &snapshot.levels[0]);
    app.search("").await?;
    println!();

    section("Context menu and open plans");
    let zed = app
        .store
        .search("zed")
        .await?
        .into_iter()
        .next()
        .ok_or("Zed bookmark missing")?;
    for (index, area) in menu_layout(&TreeItem::Record(zed.clone()), false).iter().enumerate() {
        println!("  area {}: {:?}{}", index, area.keys, if area.hidden { " (hidden)" } else { "" });
    }
    let state = app.snapshot().await;
    let plan = app.open_bookmark(&zed.id, ClickType::Middle).await?;
    println!("  Middle click: {:?}, close popup: {}", plan.actions, plan.close_popup);
    println!("  Root shortcuts: {:?}", state.root_shortcuts.iter().map(|f| f.title.as_str()).collect::<Vec<_>>());
    println!();

    app.shutdown().await;
    let _ = std::fs::remove_dir_all(&prefs_dir);

    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Demo finished");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}
