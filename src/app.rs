//! App Core for popup-bookmarks.
//!
//! Central struct wiring the bookmark store, preferences, navigation history,
//! popup state and change reactor, and managing their lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::database::connection::Database;
use crate::managers::bookmark_store::{BookmarkStore, SqliteBookmarkStore};
use crate::managers::navigation_history::{NavigationHistory, SqliteNavigationHistory};
use crate::managers::navigation_stack::NavigationStack;
use crate::managers::popup_state::{PopupSnapshot, PopupState};
use crate::services::bookmark_actions::{open_plan, BookmarkActions, OpenAllOptions, OpenPlan};
use crate::services::change_reactor::{ChangeReactor, DEBOUNCE_WINDOW};
use crate::services::context_menu::{menu_layout, MenuAction, MenuArea};
use crate::services::position_restorer;
use crate::services::preferences::{self, JsonPreferenceStore, OptionSpec};
use crate::services::tree_builder::TreeLevelBuilder;
use crate::types::bookmark::{BookmarkRecord, ROOT_ID};
use crate::types::errors::NavigationError;
use crate::types::preferences::{ClickType, Options};
use crate::types::tree::{ClipboardEntry, ClipboardMode, TreeItem};

/// Arrow keys handled by the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

/// Extra input some menu actions need.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct MenuInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// What a menu action left for the host to do.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MenuOutcome {
    Done,
    /// The host should open an editor for the target.
    EditorOpened,
    Open { plan: OpenPlan },
    Created { record: BookmarkRecord },
    Sorted { moves: usize },
}

/// Central application struct.
pub struct App {
    pub db: Arc<Database>,
    pub store: Arc<SqliteBookmarkStore>,
    pub preferences: JsonPreferenceStore,
    pub history: SqliteNavigationHistory,
    pub builder: TreeLevelBuilder<SqliteBookmarkStore>,
    pub actions: BookmarkActions<SqliteBookmarkStore>,
    pub state: Arc<Mutex<PopupState>>,
    pub reactor: ChangeReactor<SqliteBookmarkStore>,
    listener: Option<JoinHandle<()>>,
}

impl App {
    /// Opens the database at `db_path` and builds the initial popup state.
    pub async fn new(db_path: &str, preferences_path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Self::with_database(db, JsonPreferenceStore::new(preferences_path)).await
    }

    /// Builds the app on an already opened database.
    ///
    /// Options are loaded (missing ones written with defaults) and level 0
    /// is built, or the last used position restored when `rememberPos` is on.
    pub async fn with_database(
        db: Arc<Database>,
        preferences: JsonPreferenceStore,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let store = Arc::new(SqliteBookmarkStore::new(db.clone()));
        let history = SqliteNavigationHistory::new(db.clone());
        let builder = TreeLevelBuilder::new(store.clone());
        let actions = BookmarkActions::new(store.clone());

        let root_folders = store.get_children(ROOT_ID).await?;
        let options = preferences::init_options(&preferences, &preferences::option_schema(&root_folders))?;

        let stack = if options.remember_pos {
            let chain = history.load().unwrap_or_else(|e| {
                tracing::warn!("Could not load the last used position: {}", e);
                Vec::new()
            });
            position_restorer::restore(&builder, &chain, &options.default_root_id()).await?
        } else {
            NavigationStack::new(builder.build_level(&options.default_root_id()).await?)
        };

        let mut popup_state = PopupState::new(stack, options);
        popup_state.set_root_shortcuts(root_folders);
        let state = Arc::new(Mutex::new(popup_state));
        let reactor = ChangeReactor::new(state.clone(), builder.clone(), DEBOUNCE_WINDOW);

        Ok(Self {
            db,
            store,
            preferences,
            history,
            builder,
            actions,
            state,
            reactor,
            listener: None,
        })
    }

    /// Starts reacting to store notifications.
    pub fn startup(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(self.reactor.listen(self.store.subscribe()));
            tracing::info!("Listening for bookmark changes");
        }
    }

    /// Stops the listener and saves the current position.
    pub async fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        let state = self.state.lock().await;
        self.persist_position(&state);
    }

    /// Saves the open folder chain when `rememberPos` is on.
    fn persist_position(&self, state: &PopupState) {
        if !state.options().remember_pos || state.is_searching() {
            return;
        }
        if let Err(e) = self.history.save(&state.history_chain()) {
            tracing::warn!("Could not save the last used position: {}", e);
        }
    }

    pub async fn snapshot(&self) -> PopupSnapshot {
        self.state.lock().await.snapshot()
    }

    // --- navigation ---

    pub async fn open_folder(&self, level_index: usize, folder_id: &str) -> Result<PopupSnapshot, NavigationError> {
        let mut state = self.state.lock().await;
        state.open_folder(&self.builder, level_index, folder_id).await?;
        self.persist_position(&state);
        Ok(state.snapshot())
    }

    pub async fn close_levels_after(&self, level_index: usize) -> PopupSnapshot {
        let mut state = self.state.lock().await;
        state.close_levels_after(level_index);
        self.persist_position(&state);
        state.snapshot()
    }

    pub async fn open_root_shortcut(&self, folder_id: &str) -> Result<PopupSnapshot, NavigationError> {
        let mut state = self.state.lock().await;
        state.open_root_shortcut(&self.builder, folder_id).await?;
        self.persist_position(&state);
        Ok(state.snapshot())
    }

    pub async fn press_arrow(&self, key: ArrowKey) -> Result<PopupSnapshot, NavigationError> {
        let mut state = self.state.lock().await;
        match key {
            ArrowKey::Up => state.arrow_up_down(true),
            ArrowKey::Down => state.arrow_up_down(false),
            ArrowKey::Left => state.arrow_left_right(&self.builder, true).await?,
            ArrowKey::Right => state.arrow_left_right(&self.builder, false).await?,
        }
        self.persist_position(&state);
        Ok(state.snapshot())
    }

    pub async fn search(&self, keyword: &str) -> Result<PopupSnapshot, NavigationError> {
        let mut state = self.state.lock().await;
        state.set_search(&self.builder, keyword).await?;
        Ok(state.snapshot())
    }

    /// Plans opening a bookmark that was clicked.
    pub async fn open_bookmark(&self, id: &str, click: ClickType) -> Result<OpenPlan, NavigationError> {
        let record = self.store.get(id).await?;
        let state = self.state.lock().await;
        open_plan(&record, click, state.options())
    }

    // --- context menu ---

    /// Opens the context menu on `item` and returns its layout.
    pub async fn open_menu(&self, item: TreeItem) -> Result<Vec<MenuArea>, NavigationError> {
        let mut state = self.state.lock().await;
        state.open_menu(item.clone());
        let target = state
            .menu_target()
            .cloned()
            .ok_or_else(|| NavigationError::NotFound(item.display_id()))?;
        Ok(menu_layout(&target, state.is_searching()))
    }

    pub async fn close_menu(&self) {
        self.state.lock().await.close_menu();
    }

    pub async fn close_editor(&self) {
        self.state.lock().await.close_editor();
    }

    /// Runs `action` on the current menu target and closes the menu.
    ///
    /// The state lock is released before the store is touched, so the
    /// change reactor can pick the resulting notifications up.
    pub async fn run_menu_action(&self, action: MenuAction, input: MenuInput) -> Result<MenuOutcome, NavigationError> {
        let (target, clipboard, warn_open_many) = {
            let mut state = self.state.lock().await;
            let target = state
                .menu_target()
                .cloned()
                .ok_or_else(|| NavigationError::InvalidTransition("no menu is open".to_string()))?;
            if action == MenuAction::Edit {
                state.open_editor(target);
                return Ok(MenuOutcome::EditorOpened);
            }
            state.close_menu();
            (target, state.clipboard().cloned(), state.options().warn_open_many)
        };

        let record = target.record().cloned();
        let require_record = || {
            record.clone().ok_or_else(|| {
                NavigationError::InvalidTransition(format!("{:?} is not allowed on a placeholder", action))
            })
        };

        let outcome = match action {
            MenuAction::OpenAll | MenuAction::OpenAllInNewWindow | MenuAction::OpenAllInIncognito => {
                let options = OpenAllOptions {
                    new_window: action != MenuAction::OpenAll,
                    incognito: action == MenuAction::OpenAllInIncognito,
                    warn_when_open_many: warn_open_many,
                };
                let plan = self.actions.open_all_plan(&require_record()?, options).await?;
                MenuOutcome::Open { plan }
            }
            MenuAction::Edit => MenuOutcome::EditorOpened,
            MenuAction::Delete => {
                self.actions.remove(&require_record()?).await?;
                MenuOutcome::Done
            }
            MenuAction::Cut | MenuAction::Copy => {
                let mode = if action == MenuAction::Cut {
                    ClipboardMode::Cut
                } else {
                    ClipboardMode::Copy
                };
                let entry = ClipboardEntry {
                    mode,
                    id: require_record()?.id,
                };
                self.state.lock().await.set_clipboard(Some(entry));
                MenuOutcome::Done
            }
            MenuAction::Paste => {
                let entry = clipboard
                    .ok_or_else(|| NavigationError::InvalidTransition("nothing to paste".to_string()))?;
                let record = self.actions.paste(&entry, &target).await?;
                if entry.mode == ClipboardMode::Cut {
                    self.state.lock().await.set_clipboard(None);
                }
                MenuOutcome::Created { record }
            }
            MenuAction::AddPage => {
                let url = input
                    .url
                    .ok_or_else(|| NavigationError::InvalidTransition("addPage needs a url".to_string()))?;
                let title = input.title.unwrap_or_else(|| url.clone());
                let record = self.actions.add_page(&target, &title, &url).await?;
                MenuOutcome::Created { record }
            }
            MenuAction::AddFolder => {
                let title = input
                    .title
                    .ok_or_else(|| NavigationError::InvalidTransition("addFolder needs a title".to_string()))?;
                let record = self.actions.add_folder(&target, &title).await?;
                MenuOutcome::Created { record }
            }
            MenuAction::AddSeparator => {
                let record = self.actions.add_separator(&target).await?;
                MenuOutcome::Created { record }
            }
            MenuAction::SortByName => {
                let parent_id = target
                    .parent_id()
                    .ok_or_else(|| NavigationError::InvalidTransition("target has no parent".to_string()))?
                    .to_string();
                let moves = self.actions.sort_by_name(&parent_id).await?;
                MenuOutcome::Sorted { moves }
            }
        };
        Ok(outcome)
    }

    /// Saves the editor's changes to its target and closes it.
    pub async fn submit_editor(&self, title: &str, url: Option<&str>) -> Result<BookmarkRecord, NavigationError> {
        let target = {
            let mut state = self.state.lock().await;
            let target = state
                .editor_target()
                .and_then(TreeItem::record)
                .cloned()
                .ok_or_else(|| NavigationError::InvalidTransition("no editor is open".to_string()))?;
            state.close_editor();
            target
        };
        self.actions.edit(&target, title, url).await
    }

    // --- options ---

    /// Option schema with choices for the current top-level folders.
    pub async fn option_schema(&self) -> Result<Vec<OptionSpec>, NavigationError> {
        let root_folders = self.store.get_children(ROOT_ID).await?;
        Ok(preferences::option_schema(&root_folders))
    }

    /// Applies new options to the popup: root shortcuts are refiltered and,
    /// when the default folder changed, navigation restarts there.
    pub async fn apply_options(&self, options: Options) -> Result<PopupSnapshot, NavigationError> {
        let root_folders = self.store.get_children(ROOT_ID).await?;
        let mut state = self.state.lock().await;
        let default_changed = state.options().def_expand != options.def_expand;
        state.set_options(options);
        state.set_root_shortcuts(root_folders);

        if default_changed {
            let root = self.builder.build_level(&state.options().default_root_id()).await?;
            tracing::info!("Default folder changed to {}, restarting navigation", root.folder_id());
            *state = {
                let mut fresh = PopupState::new(NavigationStack::new(root), state.options().clone());
                fresh.set_root_shortcuts(state.root_shortcuts().to_vec());
                fresh
            };
        }
        if !state.options().remember_pos {
            if let Err(e) = self.history.clear() {
                tracing::warn!("Could not clear the last used position: {}", e);
            }
        }
        Ok(state.snapshot())
    }
}
