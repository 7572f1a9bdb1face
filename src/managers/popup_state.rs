//! Popup UI state.
//!
//! One container owns everything the popup renders from: the navigation
//! stack, the keyboard selection, the item a context menu or editor is
//! open on, the search keyword, and the top-level folder shortcuts.
//! Handlers receive it by reference and change it only through the
//! methods below; every stack change re-derives the selection.

use serde::Serialize;

use crate::managers::bookmark_store::BookmarkStore;
use crate::managers::navigation_stack::NavigationStack;
use crate::services::tree_builder::TreeLevelBuilder;
use crate::types::bookmark::{BookmarkKind, BookmarkRecord};
use crate::types::errors::NavigationError;
use crate::types::preferences::Options;
use crate::types::tree::{ClipboardEntry, SearchOptions, SearchQuery, TreeItem};

/// Top-level folders offered as shortcuts, minus the default folder and
/// the ones the user chose to hide.
pub fn filter_root_shortcuts(root_children: Vec<BookmarkRecord>, options: &Options) -> Vec<BookmarkRecord> {
    root_children
        .into_iter()
        .filter(|folder| match folder.id.parse::<u64>() {
            Ok(id) => id != options.def_expand && !options.hide_root_folder.contains(&id),
            Err(_) => true,
        })
        .collect()
}

/// Owned copy of the state, for handing to a UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupSnapshot {
    pub levels: Vec<crate::types::tree::TreeLevel>,
    pub keyboard_target: Option<TreeItem>,
    pub menu_target: Option<TreeItem>,
    pub editor_target: Option<TreeItem>,
    pub search_keyword: String,
    pub root_shortcuts: Vec<BookmarkRecord>,
    pub clipboard: Option<ClipboardEntry>,
}

pub struct PopupState {
    stack: NavigationStack,
    /// Stack to return to when the search is cleared.
    browse_stack: Option<NavigationStack>,
    keyboard_target: Option<TreeItem>,
    menu_target: Option<TreeItem>,
    editor_target: Option<TreeItem>,
    search_keyword: String,
    options: Options,
    root_shortcuts: Vec<BookmarkRecord>,
    clipboard: Option<ClipboardEntry>,
}

impl PopupState {
    pub fn new(stack: NavigationStack, options: Options) -> Self {
        Self {
            stack,
            browse_stack: None,
            keyboard_target: None,
            menu_target: None,
            editor_target: None,
            search_keyword: String::new(),
            options,
            root_shortcuts: Vec::new(),
            clipboard: None,
        }
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn keyboard_target(&self) -> Option<&TreeItem> {
        self.keyboard_target.as_ref()
    }

    pub fn menu_target(&self) -> Option<&TreeItem> {
        self.menu_target.as_ref()
    }

    pub fn editor_target(&self) -> Option<&TreeItem> {
        self.editor_target.as_ref()
    }

    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    pub fn is_searching(&self) -> bool {
        self.stack.is_search()
    }

    pub fn root_shortcuts(&self) -> &[BookmarkRecord] {
        &self.root_shortcuts
    }

    pub fn set_root_shortcuts(&mut self, root_children: Vec<BookmarkRecord>) {
        self.root_shortcuts = filter_root_shortcuts(root_children, &self.options);
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    pub fn set_clipboard(&mut self, entry: Option<ClipboardEntry>) {
        self.clipboard = entry;
    }

    /// Folder ids to persist as the last used chain. While searching this
    /// is the chain that was open before the search started.
    pub fn history_chain(&self) -> Vec<String> {
        match &self.browse_stack {
            Some(stack) if self.is_searching() => stack.folder_ids(),
            _ if self.is_searching() => Vec::new(),
            _ => self.stack.folder_ids(),
        }
    }

    pub fn snapshot(&self) -> PopupSnapshot {
        PopupSnapshot {
            levels: self.stack.levels().to_vec(),
            keyboard_target: self.keyboard_target.clone(),
            menu_target: self.menu_target.clone(),
            editor_target: self.editor_target.clone(),
            search_keyword: self.search_keyword.clone(),
            root_shortcuts: self.root_shortcuts.clone(),
            clipboard: self.clipboard.clone(),
        }
    }

    /// Root shortcuts listed ahead of level 0 while browsing, minus the
    /// folder level 0 already shows.
    fn shortcut_items(&self) -> Vec<TreeItem> {
        if self.is_searching() {
            return Vec::new();
        }
        let root_id = self.stack.root().folder_id();
        self.root_shortcuts
            .iter()
            .filter(|folder| folder.id != root_id)
            .cloned()
            .map(TreeItem::Record)
            .collect()
    }

    /// Items shown in level `level_index`, in keyboard order. Level 0 starts
    /// with the root shortcuts.
    pub fn bookmark_list(&self, level_index: usize) -> Vec<TreeItem> {
        let mut list = if level_index == 0 {
            self.shortcut_items()
        } else {
            Vec::new()
        };
        if let Some(level) = self.stack.level(level_index) {
            list.extend(level.children.iter().cloned());
        }
        list
    }

    /// Item shown anywhere in the popup matching `item`, in its current form.
    pub fn find_item(&self, item: &TreeItem) -> Option<TreeItem> {
        self.stack
            .levels()
            .iter()
            .flat_map(|level| level.children.iter())
            .find(|child| child.same_entry(item))
            .cloned()
            .or_else(|| self.shortcut_items().into_iter().find(|shortcut| shortcut.same_entry(item)))
    }

    // --- selection, menu and editor targets ---

    pub fn set_keyboard_target(&mut self, item: Option<TreeItem>) {
        self.keyboard_target = item.and_then(|item| self.find_item(&item));
    }

    pub fn open_menu(&mut self, item: TreeItem) {
        self.menu_target = self.find_item(&item);
    }

    pub fn close_menu(&mut self) {
        self.menu_target = None;
    }

    pub fn open_editor(&mut self, item: TreeItem) {
        self.menu_target = None;
        self.editor_target = self.find_item(&item);
    }

    pub fn close_editor(&mut self) {
        self.editor_target = None;
    }

    /// Keyboard navigation is suspended while a menu or editor is open.
    fn navigation_blocked(&self) -> bool {
        self.menu_target.is_some() || self.editor_target.is_some()
    }

    /// Re-resolves every target against the current stack, dropping the
    /// ones that are no longer shown.
    pub fn refresh_selection(&mut self) {
        self.keyboard_target = self.keyboard_target.take().and_then(|item| self.find_item(&item));
        self.menu_target = self.menu_target.take().and_then(|item| self.find_item(&item));
        self.editor_target = self.editor_target.take().and_then(|item| self.find_item(&item));
    }

    /// Level holding the keyboard target; the deepest level when nothing
    /// is selected. Root shortcuts belong to level 0.
    pub fn keyboard_target_level_index(&self) -> usize {
        let last = self.stack.len() - 1;
        let Some(target) = &self.keyboard_target else {
            return last;
        };
        if target.kind() == BookmarkKind::RootFolder {
            return 0;
        }
        target
            .parent_id()
            .and_then(|parent| self.stack.position_of(parent))
            .unwrap_or(last)
    }

    // --- keyboard handlers ---

    /// Moves the selection within its level, wrapping at both ends.
    pub fn arrow_up_down(&mut self, is_up: bool) {
        if self.navigation_blocked() {
            return;
        }
        let list = self.bookmark_list(self.keyboard_target_level_index());
        if list.is_empty() {
            return;
        }
        let last = list.len() - 1;

        let current = self
            .keyboard_target
            .as_ref()
            .and_then(|target| list.iter().position(|item| item.same_entry(target)));
        let next = match (current, is_up) {
            (Some(0), true) | (None, true) => last,
            (Some(i), true) => i - 1,
            (Some(i), false) if i < last => i + 1,
            (Some(_), false) | (None, false) => 0,
        };
        self.keyboard_target = Some(list[next].clone());
    }

    /// Left closes the selected item's level and selects its folder in the
    /// previous level. Right opens the selected folder and selects its
    /// first child; on a root shortcut it restarts navigation there.
    pub async fn arrow_left_right<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        is_left: bool,
    ) -> Result<(), NavigationError> {
        if self.navigation_blocked() {
            return Ok(());
        }
        let Some(target) = self.keyboard_target.clone() else {
            return Ok(());
        };
        let level_index = self.keyboard_target_level_index();

        if is_left {
            if level_index == 0 {
                return Ok(());
            }
            let folder_id = self.stack.levels()[level_index].folder_id().to_string();
            self.stack.truncate_from(level_index);
            self.keyboard_target = self
                .bookmark_list(level_index - 1)
                .into_iter()
                .find(|item| item.record().is_some_and(|record| record.id == folder_id));
        } else if let Some(record) = target.record().filter(|record| record.is_openable()) {
            let is_shortcut = level_index == 0 && self.stack.root().child(&record.id).is_none();
            if is_shortcut {
                self.open_root_shortcut(builder, &record.id).await?;
                self.keyboard_target = self.stack.root().children.first().cloned();
            } else {
                let level = self.stack.push(builder, level_index, &record.id).await?;
                self.keyboard_target = level.children.first().cloned();
            }
        }
        Ok(())
    }

    // --- navigation ---

    /// Opens a folder clicked in level `level_index`.
    pub async fn open_folder<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        level_index: usize,
        folder_id: &str,
    ) -> Result<(), NavigationError> {
        self.stack.push(builder, level_index, folder_id).await?;
        self.refresh_selection();
        Ok(())
    }

    /// Closes every level after `level_index`.
    pub fn close_levels_after(&mut self, level_index: usize) {
        self.stack.truncate_from(level_index.saturating_add(1));
        self.refresh_selection();
    }

    /// Restarts navigation at one of the root shortcuts.
    pub async fn open_root_shortcut<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        folder_id: &str,
    ) -> Result<(), NavigationError> {
        if !self.root_shortcuts.iter().any(|folder| folder.id == folder_id) {
            return Err(NavigationError::InvalidTransition(format!(
                "{} is not a root shortcut",
                folder_id
            )));
        }
        let level = builder.build_level(folder_id).await?;
        self.stack = NavigationStack::new(level);
        self.browse_stack = None;
        self.search_keyword.clear();
        self.refresh_selection();
        Ok(())
    }

    /// Switches to search results for `keyword`, or back to browsing when
    /// the keyword is blank.
    pub async fn set_search<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        keyword: &str,
    ) -> Result<(), NavigationError> {
        if keyword.trim().is_empty() {
            if self.is_searching() {
                self.stack = self.restore_browse_stack(builder).await?;
            }
            self.search_keyword.clear();
        } else {
            let query = SearchQuery {
                keyword: keyword.to_string(),
                options: SearchOptions {
                    title_only: self.options.search_title_only(),
                    max_results: self.options.max_results,
                },
            };
            let level = builder.build_search_level(&query).await?;
            let previous = std::mem::replace(&mut self.stack, NavigationStack::new(level));
            if !previous.is_search() {
                self.browse_stack = Some(previous);
            }
            self.search_keyword = keyword.to_string();
        }

        self.keyboard_target = None;
        self.menu_target = None;
        self.editor_target = None;
        Ok(())
    }

    async fn restore_browse_stack<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
    ) -> Result<NavigationStack, NavigationError> {
        if let Some(mut stack) = self.browse_stack.take() {
            match stack.rebuild_all(builder).await {
                Ok(()) => return Ok(stack),
                Err(e) => tracing::warn!("Could not rebuild the pre-search stack: {}", e),
            }
        }
        builder
            .build_level(&self.options.default_root_id())
            .await
            .map(NavigationStack::new)
    }

    /// Brings the stack in line with the store after a burst of changes.
    ///
    /// Levels showing any of `closed_folder_ids` are closed first, then
    /// everything left is rebuilt. Menu and editor are dismissed.
    pub async fn rebuild_after_change<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        closed_folder_ids: &[String],
    ) -> Result<(), NavigationError> {
        if let Some(index) = closed_folder_ids
            .iter()
            .filter_map(|id| self.stack.position_of(id))
            .min()
        {
            self.stack.truncate_from(index);
        }

        let result = self.stack.rebuild_all(builder).await;
        self.menu_target = None;
        self.editor_target = None;
        self.refresh_selection();
        result
    }
}
