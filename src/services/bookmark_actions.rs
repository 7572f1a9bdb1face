//! Bookmark actions.
//!
//! Operations behind the context menu and bookmark clicks: creating,
//! editing, removing, sorting, clipboard paste, and planning how bookmarks
//! open. Opening itself belongs to the host; this module only describes
//! what the host should do.

use std::sync::Arc;

use serde::Serialize;

use crate::managers::bookmark_store::BookmarkStore;
use crate::services::sorter;
use crate::types::bookmark::{BookmarkKind, BookmarkNode, BookmarkRecord, CreateDetails, MoveDestination, UpdateChanges, SEPARATOR_URL};
use crate::types::errors::NavigationError;
use crate::types::preferences::{ClickType, OpenMethod, Options};
use crate::types::tree::{ClipboardEntry, ClipboardMode, TreeItem};

/// Above this many bookmarks, opening a whole folder asks first.
pub const OPEN_MANY_THRESHOLD: usize = 5;

const SCRIPT_SCHEME: &str = "javascript:";

/// Title given to new separators.
pub fn separator_title() -> String {
    "- ".repeat(42)
}

/// One thing the host does to open bookmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum OpenAction {
    /// Run a `javascript:` bookmark in the current tab.
    ExecuteScript { code: String },
    UpdateCurrentTab { url: String },
    CreateTab { url: String, active: bool },
    CreateWindow { urls: Vec<String>, incognito: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPlan {
    pub actions: Vec<OpenAction>,
    pub close_popup: bool,
    /// Set when the user should confirm before `actions` run.
    pub needs_confirmation: bool,
}

/// How to open every bookmark of a folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenAllOptions {
    pub new_window: bool,
    pub incognito: bool,
    pub warn_when_open_many: bool,
}

/// Plans how a clicked bookmark opens.
///
/// An unknown open-method code opens nothing but still closes the popup.
pub fn open_plan(item: &BookmarkRecord, click: ClickType, options: &Options) -> Result<OpenPlan, NavigationError> {
    let url = match (item.kind(), item.url.as_deref()) {
        (BookmarkKind::Bookmark, Some(url)) => url.to_string(),
        (kind, _) => {
            return Err(NavigationError::InvalidTransition(format!(
                "{} is a {:?} and cannot be opened in a tab",
                item.id, kind
            )))
        }
    };
    let method = options.open_method(click);

    let action = if url.starts_with(SCRIPT_SCHEME) {
        Some(OpenAction::ExecuteScript { code: url })
    } else {
        method.map(|method| match method {
            OpenMethod::CurrentTab | OpenMethod::CurrentTabKeepPopup => OpenAction::UpdateCurrentTab { url },
            OpenMethod::NewTab | OpenMethod::BackgroundTab | OpenMethod::BackgroundTabKeepPopup => OpenAction::CreateTab {
                url,
                active: method == OpenMethod::NewTab,
            },
            OpenMethod::NewWindow | OpenMethod::IncognitoWindow => OpenAction::CreateWindow {
                urls: vec![url],
                incognito: method == OpenMethod::IncognitoWindow,
            },
        })
    };

    Ok(OpenPlan {
        actions: action.into_iter().collect(),
        close_popup: method.map_or(true, OpenMethod::closes_popup),
        needs_confirmation: false,
    })
}

/// Performs bookmark edits against the store.
pub struct BookmarkActions<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for BookmarkActions<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BookmarkStore + ?Sized> BookmarkActions<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Parent and index for an item inserted next to `target`: right after
    /// a record, or first inside the folder of a placeholder.
    fn insert_position(target: &TreeItem) -> Result<(String, usize), NavigationError> {
        match target {
            TreeItem::Placeholder { parent_id } => Ok((parent_id.clone(), 0)),
            TreeItem::Record(record) => {
                if record.kind() == BookmarkKind::RootFolder {
                    return Err(NavigationError::InvalidTransition(format!(
                        "can't add next to top-level folder {}",
                        record.id
                    )));
                }
                let parent_id = record.parent_id.clone().ok_or_else(|| {
                    NavigationError::InvalidTransition(format!("{} has no parent", record.id))
                })?;
                Ok((parent_id, record.index + 1))
            }
        }
    }

    async fn create_next_to(
        &self,
        target: &TreeItem,
        title: String,
        url: Option<String>,
    ) -> Result<BookmarkRecord, NavigationError> {
        let (parent_id, index) = Self::insert_position(target)?;
        let created = self
            .store
            .create(CreateDetails {
                parent_id,
                index: Some(index),
                title,
                url,
            })
            .await?;
        Ok(created)
    }

    /// Adds a page after `target`.
    pub async fn add_page(&self, target: &TreeItem, title: &str, url: &str) -> Result<BookmarkRecord, NavigationError> {
        self.create_next_to(target, title.to_string(), Some(url.to_string()))
            .await
    }

    pub async fn add_folder(&self, target: &TreeItem, title: &str) -> Result<BookmarkRecord, NavigationError> {
        self.create_next_to(target, title.to_string(), None).await
    }

    pub async fn add_separator(&self, target: &TreeItem) -> Result<BookmarkRecord, NavigationError> {
        self.create_next_to(target, separator_title(), Some(SEPARATOR_URL.to_string()))
            .await
    }

    /// Edits a bookmark, or renames a folder when `url` is `None`.
    pub async fn edit(&self, target: &BookmarkRecord, title: &str, url: Option<&str>) -> Result<BookmarkRecord, NavigationError> {
        let url = if target.is_openable() {
            None
        } else {
            url.map(str::to_string)
        };
        let updated = self
            .store
            .update(
                &target.id,
                UpdateChanges {
                    title: Some(title.to_string()),
                    url,
                },
            )
            .await?;
        Ok(updated)
    }

    /// Removes `target`, including everything inside when it is a folder.
    pub async fn remove(&self, target: &BookmarkRecord) -> Result<(), NavigationError> {
        if target.is_openable() {
            self.store.remove_tree(&target.id).await?;
        } else {
            self.store.remove(&target.id).await?;
        }
        Ok(())
    }

    /// Sorts the children of `parent_id`. Returns the number of moves made.
    ///
    /// # Errors
    /// `StoreUnavailable` when a move fails. Moves made before the failure
    /// stay in place.
    pub async fn sort_by_name(&self, parent_id: &str) -> Result<usize, NavigationError> {
        let children = self.store.get_children(parent_id).await?;
        let sorted = sorter::sort_siblings(&children);
        let moves = sorter::reindex_moves(&children, &sorted);

        for (applied, instruction) in moves.iter().enumerate() {
            let destination = MoveDestination {
                parent_id: Some(parent_id.to_string()),
                index: Some(instruction.index),
            };
            if let Err(e) = self.store.move_item(&instruction.id, destination).await {
                tracing::warn!(
                    "Sorting {} stopped after {} of {} moves: {}",
                    parent_id,
                    applied,
                    moves.len(),
                    e
                );
                return Err(NavigationError::StoreUnavailable(e.to_string()));
            }
        }

        tracing::debug!("Sorted {} with {} moves", parent_id, moves.len());
        Ok(moves.len())
    }

    /// Pastes the clipboard entry next to `target`. A cut entry is moved,
    /// a copied one is duplicated with everything inside it.
    pub async fn paste(&self, entry: &ClipboardEntry, target: &TreeItem) -> Result<BookmarkRecord, NavigationError> {
        let (parent_id, index) = Self::insert_position(target)?;
        match entry.mode {
            ClipboardMode::Cut => {
                let moved = self
                    .store
                    .move_item(
                        &entry.id,
                        MoveDestination {
                            parent_id: Some(parent_id),
                            index: Some(index),
                        },
                    )
                    .await?;
                Ok(moved)
            }
            ClipboardMode::Copy => {
                let subtree = self.store.get_subtree(&entry.id).await?;
                self.copy_subtree(subtree, parent_id, index).await
            }
        }
    }

    async fn copy_subtree(
        &self,
        subtree: BookmarkNode,
        parent_id: String,
        index: usize,
    ) -> Result<BookmarkRecord, NavigationError> {
        let BookmarkNode { record, children } = subtree;
        let copied = self
            .store
            .create(CreateDetails {
                parent_id,
                index: Some(index),
                title: record.title,
                url: record.url,
            })
            .await?;

        let mut queue: Vec<(String, Vec<BookmarkNode>)> = vec![(copied.id.clone(), children)];
        while let Some((folder_id, nodes)) = queue.pop() {
            for node in nodes {
                let BookmarkNode { record, children } = node;
                let created = self
                    .store
                    .create(CreateDetails {
                        parent_id: folder_id.clone(),
                        index: None,
                        title: record.title,
                        url: record.url,
                    })
                    .await?;
                if !children.is_empty() {
                    queue.push((created.id, children));
                }
            }
        }
        Ok(copied)
    }

    /// Plans opening every bookmark directly inside a folder, or a single
    /// bookmark.
    pub async fn open_all_plan(&self, item: &BookmarkRecord, options: OpenAllOptions) -> Result<OpenPlan, NavigationError> {
        let mut needs_confirmation = false;
        let urls: Vec<String> = if item.is_openable() {
            let urls: Vec<String> = self
                .store
                .get_children(&item.id)
                .await?
                .into_iter()
                .filter(|child| child.kind() == BookmarkKind::Bookmark)
                .filter_map(|child| child.url)
                .collect();
            needs_confirmation = options.warn_when_open_many && urls.len() > OPEN_MANY_THRESHOLD;
            urls
        } else {
            self.store.get(&item.id).await?.url.into_iter().collect()
        };

        let actions = if options.new_window {
            vec![OpenAction::CreateWindow {
                urls,
                incognito: options.incognito,
            }]
        } else {
            urls.into_iter()
                .map(|url| OpenAction::CreateTab { url, active: false })
                .collect()
        };

        Ok(OpenPlan {
            actions,
            close_popup: true,
            needs_confirmation,
        })
    }
}
