//! Builds tree levels from the bookmark store.

use std::sync::Arc;

use crate::managers::bookmark_store::BookmarkStore;
use crate::services::search;
use crate::types::errors::NavigationError;
use crate::types::tree::{SearchQuery, TreeLevel};

/// Fetches one folder and its direct children as a `TreeLevel`.
pub struct TreeLevelBuilder<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for TreeLevelBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BookmarkStore + ?Sized> TreeLevelBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Builds the level for `folder_id`.
    ///
    /// # Errors
    /// `NotFound` when the folder no longer exists, `InvalidTransition` when
    /// the id names something that cannot be opened.
    pub async fn build_level(&self, folder_id: &str) -> Result<TreeLevel, NavigationError> {
        let folder = self.store.get(folder_id).await?;
        if !folder.is_openable() {
            return Err(NavigationError::InvalidTransition(format!(
                "{} is a {:?}, not a folder",
                folder_id,
                folder.kind()
            )));
        }
        let children = self.store.get_children(folder_id).await?;
        Ok(TreeLevel::new(folder, children))
    }

    pub async fn build_search_level(&self, query: &SearchQuery) -> Result<TreeLevel, NavigationError> {
        search::search(self.store.as_ref(), &query.keyword, &query.options).await
    }

    /// Rebuilds a level from whatever produced it: its folder or its search.
    pub async fn rebuild(&self, level: &TreeLevel) -> Result<TreeLevel, NavigationError> {
        match &level.search {
            Some(query) => self.build_search_level(query).await,
            None => self.build_level(level.folder_id()).await,
        }
    }
}
