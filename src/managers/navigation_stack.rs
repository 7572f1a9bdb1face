//! Navigation stack of open tree levels.
//!
//! Level 0 is the starting folder; every following level is a child folder
//! of the level before it. The stack only changes through `push`,
//! `truncate_from` and `rebuild_all`.

use serde::Serialize;

use crate::managers::bookmark_store::BookmarkStore;
use crate::services::tree_builder::TreeLevelBuilder;
use crate::types::errors::NavigationError;
use crate::types::tree::TreeLevel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationStack {
    levels: Vec<TreeLevel>,
}

impl NavigationStack {
    pub fn new(root: TreeLevel) -> Self {
        Self { levels: vec![root] }
    }

    /// Builds a stack from pre-fetched levels, checking the parent chain.
    pub fn from_levels(levels: Vec<TreeLevel>) -> Result<Self, NavigationError> {
        if levels.is_empty() {
            return Err(NavigationError::InvalidTransition(
                "a navigation stack needs a root level".to_string(),
            ));
        }
        let stack = Self { levels };
        match stack.first_broken_link() {
            Some(index) => Err(NavigationError::InvalidTransition(format!(
                "level {} ({}) is not a child of level {}",
                index,
                stack.levels[index].folder_id(),
                index - 1
            ))),
            None => Ok(stack),
        }
    }

    pub fn levels(&self) -> &[TreeLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false: the root level is never removed.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level(&self, index: usize) -> Option<&TreeLevel> {
        self.levels.get(index)
    }

    pub fn root(&self) -> &TreeLevel {
        &self.levels[0]
    }

    pub fn last(&self) -> &TreeLevel {
        &self.levels[self.levels.len() - 1]
    }

    pub fn is_search(&self) -> bool {
        self.root().is_search()
    }

    /// Position of the level showing `folder_id`.
    pub fn position_of(&self, folder_id: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.folder_id() == folder_id)
    }

    pub fn folder_ids(&self) -> Vec<String> {
        self.levels.iter().map(|level| level.folder_id().to_string()).collect()
    }

    /// Index of the first level whose folder is not a child of the previous one.
    fn first_broken_link(&self) -> Option<usize> {
        (1..self.levels.len()).find(|&i| {
            self.levels[i].folder.parent_id.as_deref() != Some(self.levels[i - 1].folder_id())
        })
    }

    /// Opens `child_folder_id`, a folder listed in level `parent_level_index`.
    ///
    /// Levels after the parent are closed first. Opening the folder that is
    /// already open right after the parent changes nothing.
    pub async fn push<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
        parent_level_index: usize,
        child_folder_id: &str,
    ) -> Result<&TreeLevel, NavigationError> {
        {
            let parent = self.levels.get(parent_level_index).ok_or_else(|| {
                NavigationError::InvalidTransition(format!("no level at index {}", parent_level_index))
            })?;
            if parent.is_search() || !parent.folder.is_openable() {
                return Err(NavigationError::InvalidTransition(format!(
                    "level {} cannot have sub-levels",
                    parent_level_index
                )));
            }
            let child = parent.child(child_folder_id).ok_or_else(|| {
                NavigationError::InvalidTransition(format!(
                    "{} is not a child of {}",
                    child_folder_id,
                    parent.folder_id()
                ))
            })?;
            if !child.is_openable() {
                return Err(NavigationError::InvalidTransition(format!(
                    "{} is a {:?}, not a folder",
                    child_folder_id,
                    child.kind()
                )));
            }
        }

        let next_index = parent_level_index + 1;
        let already_open = self
            .levels
            .get(next_index)
            .is_some_and(|level| level.folder_id() == child_folder_id);

        if !already_open {
            let level = builder.build_level(child_folder_id).await?;
            self.levels.truncate(next_index);
            self.levels.push(level);
        }
        Ok(&self.levels[next_index])
    }

    /// Drops every level at or after `index`. Level 0 always stays.
    pub fn truncate_from(&mut self, index: usize) {
        self.levels.truncate(index.max(1));
    }

    /// Refetches every open level in order.
    ///
    /// A level that no longer resolves, or whose folder moved away from its
    /// parent level, closes the stack at that point. When level 0 cannot be
    /// rebuilt, or the store is unavailable, the stack keeps its previous
    /// levels and the error is returned.
    pub async fn rebuild_all<S: BookmarkStore + ?Sized>(
        &mut self,
        builder: &TreeLevelBuilder<S>,
    ) -> Result<(), NavigationError> {
        let mut rebuilt = Vec::with_capacity(self.levels.len());

        for (index, level) in self.levels.iter().enumerate() {
            match builder.rebuild(level).await {
                Ok(fresh) => rebuilt.push(fresh),
                Err(NavigationError::NotFound(_) | NavigationError::InvalidTransition(_)) if index > 0 => {
                    tracing::info!(
                        "Folder {} at level {} is gone, closing levels from there",
                        level.folder_id(),
                        index
                    );
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        let mut stack = Self { levels: rebuilt };
        if let Some(index) = stack.first_broken_link() {
            tracing::info!(
                "Folder {} moved away from level {}, closing levels from there",
                stack.levels[index].folder_id(),
                index - 1
            );
            stack.truncate_from(index);
        }
        self.levels = stack.levels;
        Ok(())
    }
}
