//! Restores the navigation stack from the persisted chain of last used folders.

use crate::managers::bookmark_store::BookmarkStore;
use crate::managers::navigation_stack::NavigationStack;
use crate::services::tree_builder::TreeLevelBuilder;
use crate::types::bookmark::ROOT_ID;
use crate::types::errors::NavigationError;
use crate::types::tree::TreeLevel;

/// Rebuilds the stack that was open when the popup was last used.
///
/// The chain is read from its end, skipping folders that no longer exist,
/// until the first one that still resolves. The ancestors of that folder
/// are then rebuilt upward to `default_root_id`. Bookmarks may have been
/// rearranged since the chain was saved, so only the deepest surviving
/// folder is trusted and its current ancestry is used.
///
/// # Errors
/// Only when level 0 itself cannot be built or the store is unavailable.
pub async fn restore<S: BookmarkStore + ?Sized>(
    builder: &TreeLevelBuilder<S>,
    persisted_chain: &[String],
    default_root_id: &str,
) -> Result<NavigationStack, NavigationError> {
    let first = builder.build_level(default_root_id).await?;

    let mut last_existing: Option<TreeLevel> = None;
    for id in persisted_chain.iter().rev() {
        if id == default_root_id {
            break;
        }
        match builder.build_level(id).await {
            Ok(level) => {
                last_existing = Some(level);
                break;
            }
            Err(NavigationError::NotFound(_) | NavigationError::InvalidTransition(_)) => {
                tracing::warn!("Last used folder {} no longer exists, skipping", id);
            }
            Err(e) => return Err(e),
        }
    }

    let Some(last_existing) = last_existing else {
        return Ok(NavigationStack::new(first));
    };

    let mut ancestors: Vec<TreeLevel> = Vec::new();
    let mut parent_id = last_existing.folder.parent_id.clone();
    loop {
        match parent_id.as_deref() {
            Some(id) if id == default_root_id => break,
            Some(id) if id != ROOT_ID => match builder.build_level(id).await {
                Ok(level) => {
                    parent_id = level.folder.parent_id.clone();
                    ancestors.insert(0, level);
                }
                Err(NavigationError::NotFound(_) | NavigationError::InvalidTransition(_)) => {
                    tracing::warn!("Ancestor {} vanished while restoring, starting at the default folder", id);
                    return Ok(NavigationStack::new(first));
                }
                Err(e) => return Err(e),
            },
            _ => {
                tracing::info!(
                    "Folder {} is not below {}, starting at the default folder",
                    last_existing.folder_id(),
                    default_root_id
                );
                return Ok(NavigationStack::new(first));
            }
        }
    }

    let mut levels = Vec::with_capacity(ancestors.len() + 2);
    levels.push(first);
    levels.extend(ancestors);
    levels.push(last_existing);

    match NavigationStack::from_levels(levels) {
        Ok(stack) => {
            tracing::debug!("Restored {} levels", stack.len());
            Ok(stack)
        }
        Err(e) => {
            tracing::warn!("Restored levels are inconsistent ({}), starting at the default folder", e);
            builder.build_level(default_root_id).await.map(NavigationStack::new)
        }
    }
}
