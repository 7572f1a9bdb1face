// popup-bookmarks state managers
// Managers own state: the bookmark store, the navigation stack, the popup UI state and the last used position.

pub mod bookmark_store;
pub mod navigation_history;
pub mod navigation_stack;
pub mod popup_state;
