// popup-bookmarks services
// Services operate on managed state: tree building, search, sorting, position restore, change reaction, actions, menus and preferences.

pub mod bookmark_actions;
pub mod change_reactor;
pub mod context_menu;
pub mod position_restorer;
pub mod preferences;
pub mod search;
pub mod sorter;
pub mod tree_builder;
