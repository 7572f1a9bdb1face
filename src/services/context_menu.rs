//! Context menu layout.
//!
//! The menu has five areas. Entries are message keys; the UI looks up the
//! localized text.

use serde::{Deserialize, Serialize};

use crate::types::bookmark::BookmarkKind;
use crate::types::tree::TreeItem;

pub const MENU_AREA_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuArea {
    pub keys: Vec<&'static str>,
    pub hidden: bool,
}

/// Areas hidden for a target of `kind`.
pub fn hidden_areas(kind: BookmarkKind, is_searching: bool) -> [bool; MENU_AREA_COUNT] {
    match kind {
        BookmarkKind::RootFolder => [false, true, true, true, true],
        BookmarkKind::Bookmark if is_searching => [false, false, false, true, true],
        BookmarkKind::Placeholder => [true, true, false, false, true],
        _ => [false; MENU_AREA_COUNT],
    }
}

/// Menu shown for `target`.
pub fn menu_layout(target: &TreeItem, is_searching: bool) -> Vec<MenuArea> {
    let kind = target.kind();
    let (open_keys, edit_keys) = if kind.is_openable() {
        (vec!["openAll", "openAllInN", "openAllInI"], vec!["rename", "del"])
    } else {
        (vec!["openInB", "openInN", "openInI"], vec!["edit", "del"])
    };
    let areas = [
        open_keys,
        edit_keys,
        vec!["cut", "copy", "paste"],
        vec!["addPage", "addFolder", "addSeparator"],
        vec!["sortByName"],
    ];

    areas
        .into_iter()
        .zip(hidden_areas(kind, is_searching))
        .map(|(keys, hidden)| MenuArea { keys, hidden })
        .collect()
}

/// What a menu entry does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuAction {
    OpenAll,
    OpenAllInNewWindow,
    OpenAllInIncognito,
    Edit,
    Delete,
    Cut,
    Copy,
    Paste,
    AddPage,
    AddFolder,
    AddSeparator,
    SortByName,
}

impl MenuAction {
    pub fn from_key(key: &str) -> Option<Self> {
        let action = match key {
            "openAll" | "openInB" => MenuAction::OpenAll,
            "openAllInN" | "openInN" => MenuAction::OpenAllInNewWindow,
            "openAllInI" | "openInI" => MenuAction::OpenAllInIncognito,
            "rename" | "edit" => MenuAction::Edit,
            "del" => MenuAction::Delete,
            "cut" => MenuAction::Cut,
            "copy" => MenuAction::Copy,
            "paste" => MenuAction::Paste,
            "addPage" => MenuAction::AddPage,
            "addFolder" => MenuAction::AddFolder,
            "addSeparator" => MenuAction::AddSeparator,
            "sortByName" => MenuAction::SortByName,
            _ => return None,
        };
        Some(action)
    }
}
