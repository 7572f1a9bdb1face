use serde::{Deserialize, Serialize};

use super::bookmark::{classify, BookmarkKind, BookmarkRecord, PLACEHOLDER_ID_PREFIX};

/// One displayed child of a tree level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeItem {
    Record(BookmarkRecord),
    /// Stands in for the children of an empty folder.
    #[serde(rename_all = "camelCase")]
    Placeholder { parent_id: String },
}

impl TreeItem {
    pub fn kind(&self) -> BookmarkKind {
        match self {
            TreeItem::Record(record) => classify(record),
            TreeItem::Placeholder { .. } => BookmarkKind::Placeholder,
        }
    }

    pub fn record(&self) -> Option<&BookmarkRecord> {
        match self {
            TreeItem::Record(record) => Some(record),
            TreeItem::Placeholder { .. } => None,
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            TreeItem::Record(record) => record.parent_id.as_deref(),
            TreeItem::Placeholder { parent_id } => Some(parent_id),
        }
    }

    /// Id usable by a UI for element keys. Placeholders get a derived id.
    pub fn display_id(&self) -> String {
        match self {
            TreeItem::Record(record) => record.id.clone(),
            TreeItem::Placeholder { parent_id } => format!("{}{}", PLACEHOLDER_ID_PREFIX, parent_id),
        }
    }

    /// Whether both items denote the same underlying entry, ignoring
    /// fields that may have changed since either was read.
    pub fn same_entry(&self, other: &TreeItem) -> bool {
        match (self, other) {
            (TreeItem::Record(a), TreeItem::Record(b)) => a.id == b.id,
            (TreeItem::Placeholder { parent_id: a }, TreeItem::Placeholder { parent_id: b }) => a == b,
            _ => false,
        }
    }
}

/// Options controlling a keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    pub title_only: bool,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            title_only: false,
            max_results: 50,
        }
    }
}

/// A search that produced (and can reproduce) a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
    pub options: SearchOptions,
}

/// A folder together with its direct children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLevel {
    pub folder: BookmarkRecord,
    pub children: Vec<TreeItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchQuery>,
}

impl TreeLevel {
    /// Builds a folder level, inserting a placeholder when `children` is empty.
    pub fn new(folder: BookmarkRecord, children: Vec<BookmarkRecord>) -> Self {
        let children = with_placeholder(&folder.id, children);
        Self {
            folder,
            children,
            search: None,
        }
    }

    /// Builds the synthetic search-result level.
    pub fn search_result(query: SearchQuery, results: Vec<BookmarkRecord>) -> Self {
        let folder = BookmarkRecord::search_folder();
        let children = with_placeholder(&folder.id, results);
        Self {
            folder,
            children,
            search: Some(query),
        }
    }

    pub fn folder_id(&self) -> &str {
        &self.folder.id
    }

    pub fn is_search(&self) -> bool {
        self.search.is_some()
    }

    /// Child record with the given id, if present.
    pub fn child(&self, id: &str) -> Option<&BookmarkRecord> {
        self.children
            .iter()
            .filter_map(TreeItem::record)
            .find(|record| record.id == id)
    }

    pub fn position_of(&self, item: &TreeItem) -> Option<usize> {
        self.children.iter().position(|child| child.same_entry(item))
    }
}

fn with_placeholder(folder_id: &str, children: Vec<BookmarkRecord>) -> Vec<TreeItem> {
    if children.is_empty() {
        vec![TreeItem::Placeholder {
            parent_id: folder_id.to_string(),
        }]
    } else {
        children.into_iter().map(TreeItem::Record).collect()
    }
}

/// What a paste does with the clipboard entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardMode {
    Cut,
    Copy,
}

/// Item picked by cut or copy, waiting for a paste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub mode: ClipboardMode,
    pub id: String,
}
