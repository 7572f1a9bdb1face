use serde::{Deserialize, Serialize};

/// Id of the synthetic store root. Its direct children are the top-level
/// folders ("Bookmarks bar", "Other bookmarks", ...).
pub const ROOT_ID: &str = "0";

/// URL prefix marking a bookmark as a visual divider.
pub const SEPARATOR_URL: &str = "http://separatethis.com/";

/// Folder id of the synthetic level holding search results.
pub const SEARCH_RESULT_ID: &str = "search-result";

/// Id prefix used by placeholder records when they cross an interchange
/// boundary (e.g. JSON handed to a UI).
pub const PLACEHOLDER_ID_PREFIX: &str = "no-bookmark-";

/// One node in the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub index: usize,
    pub date_added: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_group_modified: Option<i64>,
}

impl BookmarkRecord {
    /// Kind of this record, computed from its current fields.
    pub fn kind(&self) -> BookmarkKind {
        classify(self)
    }

    pub fn is_openable(&self) -> bool {
        self.kind().is_openable()
    }

    /// Synthetic folder record used as the owner of a search level.
    pub fn search_folder() -> Self {
        Self {
            id: SEARCH_RESULT_ID.to_string(),
            parent_id: None,
            title: String::new(),
            url: None,
            index: 0,
            date_added: 0,
            date_group_modified: None,
        }
    }
}

/// Classification of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookmarkKind {
    RootFolder,
    Folder,
    Separator,
    Bookmark,
    Placeholder,
}

impl BookmarkKind {
    /// Whether a level can be opened for an item of this kind.
    pub fn is_openable(self) -> bool {
        matches!(self, BookmarkKind::RootFolder | BookmarkKind::Folder)
    }

    /// Whether search results may contain an item of this kind.
    pub fn is_listable_in_search(self) -> bool {
        self == BookmarkKind::Bookmark
    }
}

/// Classifies a record from its id prefix, parent and url.
pub fn classify(record: &BookmarkRecord) -> BookmarkKind {
    if record.id.starts_with(PLACEHOLDER_ID_PREFIX) {
        return BookmarkKind::Placeholder;
    }
    if record.parent_id.as_deref() == Some(ROOT_ID) {
        return BookmarkKind::RootFolder;
    }
    match record.url.as_deref() {
        None => BookmarkKind::Folder,
        Some(url) if url.starts_with(SEPARATOR_URL) => BookmarkKind::Separator,
        Some(_) => BookmarkKind::Bookmark,
    }
}

/// Record together with its nested children, as returned by a subtree read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    #[serde(flatten)]
    pub record: BookmarkRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BookmarkNode>,
}

/// Fields accepted when creating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDetails {
    pub parent_id: String,
    /// Insert position; appended when absent.
    #[serde(default)]
    pub index: Option<usize>,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Fields accepted when editing a record. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Destination of a move. Absent parent keeps the current parent; absent
/// index appends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
}

/// Change notification emitted by the bookmark store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BookmarkEvent {
    Created {
        record: BookmarkRecord,
    },
    Changed {
        id: String,
        title: String,
        url: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Moved {
        id: String,
        parent_id: String,
        index: usize,
        old_parent_id: String,
        old_index: usize,
    },
    #[serde(rename_all = "camelCase")]
    Removed {
        id: String,
        parent_id: String,
        index: usize,
    },
}

impl BookmarkEvent {
    /// Id of the record the event is about.
    pub fn id(&self) -> &str {
        match self {
            BookmarkEvent::Created { record } => &record.id,
            BookmarkEvent::Changed { id, .. }
            | BookmarkEvent::Moved { id, .. }
            | BookmarkEvent::Removed { id, .. } => id,
        }
    }
}
