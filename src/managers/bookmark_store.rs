//! Bookmark store.
//!
//! Defines the `BookmarkStore` trait consumed by the navigation core and a
//! SQLite implementation with the move/index conventions of the browser's
//! bookmark tree. Every mutation is announced on a broadcast channel.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::broadcast;

use crate::database::Database;
use crate::types::bookmark::{
    BookmarkEvent, BookmarkNode, BookmarkRecord, CreateDetails, MoveDestination, UpdateChanges, ROOT_ID,
};
use crate::types::errors::StoreError;

/// Capacity of the change notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

const RECORD_COLUMNS: &str = "id, parent_id, title, url, position, date_added, date_group_modified";

/// Tree-structured bookmark storage with change notifications.
///
/// Move indices follow the browser convention: within the same parent, an
/// index greater than the item's current index is read before the item is
/// removed, so the item ends up at `index - 1`.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<BookmarkRecord, StoreError>;
    async fn get_children(&self, id: &str) -> Result<Vec<BookmarkRecord>, StoreError>;
    async fn get_subtree(&self, id: &str) -> Result<BookmarkNode, StoreError>;
    /// Records whose title or url contains every whitespace-separated word.
    async fn search(&self, query: &str) -> Result<Vec<BookmarkRecord>, StoreError>;
    async fn create(&self, details: CreateDetails) -> Result<BookmarkRecord, StoreError>;
    async fn update(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkRecord, StoreError>;
    async fn move_item(&self, id: &str, destination: MoveDestination) -> Result<BookmarkRecord, StoreError>;
    /// Removes a bookmark, separator or empty folder.
    async fn remove(&self, id: &str) -> Result<(), StoreError>;
    /// Removes a folder with everything below it.
    async fn remove_tree(&self, id: &str) -> Result<(), StoreError>;
    fn subscribe(&self) -> broadcast::Receiver<BookmarkEvent>;
}

/// Bookmark store backed by the shared SQLite database.
pub struct SqliteBookmarkStore {
    db: Arc<Database>,
    events: broadcast::Sender<BookmarkEvent>,
}

impl SqliteBookmarkStore {
    pub fn new(db: Arc<Database>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { db, events }
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    fn emit(&self, event: BookmarkEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<BookmarkRecord> {
        let position: i64 = row.get(4)?;
        Ok(BookmarkRecord {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            index: position.max(0) as usize,
            date_added: row.get(5)?,
            date_group_modified: row.get(6)?,
        })
    }

    fn fetch(conn: &Connection, id: &str) -> Result<BookmarkRecord, StoreError> {
        conn.query_row(
            &format!("SELECT {} FROM bookmarks WHERE id = ?1", RECORD_COLUMNS),
            params![id],
            Self::row_to_record,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn children_of(conn: &Connection, parent_id: &str) -> Result<Vec<BookmarkRecord>, StoreError> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE parent_id = ?1 ORDER BY position",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![parent_id], Self::row_to_record)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn child_ids(conn: &Connection, parent_id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = conn.prepare("SELECT id FROM bookmarks WHERE parent_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map(params![parent_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    /// Rewrites sibling positions to match `ids` and touches the parent.
    fn write_positions(conn: &Connection, parent_id: &str, ids: &[String], now: i64) -> Result<(), StoreError> {
        for (position, id) in ids.iter().enumerate() {
            conn.execute(
                "UPDATE bookmarks SET position = ?1 WHERE id = ?2",
                params![position as i64, id],
            )?;
        }
        conn.execute(
            "UPDATE bookmarks SET date_group_modified = ?1 WHERE id = ?2",
            params![now, parent_id],
        )?;
        Ok(())
    }

    fn next_id(conn: &Connection) -> Result<String, StoreError> {
        let next: i64 = conn.query_row(
            "SELECT COALESCE(MAX(CAST(id AS INTEGER)), 0) + 1 FROM bookmarks",
            [],
            |row| row.get(0),
        )?;
        Ok(next.to_string())
    }

    /// The store root and the top-level folders cannot be edited, moved or removed.
    fn ensure_modifiable(record: &BookmarkRecord) -> Result<(), StoreError> {
        if record.id == ROOT_ID || record.parent_id.as_deref() == Some(ROOT_ID) {
            return Err(StoreError::InvalidOperation(format!(
                "can't modify the root bookmark folders: {}",
                record.id
            )));
        }
        Ok(())
    }

    /// Looks up a folder that may receive children.
    fn fetch_target_folder(conn: &Connection, id: &str) -> Result<BookmarkRecord, StoreError> {
        let folder = Self::fetch(conn, id)?;
        if folder.url.is_some() {
            return Err(StoreError::InvalidOperation(format!("parent is not a folder: {}", id)));
        }
        if folder.id == ROOT_ID {
            return Err(StoreError::InvalidOperation(
                "can't add items directly under the store root".to_string(),
            ));
        }
        Ok(folder)
    }

    fn subtree(conn: &Connection, record: BookmarkRecord) -> Result<BookmarkNode, StoreError> {
        let children = if record.url.is_none() {
            Self::children_of(conn, &record.id)?
                .into_iter()
                .map(|child| Self::subtree(conn, child))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };
        Ok(BookmarkNode { record, children })
    }

    fn descendant_ids(conn: &Connection, id: &str) -> Result<Vec<String>, StoreError> {
        let mut pending = vec![id.to_string()];
        let mut all = Vec::new();
        while let Some(current) = pending.pop() {
            pending.extend(Self::child_ids(conn, &current)?);
            all.push(current);
        }
        Ok(all)
    }

    fn search_sync(&self, query: &str) -> Result<Vec<BookmarkRecord>, StoreError> {
        let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bookmarks WHERE id != ?1 ORDER BY rowid",
            RECORD_COLUMNS
        ))?;
        let rows = stmt.query_map(params![ROOT_ID], Self::row_to_record)?;

        let mut results = Vec::new();
        for row in rows {
            let record = row?;
            let title = record.title.to_lowercase();
            let url = record.url.as_deref().unwrap_or_default().to_lowercase();
            if words.iter().all(|w| title.contains(w.as_str()) || url.contains(w.as_str())) {
                results.push(record);
            }
        }
        Ok(results)
    }

    fn create_sync(&self, details: CreateDetails) -> Result<BookmarkRecord, StoreError> {
        let now = Self::now();
        let mut conn = self.db.connection();
        let tx = conn.transaction()?;

        Self::fetch_target_folder(&tx, &details.parent_id)?;
        let mut siblings = Self::child_ids(&tx, &details.parent_id)?;
        let index = details.index.unwrap_or(siblings.len()).min(siblings.len());

        let id = Self::next_id(&tx)?;
        let group_modified = details.url.is_none().then_some(now);
        tx.execute(
            "INSERT INTO bookmarks (id, parent_id, title, url, position, date_added, date_group_modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![id, details.parent_id, details.title, details.url, index as i64, now, group_modified],
        )?;
        siblings.insert(index, id.clone());
        Self::write_positions(&tx, &details.parent_id, &siblings, now)?;

        let record = Self::fetch(&tx, &id)?;
        tx.commit()?;
        Ok(record)
    }

    fn update_sync(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkRecord, StoreError> {
        let mut conn = self.db.connection();
        let tx = conn.transaction()?;

        let record = Self::fetch(&tx, id)?;
        Self::ensure_modifiable(&record)?;
        if record.url.is_none() && changes.url.is_some() {
            return Err(StoreError::InvalidOperation(format!(
                "can't set the url of a folder: {}",
                id
            )));
        }

        if let Some(title) = &changes.title {
            tx.execute("UPDATE bookmarks SET title = ?1 WHERE id = ?2", params![title, id])?;
        }
        if let Some(url) = &changes.url {
            tx.execute("UPDATE bookmarks SET url = ?1 WHERE id = ?2", params![url, id])?;
        }

        let record = Self::fetch(&tx, id)?;
        tx.commit()?;
        Ok(record)
    }

    fn move_sync(&self, id: &str, destination: MoveDestination) -> Result<(BookmarkRecord, BookmarkEvent), StoreError> {
        let now = Self::now();
        let mut conn = self.db.connection();
        let tx = conn.transaction()?;

        let record = Self::fetch(&tx, id)?;
        Self::ensure_modifiable(&record)?;
        let old_parent_id = record
            .parent_id
            .clone()
            .ok_or_else(|| StoreError::InvalidOperation(format!("record has no parent: {}", id)))?;
        let new_parent_id = destination.parent_id.unwrap_or_else(|| old_parent_id.clone());

        Self::fetch_target_folder(&tx, &new_parent_id)?;
        // The destination must not be the record itself or one of its descendants.
        let mut ancestor = Some(new_parent_id.clone());
        while let Some(current) = ancestor {
            if current == id {
                return Err(StoreError::InvalidOperation(format!(
                    "can't move a folder into itself: {}",
                    id
                )));
            }
            ancestor = Self::fetch(&tx, &current)?.parent_id;
        }

        let mut old_siblings = Self::child_ids(&tx, &old_parent_id)?;
        let old_index = old_siblings
            .iter()
            .position(|sibling| sibling == id)
            .unwrap_or(record.index);

        let final_index = if new_parent_id == old_parent_id {
            let mut target = destination.index.unwrap_or(old_siblings.len()).min(old_siblings.len());
            if target > old_index {
                target -= 1;
            }
            old_siblings.retain(|sibling| sibling != id);
            old_siblings.insert(target, id.to_string());
            Self::write_positions(&tx, &old_parent_id, &old_siblings, now)?;
            target
        } else {
            old_siblings.retain(|sibling| sibling != id);
            Self::write_positions(&tx, &old_parent_id, &old_siblings, now)?;

            let mut new_siblings = Self::child_ids(&tx, &new_parent_id)?;
            let target = destination.index.unwrap_or(new_siblings.len()).min(new_siblings.len());
            new_siblings.insert(target, id.to_string());
            tx.execute(
                "UPDATE bookmarks SET parent_id = ?1 WHERE id = ?2",
                params![new_parent_id, id],
            )?;
            Self::write_positions(&tx, &new_parent_id, &new_siblings, now)?;
            target
        };

        let moved = Self::fetch(&tx, id)?;
        tx.commit()?;

        let event = BookmarkEvent::Moved {
            id: id.to_string(),
            parent_id: new_parent_id,
            index: final_index,
            old_parent_id,
            old_index,
        };
        Ok((moved, event))
    }

    fn remove_sync(&self, id: &str, recursive: bool) -> Result<BookmarkEvent, StoreError> {
        let now = Self::now();
        let mut conn = self.db.connection();
        let tx = conn.transaction()?;

        let record = Self::fetch(&tx, id)?;
        Self::ensure_modifiable(&record)?;
        let parent_id = record
            .parent_id
            .clone()
            .ok_or_else(|| StoreError::InvalidOperation(format!("record has no parent: {}", id)))?;

        let doomed = if recursive {
            Self::descendant_ids(&tx, id)?
        } else {
            if !Self::child_ids(&tx, id)?.is_empty() {
                return Err(StoreError::InvalidOperation(format!(
                    "can't remove non-empty folder: {}",
                    id
                )));
            }
            vec![id.to_string()]
        };
        for doomed_id in &doomed {
            tx.execute("DELETE FROM bookmarks WHERE id = ?1", params![doomed_id])?;
        }

        let siblings = Self::child_ids(&tx, &parent_id)?;
        Self::write_positions(&tx, &parent_id, &siblings, now)?;
        tx.commit()?;

        Ok(BookmarkEvent::Removed {
            id: id.to_string(),
            parent_id,
            index: record.index,
        })
    }
}

#[async_trait]
impl BookmarkStore for SqliteBookmarkStore {
    async fn get(&self, id: &str) -> Result<BookmarkRecord, StoreError> {
        let conn = self.db.connection();
        Self::fetch(&conn, id)
    }

    /// Lists direct children in sibling order. Fails if `id` does not exist.
    async fn get_children(&self, id: &str) -> Result<Vec<BookmarkRecord>, StoreError> {
        let conn = self.db.connection();
        Self::fetch(&conn, id)?;
        Self::children_of(&conn, id)
    }

    async fn get_subtree(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        let conn = self.db.connection();
        let record = Self::fetch(&conn, id)?;
        Self::subtree(&conn, record)
    }

    async fn search(&self, query: &str) -> Result<Vec<BookmarkRecord>, StoreError> {
        self.search_sync(query)
    }

    async fn create(&self, details: CreateDetails) -> Result<BookmarkRecord, StoreError> {
        let record = self.create_sync(details)?;
        self.emit(BookmarkEvent::Created { record: record.clone() });
        Ok(record)
    }

    async fn update(&self, id: &str, changes: UpdateChanges) -> Result<BookmarkRecord, StoreError> {
        let record = self.update_sync(id, changes)?;
        self.emit(BookmarkEvent::Changed {
            id: record.id.clone(),
            title: record.title.clone(),
            url: record.url.clone(),
        });
        Ok(record)
    }

    async fn move_item(&self, id: &str, destination: MoveDestination) -> Result<BookmarkRecord, StoreError> {
        let (record, event) = self.move_sync(id, destination)?;
        self.emit(event);
        Ok(record)
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let event = self.remove_sync(id, false)?;
        self.emit(event);
        Ok(())
    }

    async fn remove_tree(&self, id: &str) -> Result<(), StoreError> {
        let event = self.remove_sync(id, true)?;
        self.emit(event);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<BookmarkEvent> {
        self.events.subscribe()
    }
}
