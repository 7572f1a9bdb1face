//! Navigation history.
//!
//! Persists the chain of folder ids that were open the last time the popup
//! was used (most recent last), backed by SQLite via `rusqlite`.

use std::sync::Arc;

use rusqlite::params;

use crate::database::Database;
use crate::types::errors::HistoryError;

/// Upper bound on the number of persisted folder ids.
pub const MAX_LAST_USED_TREES: usize = 32;

/// Trait defining navigation history operations.
pub trait NavigationHistory: Send + Sync {
    fn load(&self) -> Result<Vec<String>, HistoryError>;
    /// Replaces the chain. Only the last `MAX_LAST_USED_TREES` ids are kept.
    fn save(&self, folder_ids: &[String]) -> Result<(), HistoryError>;
    fn clear(&self) -> Result<(), HistoryError>;
}

/// Navigation history stored in the `last_used_trees` table.
pub struct SqliteNavigationHistory {
    db: Arc<Database>,
}

impl SqliteNavigationHistory {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl NavigationHistory for SqliteNavigationHistory {
    fn load(&self) -> Result<Vec<String>, HistoryError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT folder_id FROM last_used_trees ORDER BY position")
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| HistoryError::DatabaseError(e.to_string()))?);
        }
        Ok(ids)
    }

    fn save(&self, folder_ids: &[String]) -> Result<(), HistoryError> {
        let skip = folder_ids.len().saturating_sub(MAX_LAST_USED_TREES);

        let mut conn = self.db.connection();
        let tx = conn
            .transaction()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        tx.execute("DELETE FROM last_used_trees", [])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        for (position, id) in folder_ids.iter().skip(skip).enumerate() {
            tx.execute(
                "INSERT INTO last_used_trees (position, folder_id) VALUES (?1, ?2)",
                params![position as i64, id],
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), HistoryError> {
        self.db
            .connection()
            .execute("DELETE FROM last_used_trees", [])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
