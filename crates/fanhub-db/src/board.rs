use anyhow::Result;
use rusqlite::Row;

use crate::Database;
use crate::models::BoardMessageRow;

impl Database {
    pub fn insert_board_message(&self, username: &str, content: &str) -> Result<BoardMessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO board_messages (username, content) VALUES (?1, ?2)",
                (username, content),
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                "SELECT id, username, content, created_at FROM board_messages WHERE id = ?1",
                [id],
                board_from_row,
            )?;
            Ok(row)
        })
    }

    /// Newest first. `before` is an id cursor: only posts older than it are returned.
    pub fn list_board_messages(&self, limit: u32, before: Option<i64>) -> Result<Vec<BoardMessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, content, created_at FROM board_messages
                 WHERE ?1 IS NULL OR id < ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![before, limit], board_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false when no post had that id.
    pub fn delete_board_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM board_messages WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<BoardMessageRow> {
    Ok(BoardMessageRow {
        id: row.get(0)?,
        username: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_pagination() {
        let db = Database::open_in_memory().unwrap();
        for i in 1..=5 {
            db.insert_board_message("lin", &format!("post {i}")).unwrap();
        }

        let first = db.list_board_messages(2, None).unwrap();
        assert_eq!(first.iter().map(|r| r.id).collect::<Vec<_>>(), vec![5, 4]);

        let next = db.list_board_messages(2, Some(4)).unwrap();
        assert_eq!(next.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn delete_reports_missing() {
        let db = Database::open_in_memory().unwrap();
        let post = db.insert_board_message("lin", "hi").unwrap();
        assert!(db.delete_board_message(post.id).unwrap());
        assert!(!db.delete_board_message(post.id).unwrap());
        assert!(db.list_board_messages(10, None).unwrap().is_empty());
    }
}
