//! Support chat. One table backs both the per-user view and the admin
//! aggregate view, so a message is visible to both sides as soon as it lands.

use anyhow::Result;
use rusqlite::{Connection, Row};

use fanhub_types::models::SenderRole;

use crate::Database;
use crate::models::{ChatMessageRow, ChatUserRow};

const MESSAGE_COLUMNS: &str = "id, sender, receiver, sender_role, content, is_read, created_at";

impl Database {
    pub fn insert_chat_message(
        &self,
        sender: &str,
        receiver: &str,
        sender_role: SenderRole,
        content: &str,
    ) -> Result<ChatMessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (sender, receiver, sender_role, content) VALUES (?1, ?2, ?3, ?4)",
                (sender, receiver, sender_role.as_str(), content),
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = ?1"),
                [id],
                message_from_row,
            )?;
            Ok(row)
        })
    }

    /// Admin-facing view: user-sent messages unioned with admin replies,
    /// optionally narrowed to one user's conversation. Returns the newest
    /// `limit` messages in chronological order.
    pub fn admin_chat_messages(&self, user: Option<&str>, limit: u32) -> Result<Vec<ChatMessageRow>> {
        self.with_conn(|conn| query_messages(conn, user, limit))
    }

    /// Conversation between one user and the admins, chronological.
    pub fn conversation(&self, user: &str, limit: u32) -> Result<Vec<ChatMessageRow>> {
        self.with_conn(|conn| query_messages(conn, Some(user), limit))
    }

    /// Marks every message in `user`'s conversation that was written by the
    /// other side as read. Returns how many rows changed.
    pub fn mark_conversation_read(&self, user: &str, reader: SenderRole) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = match reader {
                SenderRole::Admin => tx.execute(
                    "UPDATE chat_messages SET is_read = 1
                     WHERE sender_role = 'user' AND sender = ?1 AND is_read = 0",
                    [user],
                )?,
                SenderRole::User => tx.execute(
                    "UPDATE chat_messages SET is_read = 1
                     WHERE sender_role = 'admin' AND receiver = ?1 AND is_read = 0",
                    [user],
                )?,
            };
            tx.commit()?;
            Ok(changed)
        })
    }

    /// Every user appearing in a conversation, most recent activity first.
    pub fn chat_users(&self) -> Result<Vec<ChatUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username,
                        COUNT(*),
                        SUM(CASE WHEN sender_role = 'user' AND is_read = 0 THEN 1 ELSE 0 END),
                        MAX(created_at)
                 FROM (
                     SELECT sender AS username, sender_role, is_read, created_at
                     FROM chat_messages WHERE sender_role = 'user'
                     UNION ALL
                     SELECT receiver AS username, sender_role, is_read, created_at
                     FROM chat_messages WHERE sender_role = 'admin'
                 )
                 GROUP BY username
                 ORDER BY MAX(created_at) DESC, username",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ChatUserRow {
                        username: row.get(0)?,
                        message_count: row.get(1)?,
                        unread_count: row.get(2)?,
                        last_message_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_messages(conn: &Connection, user: Option<&str>, limit: u32) -> Result<Vec<ChatMessageRow>> {
    let sql = format!(
        "SELECT {MESSAGE_COLUMNS} FROM (
             SELECT {MESSAGE_COLUMNS} FROM chat_messages
             WHERE sender_role = 'user' AND (?1 IS NULL OR sender = ?1)
             UNION ALL
             SELECT {MESSAGE_COLUMNS} FROM chat_messages
             WHERE sender_role = 'admin' AND (?1 IS NULL OR receiver = ?1)
         )
         ORDER BY created_at DESC, id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt
        .query_map(rusqlite::params![user, limit], message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.reverse();
    Ok(rows)
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<ChatMessageRow> {
    Ok(ChatMessageRow {
        id: row.get(0)?,
        sender: row.get(1)?,
        receiver: row.get(2)?,
        sender_role: row.get(3)?,
        content: row.get(4)?,
        is_read: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_chat_message("lin", "admin", SenderRole::User, "hello?").unwrap();
        db.insert_chat_message("admin", "lin", SenderRole::Admin, "hi lin").unwrap();
        db.insert_chat_message("mei", "admin", SenderRole::User, "question").unwrap();
        db
    }

    #[test]
    fn user_message_visible_in_admin_view() {
        let db = Database::open_in_memory().unwrap();
        let sent = db.insert_chat_message("lin", "admin", SenderRole::User, "hello?").unwrap();

        let all = db.admin_chat_messages(None, 50).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, sent.id);
        assert_eq!(all[0].content, "hello?");
        assert!(!all[0].is_read);
    }

    #[test]
    fn conversation_includes_both_sides_in_order() {
        let db = seeded();
        let convo = db.conversation("lin", 50).unwrap();
        let contents: Vec<&str> = convo.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello?", "hi lin"]);

        let filtered = db.admin_chat_messages(Some("mei"), 50).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sender, "mei");
    }

    #[test]
    fn limit_keeps_newest_messages() {
        let db = seeded();
        let newest = db.admin_chat_messages(None, 2).unwrap();
        let ids: Vec<i64> = newest.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn mark_read_only_touches_other_side() {
        let db = seeded();
        assert_eq!(db.mark_conversation_read("lin", SenderRole::Admin).unwrap(), 1);
        assert_eq!(db.mark_conversation_read("lin", SenderRole::Admin).unwrap(), 0);

        let convo = db.conversation("lin", 50).unwrap();
        assert!(convo[0].is_read);
        assert!(!convo[1].is_read);
    }

    #[test]
    fn chat_users_counts_unread() {
        let db = seeded();
        db.insert_chat_message("lin", "admin", SenderRole::User, "still there?").unwrap();

        let users = db.chat_users().unwrap();
        let lin = users.iter().find(|u| u.username == "lin").unwrap();
        assert_eq!(lin.message_count, 3);
        assert_eq!(lin.unread_count, 2);

        let mei = users.iter().find(|u| u.username == "mei").unwrap();
        assert_eq!(mei.message_count, 1);
        assert_eq!(mei.unread_count, 1);
    }
}
