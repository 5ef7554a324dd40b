use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::{AdminRow, UserRow};

impl Database {
    // -- Users --

    /// Inserts a user unless the name is held by any account; `None` when taken.
    /// The check and insert share one lock, so concurrent callers cannot both win.
    pub fn create_user(&self, username: &str, password_hash: &str, sex: Option<&str>) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            if username_exists(conn, username)? {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO users (username, password, sex) VALUES (?1, ?2, ?3)",
                (username, password_hash, sex),
            )?;
            Ok(Some(conn.last_insert_rowid()))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, sex, created_at FROM users WHERE username = ?1",
                    [username],
                    user_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, sex, created_at FROM users ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Admins --

    /// Same contract as `create_user`, for the `admins` table.
    pub fn create_admin(&self, username: &str, password_hash: &str, role: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            if username_exists(conn, username)? {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO admins (username, password, role) VALUES (?1, ?2, ?3)",
                (username, password_hash, role),
            )?;
            Ok(Some(conn.last_insert_rowid()))
        })
    }

    pub fn get_admin_by_username(&self, username: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, role, created_at FROM admins WHERE username = ?1",
                    [username],
                    admin_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_admins(&self) -> Result<Vec<AdminRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, role, created_at FROM admins ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], admin_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn user_exists(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM users WHERE username = ?1", [username], |r| r.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn admin_exists(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM admins WHERE username = ?1", [username], |r| r.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }
}

/// True when the name belongs to a user or an admin account.
fn username_exists(conn: &Connection, username: &str) -> Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)
             OR EXISTS(SELECT 1 FROM admins WHERE username = ?1)",
        [username],
        |r| r.get(0),
    )?;
    Ok(taken)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        sex: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn admin_from_row(row: &Row<'_>) -> rusqlite::Result<AdminRow> {
    Ok(AdminRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user("lin", "hash", Some("female")).unwrap();

        let row = db.get_user_by_username("lin").unwrap().unwrap();
        assert_eq!(Some(row.id), id);
        assert_eq!(row.password, "hash");
        assert_eq!(row.sex.as_deref(), Some("female"));
        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn taken_names_are_not_inserted() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_user("lin", "hash", None).unwrap().is_some());
        assert_eq!(db.create_user("lin", "other", None).unwrap(), None);
        assert_eq!(db.create_admin("lin", "other", "admin").unwrap(), None);

        assert!(db.create_admin("keeper", "h", "admin").unwrap().is_some());
        assert_eq!(db.create_user("keeper", "h", None).unwrap(), None);

        assert_eq!(db.get_user_by_username("lin").unwrap().unwrap().password, "hash");
        assert!(db.get_admin_by_username("lin").unwrap().is_none());
        assert!(db.get_user_by_username("keeper").unwrap().is_none());
    }

    #[test]
    fn existence_checks_are_per_table() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("reader", "h", None).unwrap();
        db.create_admin("keeper", "h", "admin").unwrap();

        assert!(db.user_exists("reader").unwrap());
        assert!(!db.user_exists("keeper").unwrap());
        assert!(db.admin_exists("keeper").unwrap());
    }

    #[test]
    fn invalid_admin_role_rejected_by_schema() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_admin("x", "h", "user").is_err());
    }
}
