use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::models::CarouselRow;

const CAROUSEL_COLUMNS: &str = "id, title, image_url, display_order, active, created_at, updated_at";

impl Database {
    pub fn insert_carousel_image(
        &self,
        title: &str,
        image_url: &str,
        display_order: i64,
        active: bool,
    ) -> Result<CarouselRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO carousel_images (title, image_url, display_order, active) VALUES (?1, ?2, ?3, ?4)",
                (title, image_url, display_order, active),
            )?;
            let id = conn.last_insert_rowid();
            let row = query_carousel_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("carousel image {} vanished after insert", id))?;
            Ok(row)
        })
    }

    /// Ordered by display order, then id. `active_only` hides disabled images.
    pub fn list_carousel_images(&self, active_only: bool) -> Result<Vec<CarouselRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAROUSEL_COLUMNS} FROM carousel_images
                 WHERE ?1 = 0 OR active = 1
                 ORDER BY display_order, id"
            ))?;
            let rows = stmt
                .query_map([active_only], carousel_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies only the provided fields. `None` when the image does not exist.
    pub fn update_carousel_image(
        &self,
        id: i64,
        title: Option<&str>,
        image_url: Option<&str>,
        display_order: Option<i64>,
        active: Option<bool>,
    ) -> Result<Option<CarouselRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE carousel_images SET
                     title = COALESCE(?2, title),
                     image_url = COALESCE(?3, image_url),
                     display_order = COALESCE(?4, display_order),
                     active = COALESCE(?5, active),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, title, image_url, display_order, active],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_carousel_by_id(conn, id)
        })
    }

    pub fn delete_carousel_image(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM carousel_images WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn query_carousel_by_id(conn: &Connection, id: i64) -> Result<Option<CarouselRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {CAROUSEL_COLUMNS} FROM carousel_images WHERE id = ?1"),
            [id],
            carousel_from_row,
        )
        .optional()?;
    Ok(row)
}

fn carousel_from_row(row: &Row<'_>) -> rusqlite::Result<CarouselRow> {
    Ok(CarouselRow {
        id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get(2)?,
        display_order: row.get(3)?,
        active: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_listing_respects_flag_and_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_carousel_image("second", "/img/2.jpg", 2, true).unwrap();
        db.insert_carousel_image("hidden", "/img/h.jpg", 0, false).unwrap();
        db.insert_carousel_image("first", "/img/1.jpg", 1, true).unwrap();

        let active: Vec<String> = db
            .list_carousel_images(true)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(active, vec!["first", "second"]);

        let all = db.list_carousel_images(false).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].title, "hidden");
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let db = Database::open_in_memory().unwrap();
        let img = db.insert_carousel_image("cover", "/img/c.jpg", 3, true).unwrap();

        let updated = db
            .update_carousel_image(img.id, None, None, None, Some(false))
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "cover");
        assert_eq!(updated.display_order, 3);
        assert!(!updated.active);

        assert!(db.update_carousel_image(999, Some("x"), None, None, None).unwrap().is_none());
    }
}
