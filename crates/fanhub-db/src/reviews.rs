use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

use fanhub_types::models::{ReviewStats, ReviewStatus};

use crate::Database;
use crate::models::ReviewRow;

const REVIEW_COLUMNS: &str = "id, username, rating, content, tags, status, created_at, updated_at";

impl Database {
    pub fn insert_review(
        &self,
        username: &str,
        rating: u8,
        content: &str,
        tags: &[String],
        status: ReviewStatus,
    ) -> Result<ReviewRow> {
        let tags_json = serde_json::to_string(tags)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO work_reviews (username, rating, content, tags, status) VALUES (?1, ?2, ?3, ?4, ?5)",
                (username, rating, content, &tags_json, status.as_str()),
            )?;
            let id = conn.last_insert_rowid();
            query_review_by_id(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("review {} vanished after insert", id))
        })
    }

    /// Newest first, optionally restricted to one status.
    pub fn list_reviews(&self, status: Option<ReviewStatus>, limit: u32) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM work_reviews
                 WHERE ?1 IS NULL OR status = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(
                    rusqlite::params![status.map(ReviewStatus::as_str), limit],
                    review_from_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_review_status(&self, id: i64, status: ReviewStatus) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE work_reviews SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
                (id, status.as_str()),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_review_by_id(conn, id)
        })
    }

    pub fn delete_review(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM work_reviews WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Count, mean and per-star distribution over approved reviews.
    pub fn review_stats(&self) -> Result<ReviewStats> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT rating, COUNT(*) FROM work_reviews
                 WHERE status = 'approved'
                 GROUP BY rating",
            )?;
            let buckets = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let mut stats = ReviewStats::default();
            let mut total = 0i64;
            for (rating, count) in buckets {
                if let Some(slot) = usize::try_from(rating - 1).ok().and_then(|i| stats.distribution.get_mut(i)) {
                    *slot += count;
                    stats.count += count;
                    total += rating * count;
                }
            }
            if stats.count > 0 {
                stats.average = Some(total as f64 / stats.count as f64);
            }
            Ok(stats)
        })
    }
}

fn query_review_by_id(conn: &Connection, id: i64) -> Result<Option<ReviewRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {REVIEW_COLUMNS} FROM work_reviews WHERE id = ?1"),
            [id],
            review_from_row,
        )
        .optional()?;
    Ok(row)
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        username: row.get(1)?,
        rating: row.get(2)?,
        content: row.get(3)?,
        tags: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn insert_round_trips_tags_and_status() {
        let db = Database::open_in_memory().unwrap();
        let row = db
            .insert_review("lin", 4, "moving ending", &tags(&["plot", "ending"]), ReviewStatus::Pending)
            .unwrap();

        let review = row.into_model();
        assert_eq!(review.rating, 4);
        assert_eq!(review.tags, vec!["plot", "ending"]);
        assert_eq!(review.status, ReviewStatus::Pending);
    }

    #[test]
    fn status_filter_and_moderation() {
        let db = Database::open_in_memory().unwrap();
        let a = db.insert_review("lin", 5, "great", &[], ReviewStatus::Pending).unwrap();
        db.insert_review("mei", 2, "slow", &[], ReviewStatus::Approved).unwrap();

        assert_eq!(db.list_reviews(Some(ReviewStatus::Pending), 50).unwrap().len(), 1);
        assert_eq!(db.list_reviews(None, 50).unwrap().len(), 2);

        let approved = db.set_review_status(a.id, ReviewStatus::Approved).unwrap().unwrap();
        assert_eq!(approved.status, "approved");
        assert_eq!(db.list_reviews(Some(ReviewStatus::Approved), 50).unwrap().len(), 2);
        assert!(db.set_review_status(999, ReviewStatus::Rejected).unwrap().is_none());
    }

    #[test]
    fn deleted_review_leaves_listings() {
        let db = Database::open_in_memory().unwrap();
        let row = db.insert_review("lin", 3, "ok", &[], ReviewStatus::Approved).unwrap();
        assert!(db.delete_review(row.id).unwrap());
        assert!(db.list_reviews(None, 50).unwrap().is_empty());
        assert!(!db.delete_review(row.id).unwrap());
    }

    #[test]
    fn stats_cover_only_approved() {
        let db = Database::open_in_memory().unwrap();
        db.insert_review("a", 5, "x", &[], ReviewStatus::Approved).unwrap();
        db.insert_review("b", 4, "x", &[], ReviewStatus::Approved).unwrap();
        db.insert_review("c", 4, "x", &[], ReviewStatus::Approved).unwrap();
        db.insert_review("d", 1, "x", &[], ReviewStatus::Rejected).unwrap();

        let stats = db.review_stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.distribution, [0, 0, 0, 2, 1]);
        let avg = stats.average.unwrap();
        assert!((avg - 13.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn stats_empty() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.review_stats().unwrap();
        assert_eq!(stats.count, 0);
        assert!(stats.average.is_none());
    }
}
