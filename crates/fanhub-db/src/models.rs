//! Database row types. These map directly to SQLite rows and stay separate
//! from the fanhub-types API models; `into_model` does the conversion.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use fanhub_types::models::{
    AdminProfile, BoardMessage, CarouselImage, ChatMessage, ChatUser, ReviewStatus, Role,
    SenderRole, Sex, UserProfile, WorkReview,
};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub sex: Option<String>,
    pub created_at: String,
}

pub struct AdminRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct ChatMessageRow {
    pub id: i64,
    pub sender: String,
    pub receiver: String,
    pub sender_role: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

pub struct ChatUserRow {
    pub username: String,
    pub message_count: i64,
    pub unread_count: i64,
    pub last_message_at: String,
}

pub struct BoardMessageRow {
    pub id: i64,
    pub username: String,
    pub content: String,
    pub created_at: String,
}

pub struct CarouselRow {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub display_order: i64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ReviewRow {
    pub id: i64,
    pub username: String,
    pub rating: i64,
    pub content: String,
    pub tags: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// SQLite stores `datetime('now')` as "YYYY-MM-DD HH:MM:SS" without a timezone;
/// those values are UTC.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

impl UserRow {
    pub fn into_model(self) -> UserProfile {
        let sex = self.sex.as_deref().and_then(|s| {
            s.parse::<Sex>()
                .map_err(|e| warn!("User {}: {}", self.id, e))
                .ok()
        });
        UserProfile {
            id: self.id,
            username: self.username,
            sex,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl AdminRow {
    /// Unknown roles degrade to plain `Admin`, never upward.
    pub fn role(&self) -> Role {
        match self.role.parse::<Role>() {
            Ok(Role::User) | Err(_) => {
                warn!("Admin {} has unexpected role '{}'", self.id, self.role);
                Role::Admin
            }
            Ok(role) => role,
        }
    }

    pub fn into_model(self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            role: self.role(),
            created_at: parse_timestamp(&self.created_at),
            username: self.username,
        }
    }
}

impl ChatMessageRow {
    pub fn into_model(self) -> ChatMessage {
        let sender_role = self.sender_role.parse().unwrap_or_else(|e| {
            warn!("Chat message {}: {}", self.id, e);
            SenderRole::User
        });
        ChatMessage {
            id: self.id,
            sender: self.sender,
            receiver: self.receiver,
            sender_role,
            content: self.content,
            is_read: self.is_read,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl ChatUserRow {
    pub fn into_model(self) -> ChatUser {
        ChatUser {
            username: self.username,
            message_count: self.message_count,
            unread_count: self.unread_count,
            last_message_at: parse_timestamp(&self.last_message_at),
        }
    }
}

impl BoardMessageRow {
    pub fn into_model(self) -> BoardMessage {
        BoardMessage {
            id: self.id,
            username: self.username,
            content: self.content,
            created_at: parse_timestamp(&self.created_at),
        }
    }
}

impl CarouselRow {
    pub fn into_model(self) -> CarouselImage {
        CarouselImage {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            display_order: self.display_order,
            active: self.active,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}

impl ReviewRow {
    pub fn into_model(self) -> WorkReview {
        let tags: Vec<String> = serde_json::from_str(&self.tags).unwrap_or_else(|e| {
            warn!("Corrupt tags on review {}: {}", self.id, e);
            Vec::new()
        });
        let status = self.status.parse().unwrap_or_else(|e| {
            warn!("Review {}: {}", self.id, e);
            ReviewStatus::Pending
        });
        WorkReview {
            id: self.id,
            username: self.username,
            rating: self.rating.clamp(1, 5) as u8,
            content: self.content,
            tags,
            status,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        }
    }
}
