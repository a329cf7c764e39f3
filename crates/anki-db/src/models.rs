use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A flashcard row from `"Cards"`, with its category name joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Card {
    pub id: i32,
    pub question: String,
    /// Markdown source.
    pub answer: String,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub views: i32,
    pub favorites: i32,
    pub check_status: bool,
    pub author_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// A tag with the number of cards carrying it, for tag maintenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TagUsage {
    pub id: i32,
    pub name: String,
    pub cards_count: i64,
}

/// Join row used to eager-load tags for a batch of cards.
#[derive(Debug, Clone, FromRow)]
pub struct CardTag {
    pub card_id: i32,
    pub tag_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEmailAndName {
    pub email: String,
    pub username: String,
}

/// Filters of the moderation list.
#[derive(Debug, Clone, Default)]
pub struct AdminCardFilter {
    /// `ILIKE` pattern, already escaped.
    pub pattern: Option<String>,
    pub category_id: Option<i32>,
    pub checked: Option<bool>,
    pub has_code: Option<bool>,
}
