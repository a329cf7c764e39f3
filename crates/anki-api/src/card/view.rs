use anki_db::{
    models::{Card, Tag},
    repositories::tag as tag_repo,
};
use serde::Serialize;
use sqlx::PgPool;

/// A card as shown to clients, with its tags attached.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    #[serde(flatten)]
    pub card: Card,
    pub tags: Vec<Tag>,
}

impl CardView {
    /// Tag names joined the way the authoring form expects them.
    pub fn tags_field(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Attach tags to a batch of cards with a single query, preserving card order.
pub async fn with_tags(pool: &PgPool, cards: Vec<Card>) -> Result<Vec<CardView>, sqlx::Error> {
    let ids: Vec<i32> = cards.iter().map(|c| c.id).collect();
    let mut tags = tag_repo::tags_by_card(pool, &ids).await?;

    Ok(cards
        .into_iter()
        .map(|card| CardView {
            tags: tags.remove(&card.id).unwrap_or_default(),
            card,
        })
        .collect())
}

pub async fn one_with_tags(pool: &PgPool, card: Card) -> Result<CardView, sqlx::Error> {
    let tags = tag_repo::tags_by_card(pool, &[card.id])
        .await?
        .remove(&card.id)
        .unwrap_or_default();

    Ok(CardView { card, tags })
}
