use std::collections::HashMap;

use sqlx::{Executor, PgConnection, Postgres};

use crate::models::{CardTag, Tag, TagUsage};

pub async fn find_by_id<'e, E>(executor: E, tag_id: i32) -> Result<Option<Tag>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT "TagID" AS id, "Name" AS name
            FROM "Tags"
            WHERE "TagID" = $1
        "#,
    )
    .bind(tag_id)
    .fetch_optional(executor)
    .await
}

/// Tag maintenance filters: `$1` name pattern, `$2` only tags without cards.
const TAG_FILTER: &str = r#"
    ($1::text IS NULL OR t."Name" ILIKE $1)
    AND (
        NOT $2
        OR NOT EXISTS (SELECT 1 FROM "CardTags" ct WHERE ct."TagID" = t."TagID")
    )
"#;

pub async fn count_usage<'e, E>(
    executor: E,
    pattern: Option<&str>,
    unused_only: bool,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(r#"SELECT COUNT(*) FROM "Tags" t WHERE {TAG_FILTER}"#);

    sqlx::query_scalar(&sql)
        .bind(pattern)
        .bind(unused_only)
        .fetch_one(executor)
        .await
}

/// Tags by name, each with how many cards carry it.
pub async fn list_usage<'e, E>(
    executor: E,
    pattern: Option<&str>,
    unused_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<TagUsage>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT
                t."TagID" AS id,
                t."Name" AS name,
                (SELECT COUNT(*) FROM "CardTags" ct WHERE ct."TagID" = t."TagID") AS cards_count
            FROM "Tags" t
            WHERE {TAG_FILTER}
            ORDER BY t."Name", t."TagID"
            LIMIT $3 OFFSET $4
        "#
    );

    sqlx::query_as(&sql)
        .bind(pattern)
        .bind(unused_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

/// Delete a tag; its join rows go with it.
pub async fn delete<'e, E>(executor: E, tag_id: i32) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM "Tags"
            WHERE "TagID" = $1
        "#,
    )
    .bind(tag_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Tags attached to any of the given cards, in one round trip.
pub async fn list_for_cards<'e, E>(executor: E, card_ids: &[i32]) -> Result<Vec<CardTag>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT ct."CardID" AS card_id, t."TagID" AS tag_id, t."Name" AS name
            FROM "CardTags" ct
            JOIN "Tags" t ON t."TagID" = ct."TagID"
            WHERE ct."CardID" = ANY($1)
            ORDER BY ct.id
        "#,
    )
    .bind(card_ids)
    .fetch_all(executor)
    .await
}

/// Same as [`list_for_cards`], grouped by card id.
pub async fn tags_by_card<'e, E>(
    executor: E,
    card_ids: &[i32],
) -> Result<HashMap<i32, Vec<Tag>>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
    if card_ids.is_empty() {
        return Ok(grouped);
    }

    for row in list_for_cards(executor, card_ids).await? {
        grouped.entry(row.card_id).or_default().push(Tag {
            id: row.tag_id,
            name: row.name,
        });
    }

    Ok(grouped)
}

pub async fn clear_card_tags<'e, E>(executor: E, card_id: i32) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM "CardTags"
            WHERE "CardID" = $1
        "#,
    )
    .bind(card_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Create whichever of `names` do not exist yet. Existing rows are left alone.
pub async fn ensure_tags<'e, E>(executor: E, names: &[String]) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO "Tags" ("Name")
            SELECT name FROM UNNEST($1::varchar[]) AS name
            ON CONFLICT ("Name") DO NOTHING
        "#,
    )
    .bind(names)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn attach_tags<'e, E>(executor: E, card_id: i32, names: &[String]) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO "CardTags" ("CardID", "TagID")
            SELECT $1, "TagID"
            FROM "Tags"
            WHERE "Name" = ANY($2)
            ON CONFLICT ("CardID", "TagID") DO NOTHING
        "#,
    )
    .bind(card_id)
    .bind(names)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Replace the card's tag set with exactly `names`.
///
/// The card row must already exist. Tags that lose their last card stay in
/// `"Tags"`.
pub async fn sync_card_tags(
    conn: &mut PgConnection,
    card_id: i32,
    names: &[String],
) -> Result<(), sqlx::Error> {
    clear_card_tags(&mut *conn, card_id).await?;
    if names.is_empty() {
        return Ok(());
    }

    ensure_tags(&mut *conn, names).await?;
    attach_tags(&mut *conn, card_id, names).await?;

    Ok(())
}
