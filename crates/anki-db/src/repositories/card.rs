use anki_catalog::CatalogQuery;
use sqlx::{Executor, Postgres};

use crate::models::{AdminCardFilter, Card};

/// Card columns plus the joined category name. Expects `"Cards" c` and `"Categories" cat`.
const CARD_COLUMNS: &str = r#"
    c."CardID" AS id,
    c."Question" AS question,
    c."Answer" AS answer,
    c."CategoryID" AS category_id,
    cat."Name" AS category_name,
    c."UploadDate" AS upload_date,
    c."Views" AS views,
    c."Favorites" AS favorites,
    c."CheckStatus" AS check_status,
    c."AuthorID" AS author_id
"#;

/// Text search over question, answer and tag names, bound as `$1`.
///
/// The tag match is a semi-join, so a card with several matching tags is
/// still a single row and `LIMIT`/`OFFSET` operate on distinct cards.
const CATALOG_SEARCH: &str = r#"
    $1::text IS NULL
    OR c."Question" ILIKE $1
    OR c."Answer" ILIKE $1
    OR EXISTS (
        SELECT 1
        FROM "CardTags" ct
        JOIN "Tags" t ON t."TagID" = ct."TagID"
        WHERE ct."CardID" = c."CardID" AND t."Name" ILIKE $1
    )
"#;

/// Moderation filters: `$1` search (also over category name), `$2` category,
/// `$3` check status, `$4` contains a code fence.
const ADMIN_FILTER: &str = r#"
    (
        $1::text IS NULL
        OR c."Question" ILIKE $1
        OR c."Answer" ILIKE $1
        OR cat."Name" ILIKE $1
        OR EXISTS (
            SELECT 1
            FROM "CardTags" ct
            JOIN "Tags" t ON t."TagID" = ct."TagID"
            WHERE ct."CardID" = c."CardID" AND t."Name" ILIKE $1
        )
    )
    AND ($2::int IS NULL OR c."CategoryID" = $2)
    AND ($3::bool IS NULL OR c."CheckStatus" = $3)
    AND ($4::bool IS NULL OR (strpos(c."Answer", '```') > 0) = $4)
"#;

pub async fn count_catalog<'e, E>(executor: E, pattern: Option<&str>) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"SELECT COUNT(*) FROM "Cards" c WHERE {CATALOG_SEARCH}"#
    );

    sqlx::query_scalar(&sql)
        .bind(pattern)
        .fetch_one(executor)
        .await
}

pub async fn list_catalog<'e, E>(
    executor: E,
    query: &CatalogQuery,
    limit: i64,
    offset: i64,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    // ORDER BY comes from the SortField allow-list, never from raw input.
    let sql = format!(
        r#"
            SELECT {CARD_COLUMNS}
            FROM "Cards" c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE {CATALOG_SEARCH}
            ORDER BY {order_by}
            LIMIT $2 OFFSET $3
        "#,
        order_by = query.order_by_sql(),
    );

    sqlx::query_as(&sql)
        .bind(query.pattern())
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}

pub async fn find_by_id<'e, E>(executor: E, card_id: i32) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT {CARD_COLUMNS}
            FROM "Cards" c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE c."CardID" = $1
        "#
    );

    sqlx::query_as(&sql)
        .bind(card_id)
        .fetch_optional(executor)
        .await
}

/// Bump the view counter in place and return the fresh row.
pub async fn increment_views<'e, E>(executor: E, card_id: i32) -> Result<Option<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            WITH c AS (
                UPDATE "Cards"
                SET "Views" = "Views" + 1
                WHERE "CardID" = $1
                RETURNING *
            )
            SELECT {CARD_COLUMNS}
            FROM c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
        "#
    );

    sqlx::query_as(&sql)
        .bind(card_id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(
    executor: E,
    question: &str,
    answer: &str,
    category_id: i32,
    author_id: i32,
) -> Result<i32, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO "Cards" ("Question", "Answer", "CategoryID", "AuthorID")
            VALUES ($1, $2, $3, $4)
            RETURNING "CardID"
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category_id)
    .bind(author_id)
    .fetch_one(executor)
    .await
}

/// Returns `false` when the card does not exist.
pub async fn update<'e, E>(
    executor: E,
    card_id: i32,
    question: &str,
    answer: &str,
    category_id: i32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE "Cards"
            SET "Question" = $2, "Answer" = $3, "CategoryID" = $4
            WHERE "CardID" = $1
        "#,
    )
    .bind(card_id)
    .bind(question)
    .bind(answer)
    .bind(category_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(executor: E, card_id: i32) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM "Cards"
            WHERE "CardID" = $1
        "#,
    )
    .bind(card_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Cards carrying the given tag, newest first.
pub async fn list_by_tag<'e, E>(executor: E, tag_id: i32) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT {CARD_COLUMNS}
            FROM "Cards" c
            JOIN "CardTags" ct ON ct."CardID" = c."CardID"
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE ct."TagID" = $1
            ORDER BY c."UploadDate" DESC, c."CardID" DESC
        "#
    );

    sqlx::query_as(&sql)
        .bind(tag_id)
        .fetch_all(executor)
        .await
}

/// Cards written by one user, newest first.
pub async fn list_by_author<'e, E>(executor: E, author_id: i32) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT {CARD_COLUMNS}
            FROM "Cards" c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE c."AuthorID" = $1
            ORDER BY c."UploadDate" DESC, c."CardID" DESC
        "#
    );

    sqlx::query_as(&sql)
        .bind(author_id)
        .fetch_all(executor)
        .await
}

pub async fn count_all<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM "Cards"
        "#,
    )
    .fetch_one(executor)
    .await
}

/// Bulk moderation toggle. Returns the number of cards touched.
pub async fn set_check_status<'e, E>(
    executor: E,
    card_ids: &[i32],
    checked: bool,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE "Cards"
            SET "CheckStatus" = $2
            WHERE "CardID" = ANY($1)
        "#,
    )
    .bind(card_ids)
    .bind(checked)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_admin<'e, E>(executor: E, filter: &AdminCardFilter) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT COUNT(*)
            FROM "Cards" c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE {ADMIN_FILTER}
        "#
    );

    sqlx::query_scalar(&sql)
        .bind(filter.pattern.as_deref())
        .bind(filter.category_id)
        .bind(filter.checked)
        .bind(filter.has_code)
        .fetch_one(executor)
        .await
}

/// Moderation list, ordered by newest upload then question.
pub async fn list_admin<'e, E>(
    executor: E,
    filter: &AdminCardFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Card>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
            SELECT {CARD_COLUMNS}
            FROM "Cards" c
            LEFT JOIN "Categories" cat ON cat."CategoryID" = c."CategoryID"
            WHERE {ADMIN_FILTER}
            ORDER BY c."UploadDate" DESC, c."Question" ASC, c."CardID" DESC
            LIMIT $5 OFFSET $6
        "#
    );

    sqlx::query_as(&sql)
        .bind(filter.pattern.as_deref())
        .bind(filter.category_id)
        .bind(filter.checked)
        .bind(filter.has_code)
        .bind(limit)
        .bind(offset)
        .fetch_all(executor)
        .await
}
