use sqlx::{Executor, Postgres};

use crate::models::Category;

pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Category>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT "CategoryID" AS id, "Name" AS name
            FROM "Categories"
            ORDER BY "Name"
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, category_id: i32) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT "CategoryID" AS id, "Name" AS name
            FROM "Categories"
            WHERE "CategoryID" = $1
        "#,
    )
    .bind(category_id)
    .fetch_optional(executor)
    .await
}

/// Returns `None` when the name is already taken.
pub async fn insert<'e, E>(executor: E, name: &str) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO "Categories" ("Name")
            VALUES ($1)
            ON CONFLICT ("Name") DO NOTHING
            RETURNING "CategoryID" AS id, "Name" AS name
        "#,
    )
    .bind(name)
    .fetch_optional(executor)
    .await
}

/// Cards of a deleted category keep existing with a null category.
pub async fn delete<'e, E>(executor: E, category_id: i32) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM "Categories"
            WHERE "CategoryID" = $1
        "#,
    )
    .bind(category_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
