use sqlx::{Executor, Postgres};

use crate::models::{UserCredentials, UserEmailAndName, UserProfile};

pub async fn find_profile_by_id<'e, E>(
    executor: E,
    user_id: i32,
) -> Result<Option<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, first_name, last_name, is_staff, date_joined
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_credentials_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<UserCredentials>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash, is_staff
            FROM users
            WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

pub async fn find_credentials_by_id<'e, E>(
    executor: E,
    user_id: i32,
) -> Result<Option<UserCredentials>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, password_hash, is_staff
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Account used for a password reset, looked up case-insensitively.
pub async fn find_id_and_name_by_email<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<(i32, String)>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username
            FROM users
            WHERE lower(email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn find_email_and_name<'e, E>(
    executor: E,
    user_id: i32,
) -> Result<Option<UserEmailAndName>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT email, username
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Whether another account already uses `email`. `except` skips the caller's own row.
pub async fn email_taken<'e, E>(
    executor: E,
    email: &str,
    except: Option<i32>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::int IS NULL OR id <> $2)
            )
        "#,
    )
    .bind(email)
    .bind(except)
    .fetch_one(executor)
    .await
}

pub async fn username_taken<'e, E>(executor: E, username: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)
        "#,
    )
    .bind(username)
    .fetch_one(executor)
    .await
}

pub async fn create_user<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    first_name: &str,
    password_hash: &str,
) -> Result<i32, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            INSERT INTO users (username, email, first_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(password_hash)
    .fetch_one(executor)
    .await
}

pub async fn update_profile<'e, E>(
    executor: E,
    user_id: i32,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<Option<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, is_staff, date_joined
        "#,
    )
    .bind(user_id)
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn update_password<'e, E>(
    executor: E,
    user_id: i32,
    password_hash: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn count_all<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(executor)
    .await
}
