//! Single-use password reset tokens.
//!
//! The client receives 32 random bytes hex-encoded; the database only ever
//! sees their SHA-256, so a leaked table cannot be replayed.

use anki_db::repositories::{token as token_repo, user as user_repo};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::error::ApiError;

const TOKEN_BYTES: usize = 32;

fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Fresh token and the digest stored for it.
fn new_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let digest = token_digest(&token);
    (token, digest)
}

/// Issue a reset token for `user_id`, revoking any older unused ones.
/// Returns the plain token to put in the reset link.
pub async fn create_reset_token(
    pool: &PgPool,
    user_id: i32,
    expires_in_hours: i64,
) -> Result<String, ApiError> {
    let (token, digest) = new_token();
    let expires_at = Utc::now() + Duration::hours(expires_in_hours);

    let mut tx = pool.begin().await?;
    token_repo::invalidate_reset_tokens(&mut *tx, user_id).await?;
    token_repo::insert_reset_token(&mut *tx, user_id, &digest, expires_at).await?;
    tx.commit().await?;

    Ok(token)
}

/// Consume `token` and store the new password hash in one transaction.
/// Returns the account's `(email, username)` for the confirmation mail.
pub async fn verify_and_reset_password(
    pool: &PgPool,
    token: &str,
    new_password_hash: &str,
) -> Result<(String, String), ApiError> {
    let mut tx = pool.begin().await?;

    let user_id = token_repo::consume_reset_token(&mut *tx, &token_digest(token))
        .await?
        .ok_or_else(|| ApiError::Validation("Invalid or expired reset token".to_string()))?;

    user_repo::update_password(&mut *tx, user_id, new_password_hash).await?;

    let user = user_repo::find_email_and_name(&mut *tx, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tx.commit().await?;

    Ok((user.email, user.username))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_random_hex_with_matching_digest() {
        let (a, digest_a) = new_token();
        let (b, _) = new_token();

        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert_eq!(digest_a, token_digest(&a));
        assert_ne!(digest_a, a);
    }

    #[test]
    fn test_digest_fits_the_token_column() {
        assert_eq!(token_digest("abc").len(), 64);
    }
}
