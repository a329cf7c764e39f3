use anki_db::repositories::user as user_repo;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use sqlx::PgPool;

use super::{AUTH_COOKIE, jwt::verify_jwt_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated user extractor
///
/// Use this in route handlers that require a logged-in user. The JWT is read
/// from the private `auth_token` cookie. Anonymous or expired sessions are
/// rejected with a redirect to the login page that remembers the requested
/// location.
///
/// # Example
/// ```
/// use axum::extract::State;
/// use anki_api::{error::ApiError, auth::AuthUser, ApiState};
///
/// async fn protected_route(
///     auth_user: AuthUser,
///     State(state): State<ApiState>,
/// ) -> Result<(), ApiError> {
///     // auth_user.user_id and auth_user.username are available
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    Key: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
        let login_required = || ApiError::LoginRequired { next: next.clone() };

        let auth_config = AuthConfig::from_ref(state);

        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|_| login_required())?;

        let token = jar
            .get(AUTH_COOKIE)
            .ok_or_else(login_required)?
            .value()
            .to_owned();

        let claims = verify_jwt_token(&token, &auth_config.jwt_secret).map_err(|_| {
            tracing::debug!("Rejected expired or tampered session token");
            login_required()
        })?;

        let user_id = claims.sub.parse::<i32>().map_err(|_| login_required())?;

        Ok(Self {
            user_id,
            username: claims.username,
        })
    }
}

/// Guard for moderator-only handlers. Staff status is read fresh from the database.
pub async fn ensure_staff(pool: &PgPool, user: &AuthUser) -> Result<(), ApiError> {
    let profile = user_repo::find_profile_by_id(pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("Account no longer exists".to_string()))?;

    if !profile.is_staff {
        return Err(ApiError::Forbidden(
            "Staff permissions are required".to_string(),
        ));
    }

    Ok(())
}
