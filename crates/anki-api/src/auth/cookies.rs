use axum_extra::extract::cookie::{Cookie, SameSite};

use super::AUTH_COOKIE;
use crate::config::Environment;

/// Create an auth cookie with the JWT token
///
/// Cookies are secure (HTTPS-only) in production.
/// In development mode, cookies can be used over HTTP.
pub fn create_auth_cookie(
    token: String,
    environment: &Environment,
    expiry_hours: i64,
) -> Cookie<'static> {
    let is_development = environment.is_development();

    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .max_age(time::Duration::hours(expiry_hours))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!is_development)
        .build()
}

/// Cookie that, once passed to `PrivateCookieJar::remove`, clears the session.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE).path("/").build()
}
