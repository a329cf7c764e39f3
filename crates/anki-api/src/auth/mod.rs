pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod validation;

pub use middleware::{AuthUser, ensure_staff};

/// Entry point anonymous users are sent to.
pub const LOGIN_URL: &str = "/users/login/";

/// Name of the private cookie carrying the session JWT.
pub const AUTH_COOKIE: &str = "auth_token";

/// Login URL that brings the user back to `next` afterwards.
pub fn login_redirect_url(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", urlencoding::encode(next))
}

/// Accept only same-site absolute paths as a post-login target.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then(|| next.to_string())
}
