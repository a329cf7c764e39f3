use anki_db::{
    models::UserProfile,
    repositories::{card as card_repo, user as user_repo},
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::{PrivateCookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    email::EmailService,
    forms::{
        LoginForm, PasswordChangeForm, PasswordResetConfirmForm, PasswordResetForm, ProfileForm,
        SignupForm,
    },
    password_reset,
};
use crate::{
    ApiState,
    auth::{
        AuthUser, LOGIN_URL,
        cookies::{create_auth_cookie, removal_cookie},
        jwt::generate_jwt_token,
        safe_next,
        validation::validate_email,
    },
    card::view::{CardView, with_tags},
    error::{ApiError, FormErrors, NON_FIELD_ERRORS},
    metrics::{record_auth_event, record_email_event},
    middleware::rate_limit,
    site::SiteInfo,
};

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    // Endpoints that check or set a password
    let credential_routes = Router::new()
        .route("/users/login/", get(login_page).post(login))
        .route("/users/signup/", post(signup))
        .route("/users/password_change/", post(change_password))
        .route("/users/password_reset/confirm/", post(confirm_password_reset))
        .layer(make_rate_limit_layer!(
            rate_limit::AUTH_REPLENISH_SECONDS,
            rate_limit::AUTH_BURST_SIZE
        ));

    // Sends mail, so it gets the tightest budget
    let reset_routes = Router::new()
        .route("/users/password_reset/", post(request_password_reset))
        .layer(make_rate_limit_layer!(
            rate_limit::RESET_REPLENISH_SECONDS,
            rate_limit::RESET_BURST_SIZE
        ));

    let account_routes = Router::new()
        .route("/users/logout/", get(logout).post(logout))
        .route("/users/register_done/", get(register_done))
        .route("/users/profile/", get(profile).post(update_profile))
        .route("/users/profile_cards/", get(profile_cards))
        .route("/users/password_change_done/", get(password_change_done));

    Router::new()
        .merge(credential_routes)
        .merge(reset_routes)
        .merge(account_routes)
}

/// bcrypt is CPU bound; keep it off the async workers.
async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Other(anyhow::anyhow!("password hashing task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Other(anyhow::anyhow!("password check task failed: {e}")))?
        .map_err(ApiError::from)
}

/// SMTP delivery is blocking; mails go out on the blocking pool without holding the response.
fn send_in_background<F>(service: &EmailService, email_type: &'static str, send: F)
where
    F: FnOnce(&EmailService) -> Result<(), ApiError> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || {
        let result = send(&service);
        if let Err(e) = &result {
            tracing::error!(email_type, "Failed to send email: {e}");
        }
        record_email_event(email_type, result.is_ok());
    });
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub next: Option<String>,
}

#[derive(Serialize)]
pub struct LoginPageResponse {
    pub site: SiteInfo,
    pub title: &'static str,
    pub next: String,
}

async fn login_page(
    State(state): State<ApiState>,
    Query(params): Query<LoginParams>,
) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        site: SiteInfo::clone(&state.site),
        title: "Sign in",
        next: safe_next(params.next.as_deref()).unwrap_or_else(|| "/".to_string()),
    })
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i32,
    pub username: String,
    pub redirect_to: String,
}

async fn login(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    WithRejection(Json(form), _): WithRejection<Json<LoginForm>, ApiError>,
) -> Result<(PrivateCookieJar, Json<LoginResponse>), ApiError> {
    let username = form.username.trim();

    let credentials = if username.is_empty() || form.password.is_empty() {
        None
    } else {
        user_repo::find_credentials_by_username(&state.pool, username).await?
    };

    let verified = match credentials {
        Some(user) => verify_password(form.password.clone(), user.password_hash.clone())
            .await?
            .then_some(user),
        None => None,
    };

    let Some(user) = verified else {
        tracing::info!(username, "Login failed");
        record_auth_event("login", false);

        let mut errors = FormErrors::new();
        errors.add(NON_FIELD_ERRORS, BAD_CREDENTIALS);
        return Err(errors.into_error(&form.echo()));
    };

    let token = generate_jwt_token(
        user.id,
        user.username.clone(),
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;
    let jar = jar.add(create_auth_cookie(
        token,
        &state.environment,
        state.jwt_expiry_hours,
    ));

    tracing::info!(user_id = user.id, "User logged in");
    record_auth_event("login", true);

    Ok((
        jar,
        Json(LoginResponse {
            id: user.id,
            username: user.username,
            redirect_to: safe_next(form.next.as_deref()).unwrap_or_else(|| "/".to_string()),
        }),
    ))
}

async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    if jar.get(crate::auth::AUTH_COOKIE).is_some() {
        record_auth_event("logout", true);
    }
    (jar.remove(removal_cookie()), Redirect::to(LOGIN_URL))
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: i32,
    pub username: String,
    pub redirect_to: String,
}

async fn signup(
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<SignupForm>, ApiError>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let clean = match form.clean(&state.pool).await {
        Ok(clean) => clean,
        Err(e) => {
            record_auth_event("signup", false);
            return Err(e);
        }
    };

    let password_hash = hash_password(clean.password, state.bcrypt_cost).await?;

    let user_id = user_repo::create_user(
        &state.pool,
        &clean.username,
        &clean.email,
        &clean.first_name,
        &password_hash,
    )
    .await?;

    tracing::info!(user_id, "User registered");
    record_auth_event("signup", true);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user_id,
            username: clean.username,
            redirect_to: "/users/register_done/".to_string(),
        }),
    ))
}

#[derive(Serialize)]
pub struct NoticeResponse {
    pub site: SiteInfo,
    pub title: &'static str,
    pub message: &'static str,
}

async fn register_done(State(state): State<ApiState>) -> Json<NoticeResponse> {
    Json(NoticeResponse {
        site: SiteInfo::clone(&state.site),
        title: "Registration complete",
        message: "Your account has been created. You can sign in now.",
    })
}

async fn password_change_done(
    _user: AuthUser,
    State(state): State<ApiState>,
) -> Json<NoticeResponse> {
    Json(NoticeResponse {
        site: SiteInfo::clone(&state.site),
        title: "Password changed",
        message: "Your password was changed.",
    })
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub site: SiteInfo,
    pub user: UserProfile,
}

async fn profile(
    user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = user_repo::find_profile_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(ProfileResponse {
        site: SiteInfo::clone(&state.site),
        user: profile,
    }))
}

async fn update_profile(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<ProfileForm>, ApiError>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let clean = form.clean(&state.pool, user.user_id).await?;

    let profile = user_repo::update_profile(
        &state.pool,
        user.user_id,
        &clean.first_name,
        &clean.last_name,
        &clean.email,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = user.user_id, "Profile updated");

    Ok(Json(ProfileResponse {
        site: SiteInfo::clone(&state.site),
        user: profile,
    }))
}

#[derive(Serialize)]
pub struct ProfileCardsResponse {
    pub site: SiteInfo,
    pub cards: Vec<CardView>,
}

async fn profile_cards(
    user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<ProfileCardsResponse>, ApiError> {
    let cards = card_repo::list_by_author(&state.pool, user.user_id).await?;
    let cards = with_tags(&state.pool, cards).await?;

    Ok(Json(ProfileCardsResponse {
        site: SiteInfo::clone(&state.site),
        cards,
    }))
}

async fn change_password(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<PasswordChangeForm>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut errors = FormErrors::new();
    form.check_fields(&mut errors);

    let credentials = user_repo::find_credentials_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("Account no longer exists".to_string()))?;

    if !errors.has("old_password")
        && !verify_password(form.old_password.clone(), credentials.password_hash).await?
    {
        errors.add(
            "old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        );
    }

    if let Err(e) = errors.finish(&json!({})) {
        record_auth_event("password_change", false);
        return Err(e);
    }

    let password_hash = hash_password(form.new_password1, state.bcrypt_cost).await?;
    user_repo::update_password(&state.pool, user.user_id, &password_hash).await?;

    tracing::info!(user_id = user.user_id, "Password changed");
    record_auth_event("password_change", true);

    if let Some(service) = &state.email_service {
        let (email, username) = (credentials.email, credentials.username);
        if !email.is_empty() {
            send_in_background(service, "password_changed", move |s| {
                s.send_password_changed_email(&email, &username)
            });
        }
    }

    Ok(Json(json!({
        "message": "Password changed successfully",
        "redirect_to": "/users/password_change_done/",
    })))
}

/// Same answer whether or not the address belongs to an account.
async fn request_password_reset(
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<PasswordResetForm>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = form.email.trim();

    let mut errors = FormErrors::new();
    if let Err(e) = validate_email(email) {
        errors.add("email", e.user_message());
    }
    errors.finish(&form)?;

    if let Some((user_id, username)) =
        user_repo::find_id_and_name_by_email(&state.pool, email).await?
    {
        match &state.email_service {
            Some(service) => {
                let token = password_reset::create_reset_token(
                    &state.pool,
                    user_id,
                    state.password_reset_expiry_hours,
                )
                .await?;
                let email = email.to_string();
                send_in_background(service, "password_reset", move |s| {
                    s.send_password_reset_email(&email, &username, &token)
                });
                tracing::info!(user_id, "Password reset requested");
            }
            None => {
                tracing::warn!(user_id, "Password reset requested but email is not configured");
            }
        }
    }

    record_auth_event("password_reset_request", true);

    Ok(Json(json!({
        "message": "If an account exists for that email, a password reset link has been sent."
    })))
}

async fn confirm_password_reset(
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<PasswordResetConfirmForm>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut errors = FormErrors::new();
    form.check_fields(&mut errors);
    errors.finish(&json!({}))?;

    let password_hash = hash_password(form.new_password1, state.bcrypt_cost).await?;

    let (email, username) =
        match password_reset::verify_and_reset_password(&state.pool, form.token.trim(), &password_hash)
            .await
        {
            Ok(user) => user,
            Err(ApiError::Validation(msg)) => {
                record_auth_event("password_reset", false);
                let mut errors = FormErrors::new();
                errors.add("token", msg);
                return Err(errors.into_error(&json!({})));
            }
            Err(e) => return Err(e),
        };

    tracing::info!(username = %username, "Password reset completed");
    record_auth_event("password_reset", true);

    if let Some(service) = &state.email_service
        && !email.is_empty()
    {
        send_in_background(service, "password_changed", move |s| {
            s.send_password_changed_email(&email, &username)
        });
    }

    Ok(Json(json!({
        "message": "Your password has been set. You may sign in now.",
        "redirect_to": LOGIN_URL,
    })))
}
