use anki_catalog::{
    ADMIN_PAGE_SIZE, Page, Paginator,
    display::{BriefInfo, NO_CATEGORY, brief_info, plain_question, tag_list},
    search_pattern,
};
use anki_db::{
    models::{AdminCardFilter, Category, TagUsage},
    repositories::{card as card_repo, category as category_repo, tag as tag_repo},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ApiState,
    auth::{AuthUser, ensure_staff},
    card::view::{CardView, with_tags},
    error::{ApiError, FormErrors},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/admin/cards/", get(list_cards))
        .route("/admin/cards/check/", post(set_check_status))
        .route("/admin/cards/{card_id}/", delete(delete_card))
        .route("/admin/categories/", post(create_category))
        .route("/admin/categories/{category_id}/", delete(delete_category))
        .route("/admin/tags/", get(list_tags))
        .route("/admin/tags/{tag_id}/", delete(delete_tag))
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminListParams {
    pub search_query: Option<String>,
    pub category: Option<i32>,
    /// `checked` or `unchecked`.
    pub check_status: Option<String>,
    /// `yes` or `no`.
    pub has_code: Option<String>,
    pub page: Option<String>,
}

impl AdminListParams {
    /// Unknown filter values are ignored rather than rejected.
    pub fn filter(&self) -> AdminCardFilter {
        AdminCardFilter {
            pattern: self
                .search_query
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(search_pattern),
            category_id: self.category,
            checked: match self.check_status.as_deref() {
                Some("checked") => Some(true),
                Some("unchecked") => Some(false),
                _ => None,
            },
            has_code: match self.has_code.as_deref() {
                Some("yes") => Some(true),
                Some("no") => Some(false),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminCardRow {
    #[serde(flatten)]
    pub card: CardView,
    pub plain_question: String,
    pub category_label: String,
    pub tag_list: String,
    pub brief_info: BriefInfo,
}

impl From<CardView> for AdminCardRow {
    fn from(card: CardView) -> Self {
        Self {
            plain_question: plain_question(&card.card.question),
            category_label: card
                .card
                .category_name
                .clone()
                .unwrap_or_else(|| NO_CATEGORY.to_string()),
            tag_list: tag_list(card.tags.iter().map(|t| t.name.as_str())),
            brief_info: brief_info(&card.card.answer),
            card,
        }
    }
}

#[derive(Serialize)]
pub struct AdminListResponse {
    pub cards: Vec<AdminCardRow>,
    pub page: Page,
}

async fn list_cards(
    user: AuthUser,
    State(state): State<ApiState>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<AdminListResponse>, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    let filter = params.filter();
    let count = card_repo::count_admin(&state.pool, &filter).await?;
    let page = Paginator::new(count, ADMIN_PAGE_SIZE).get_page(params.page.as_deref());

    let cards = card_repo::list_admin(&state.pool, &filter, page.limit(), page.offset()).await?;
    let cards = with_tags(&state.pool, cards)
        .await?
        .into_iter()
        .map(AdminCardRow::from)
        .collect();

    Ok(Json(AdminListResponse { cards, page }))
}

#[derive(Debug, Deserialize)]
pub struct CheckStatusRequest {
    pub ids: Vec<i32>,
    pub checked: bool,
}

async fn set_check_status(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Json(body), _): WithRejection<Json<CheckStatusRequest>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    let updated = card_repo::set_check_status(&state.pool, &body.ids, body.checked).await?;
    tracing::info!(
        moderator_id = user.user_id,
        updated,
        checked = body.checked,
        "Check status changed"
    );

    let label = if body.checked { "checked" } else { "unchecked" };
    Ok(Json(json!({
        "updated": updated,
        "message": format!("{updated} card(s) marked as {label}"),
    })))
}

async fn delete_card(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(card_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    if !card_repo::delete(&state.pool, card_id).await? {
        return Err(ApiError::not_found("Card"));
    }
    tracing::info!(card_id, moderator_id = user.user_id, "Card deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

async fn create_category(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<CategoryForm>, ApiError>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    ensure_staff(&state.pool, &user).await?;

    let name = form.name.trim();
    let mut errors = FormErrors::new();
    if name.is_empty() {
        errors.add("name", "This field is required.");
    } else if name.chars().count() > 100 {
        errors.add("name", "Ensure this value has at most 100 characters.");
    }
    errors.finish(&form)?;

    let Some(category) = category_repo::insert(&state.pool, name).await? else {
        let mut errors = FormErrors::new();
        errors.add("name", "Category with this name already exists.");
        return Err(errors.into_error(&form));
    };

    tracing::info!(category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(category_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    if !category_repo::delete(&state.pool, category_id).await? {
        return Err(ApiError::not_found("Category"));
    }
    tracing::info!(category_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    pub search_query: Option<String>,
    /// `yes` lists only tags no card carries any more.
    pub unused: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct TagListResponse {
    pub tags: Vec<TagUsage>,
    pub page: Page,
}

/// Tag maintenance. Card edits never delete tags, so tags without cards
/// pile up here until a moderator removes them.
async fn list_tags(
    user: AuthUser,
    State(state): State<ApiState>,
    Query(params): Query<TagListParams>,
) -> Result<Json<TagListResponse>, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    let pattern = params
        .search_query
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(search_pattern);
    let unused_only = params.unused.as_deref() == Some("yes");

    let count = tag_repo::count_usage(&state.pool, pattern.as_deref(), unused_only).await?;
    let page = Paginator::new(count, ADMIN_PAGE_SIZE).get_page(params.page.as_deref());
    let tags = tag_repo::list_usage(
        &state.pool,
        pattern.as_deref(),
        unused_only,
        page.limit(),
        page.offset(),
    )
    .await?;

    Ok(Json(TagListResponse { tags, page }))
}

async fn delete_tag(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(tag_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    ensure_staff(&state.pool, &user).await?;

    if !tag_repo::delete(&state.pool, tag_id).await? {
        return Err(ApiError::not_found("Tag"));
    }
    state.tag_page_cache.invalidate(tag_id).await;
    tracing::info!(tag_id, moderator_id = user.user_id, "Tag deleted");

    Ok(StatusCode::NO_CONTENT)
}
