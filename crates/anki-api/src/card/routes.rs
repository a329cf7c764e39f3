use anki_catalog::{
    CATALOG_PAGE_SIZE, CatalogQuery, Page, Paginator, SortField, SortOrder, parse_tag_names,
};
use anki_db::{
    models::Category,
    repositories::{card as card_repo, category as category_repo, tag as tag_repo},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    forms::{CardForm, CategoryChoice},
    view::{CardView, one_with_tags, with_tags},
};
use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    metrics::record_card_event,
    site::SiteInfo,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/cards/", get(catalog))
        .route("/cards/add/", get(add_card_form).post(add_card))
        .route("/cards/preview/", post(preview_card))
        .route("/cards/{card_id}/", get(card_detail))
        .route("/cards/{card_id}/edit/", get(edit_card_form).post(edit_card))
        .route("/cards/by-tag/{tag_id}/", get(cards_by_tag))
        .route("/cards/by-category/{slug}/", get(cards_by_category))
}

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search_query: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub site: SiteInfo,
    pub cards: Vec<CardView>,
    pub page: Page,
    pub sort: SortField,
    pub order: SortOrder,
    pub order_by: String,
    pub search_query: String,
}

async fn catalog(
    State(state): State<ApiState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let query = CatalogQuery::new(
        params.sort.as_deref(),
        params.order.as_deref(),
        params.search_query.as_deref(),
    );

    let count = card_repo::count_catalog(&state.pool, query.pattern().as_deref()).await?;
    let page = Paginator::new(count, CATALOG_PAGE_SIZE).get_page(params.page.as_deref());

    let cards = card_repo::list_catalog(&state.pool, &query, page.limit(), page.offset()).await?;
    let cards = with_tags(&state.pool, cards).await?;

    Ok(Json(CatalogResponse {
        site: SiteInfo::clone(&state.site),
        cards,
        page,
        sort: query.sort,
        order: query.order,
        order_by: query.order_by_key(),
        search_query: query.search.unwrap_or_default(),
    }))
}

#[derive(Serialize)]
pub struct CardDetailResponse {
    pub site: SiteInfo,
    pub card: CardView,
}

/// Card page. Every hit counts as one view.
async fn card_detail(
    State(state): State<ApiState>,
    WithRejection(Path(card_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Json<CardDetailResponse>, ApiError> {
    let card = card_repo::increment_views(&state.pool, card_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card"))?;
    record_card_event("view");

    let card = one_with_tags(&state.pool, card).await?;

    Ok(Json(CardDetailResponse {
        site: SiteInfo::clone(&state.site),
        card,
    }))
}

#[derive(Serialize)]
pub struct CardFormResponse {
    pub site: SiteInfo,
    pub categories: Vec<Category>,
    pub form: CardForm,
}

async fn add_card_form(
    _user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<CardFormResponse>, ApiError> {
    let categories = category_repo::list_all(&state.pool).await?;

    Ok(Json(CardFormResponse {
        site: SiteInfo::clone(&state.site),
        categories,
        form: CardForm::default(),
    }))
}

#[derive(Serialize)]
pub struct CardSavedResponse {
    pub card: CardView,
    pub redirect_to: String,
}

async fn add_card(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<CardForm>, ApiError>,
) -> Result<(StatusCode, Json<CardSavedResponse>), ApiError> {
    let clean = form.clean(&state.pool).await?;

    let mut tx = state.pool.begin().await?;
    let card_id = card_repo::insert(
        &mut *tx,
        &clean.question,
        &clean.answer,
        clean.category.id,
        user.user_id,
    )
    .await?;
    // The join rows need the card id, so tags go in after the insert.
    tag_repo::sync_card_tags(&mut tx, card_id, &clean.tag_names).await?;
    tx.commit().await?;

    tracing::info!(
        card_id,
        author_id = user.user_id,
        tags = clean.tag_names.len(),
        "Card created"
    );
    record_card_event("create");

    let card = load_card(&state, card_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CardSavedResponse {
            card,
            redirect_to: "/cards/".to_string(),
        }),
    ))
}

/// Only the author or a staff member may change a card.
async fn ensure_can_edit(
    state: &ApiState,
    user: &AuthUser,
    card_id: i32,
) -> Result<CardView, ApiError> {
    let card = load_card(state, card_id).await?;
    if card.card.author_id == Some(user.user_id) {
        return Ok(card);
    }

    match crate::auth::ensure_staff(&state.pool, user).await {
        Ok(()) => Ok(card),
        Err(ApiError::Forbidden(_)) => Err(ApiError::Forbidden(
            "You can only edit your own cards".to_string(),
        )),
        Err(e) => Err(e),
    }
}

async fn edit_card_form(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(card_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<Json<CardFormResponse>, ApiError> {
    let card = ensure_can_edit(&state, &user, card_id).await?;
    let categories = category_repo::list_all(&state.pool).await?;

    Ok(Json(CardFormResponse {
        site: SiteInfo::clone(&state.site),
        categories,
        form: CardForm {
            tags: card.tags_field(),
            question: card.card.question,
            answer: card.card.answer,
            category: card.card.category_id.map(Into::into),
        },
    }))
}

async fn edit_card(
    user: AuthUser,
    State(state): State<ApiState>,
    WithRejection(Path(card_id), _): WithRejection<Path<i32>, ApiError>,
    WithRejection(Json(form), _): WithRejection<Json<CardForm>, ApiError>,
) -> Result<Json<CardSavedResponse>, ApiError> {
    ensure_can_edit(&state, &user, card_id).await?;
    let clean = form.clean(&state.pool).await?;

    let mut tx = state.pool.begin().await?;
    let updated = card_repo::update(
        &mut *tx,
        card_id,
        &clean.question,
        &clean.answer,
        clean.category.id,
    )
    .await?;
    if !updated {
        return Err(ApiError::not_found("Card"));
    }
    tag_repo::sync_card_tags(&mut tx, card_id, &clean.tag_names).await?;
    tx.commit().await?;

    tracing::info!(card_id, editor_id = user.user_id, "Card updated");
    record_card_event("update");

    let card = load_card(&state, card_id).await?;

    Ok(Json(CardSavedResponse {
        card,
        redirect_to: format!("/cards/{card_id}/"),
    }))
}

async fn load_card(state: &ApiState, card_id: i32) -> Result<CardView, ApiError> {
    let card = card_repo::find_by_id(&state.pool, card_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card"))?;
    Ok(one_with_tags(&state.pool, card).await?)
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// Show how the card would look without saving anything. Half-filled forms
/// preview fine; validation happens on save.
async fn preview_card(
    State(state): State<ApiState>,
    WithRejection(Json(form), _): WithRejection<Json<CardForm>, ApiError>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let category = match form.category_choice() {
        CategoryChoice::Id(id) => category_repo::find_by_id(&state.pool, id)
            .await?
            .map(|c| c.name),
        CategoryChoice::Blank | CategoryChoice::Invalid => None,
    };

    Ok(Json(PreviewResponse {
        tags: parse_tag_names(&form.tags),
        question: form.question,
        answer: form.answer,
        category,
    }))
}

#[derive(Serialize)]
pub struct TagPageResponse {
    pub site: SiteInfo,
    pub tag: anki_db::models::Tag,
    pub cards_count: usize,
    pub cards: Vec<CardView>,
}

async fn cards_by_tag(
    State(state): State<ApiState>,
    WithRejection(Path(tag_id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let cache_control = format!("max-age={}", state.tag_page_cache.ttl().as_secs());

    let body = if let Some(body) = state.tag_page_cache.get(tag_id).await {
        tracing::debug!(tag_id, "Tag page served from cache");
        body
    } else {
        let tag = tag_repo::find_by_id(&state.pool, tag_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tag"))?;
        let cards = card_repo::list_by_tag(&state.pool, tag_id).await?;
        let cards = with_tags(&state.pool, cards).await?;

        let page = TagPageResponse {
            site: SiteInfo::clone(&state.site),
            tag,
            cards_count: cards.len(),
            cards,
        };
        let body: Value = serde_json::to_value(&page)
            .map_err(|e| ApiError::Other(anyhow::anyhow!("failed to render tag page: {e}")))?;
        state.tag_page_cache.insert(tag_id, body.clone()).await;
        body
    };

    Ok(([(header::CACHE_CONTROL, cache_control)], Json(body)))
}

async fn cards_by_category(Path(slug): Path<String>) -> String {
    format!("Cards by category {slug}")
}
