use anki_db::{
    models::Category,
    repositories::{card as card_repo, category as category_repo, user as user_repo},
};
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use super::SiteInfo;
use crate::{ApiState, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(index))
        .route("/about/", get(about))
        .route("/categories/", get(list_categories))
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub site: SiteInfo,
    pub cards_count: i64,
    pub users_count: i64,
}

async fn index(State(state): State<ApiState>) -> Result<Json<IndexResponse>, ApiError> {
    let cards_count = card_repo::count_all(&state.pool).await?;
    let users_count = user_repo::count_all(&state.pool).await?;

    Ok(Json(IndexResponse {
        site: SiteInfo::clone(&state.site),
        cards_count,
        users_count,
    }))
}

#[derive(Serialize)]
pub struct AboutResponse {
    pub site: SiteInfo,
}

async fn about(State(state): State<ApiState>) -> Json<AboutResponse> {
    Json(AboutResponse {
        site: SiteInfo::clone(&state.site),
    })
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub site: SiteInfo,
    pub categories: Vec<Category>,
}

async fn list_categories(
    State(state): State<ApiState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = category_repo::list_all(&state.pool).await?;

    Ok(Json(CategoriesResponse {
        site: SiteInfo::clone(&state.site),
        categories,
    }))
}
