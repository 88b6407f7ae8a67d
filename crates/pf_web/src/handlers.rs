use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use pf_core::{
    storage::page_size, Error, ProcessedArticle, ProcessingResult, Profile, ScanResult, UserId,
    DEFAULT_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

const DEFAULT_THREAD_LIMIT: usize = 20;

#[derive(Deserialize)]
pub struct SaveProfileRequest {
    user_id: UserId,
    interests_description: String,
}

#[derive(Deserialize)]
pub struct ScanRequest {
    blog_url: String,
    user_id: UserId,
}

#[derive(Deserialize)]
pub struct ThreadRequest {
    url: String,
    user_id: UserId,
}

#[derive(Deserialize)]
pub struct PageQuery {
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub url: String,
    pub title: Option<String>,
    pub source_blog: Option<String>,
    pub fits_profile: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl From<ProcessedArticle> for ArticleView {
    fn from(article: ProcessedArticle) -> Self {
        Self {
            url: article.url,
            title: article.title,
            source_blog: article.source_blog,
            fits_profile: article.fits_profile,
            created_at: article.created_at,
        }
    }
}

fn require_http_url(url: &str) -> Result<(), ApiError> {
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(Error::InvalidUrl(format!("{}: only http(s) is supported", url)).into()),
        Err(e) => Err(Error::InvalidUrl(format!("{}: {}", url, e)).into()),
    }
}

pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveProfileRequest>,
) -> ApiResult<Profile> {
    if body.interests_description.trim().is_empty() {
        return Err(Error::Configuration("interests_description must not be empty".to_string()).into());
    }
    let profile = state
        .profiles
        .save_profile(body.user_id, &body.interests_description)
        .await?;
    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Profile> {
    state
        .profiles
        .get_profile(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No profile for user {}", user_id)))
}

pub async fn scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanRequest>,
) -> ApiResult<ScanResult> {
    require_http_url(&body.blog_url)?;
    tracing::info!(user_id = body.user_id, blog_url = %body.blog_url, "scan requested");
    let result = state.orchestrator.scan(&body.blog_url, body.user_id).await?;
    Ok(Json(result))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<ArticleView>> {
    let limit = page_size(page.limit.unwrap_or(DEFAULT_PAGE_SIZE));
    let articles = state
        .articles
        .list_by_user(user_id, limit, page.offset.unwrap_or(0))
        .await?;
    Ok(Json(articles.into_iter().map(ArticleView::from).collect()))
}

pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ThreadRequest>,
) -> ApiResult<ProcessingResult> {
    require_http_url(&body.url)?;
    let result = state.threads.generate(&body.url, body.user_id).await?;
    Ok(Json(result))
}

pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<ProcessingResult>> {
    let limit = page_size(page.limit.unwrap_or(DEFAULT_THREAD_LIMIT));
    Ok(Json(state.results.list_results(user_id, limit).await?))
}
