//! Budget post API endpoint
//!
//! - GET /api/budget-posts - Every budget post, oldest first
//! - GET /api/budget-posts/{id} - A single budget post
//!
//! Both endpoints are read-only; query string and body are ignored.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState};
use crate::models::BudgetPost;
use crate::services::RecordServiceError;

/// Public JSON shape of a budget post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPostResponse {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub content: String,
    pub author: String,
    /// `YYYY-MM-DD`
    pub date_posted: String,
}

impl From<BudgetPost> for BudgetPostResponse {
    fn from(post: BudgetPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            image_url: post.image_url,
            content: post.content,
            author: post.author,
            date_posted: post.date_posted.format("%Y-%m-%d").to_string(),
        }
    }
}

/// GET /api/budget-posts
pub async fn list_budget_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<BudgetPostResponse>>, ApiError> {
    let posts = state.budget_posts.list_all().await?;
    Ok(Json(posts.into_iter().map(BudgetPostResponse::from).collect()))
}

/// GET /api/budget-posts/{id}
///
/// An id that is not an integer cannot name a post, so it is a 404 as well.
pub async fn get_budget_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BudgetPostResponse>, ApiError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| ApiError::not_found("Post not found"))?;

    match state.budget_posts.get_by_id(id).await {
        Ok(post) => Ok(Json(BudgetPostResponse::from(post))),
        Err(RecordServiceError::NotFound(_)) => Err(ApiError::not_found("Post not found")),
        Err(e) => Err(e.into()),
    }
}
