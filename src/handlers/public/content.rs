// handlers/public/content.rs - read-only informational content

use axum::{extract::State, Json};

use crate::app::AppState;
use crate::database::{Collection, Document, Filter, FindOptions};
use crate::error::ApiResult;

const TESTIMONIAL_COUNT: u64 = 4;

/// GET /testimonials - the latest reviews
pub async fn list_testimonials(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let result = state
        .store
        .find(
            Collection::Reviews,
            &Filter::all(),
            FindOptions::newest_first().limit(TESTIMONIAL_COUNT),
        )
        .await?;
    Ok(Json(result))
}

/// GET /blogs
pub async fn list_blogs(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let result = state
        .store
        .find(Collection::Blogs, &Filter::all(), FindOptions::default())
        .await?;
    Ok(Json(result))
}
