// handlers/protected/reviews.rs - reviews owned by the caller

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::{
    Collection, DeleteResult, Document, DocumentId, Filter, FindOptions, InsertOneResult,
    UpdateResult,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::Owner;

use super::prepare_new_record;

/// Field naming the review's author
pub const AUTHOR_FIELD: &str = "user_uid";

#[derive(Debug, Deserialize)]
pub struct ReviewIdQuery {
    pub id: Option<String>,
}

impl ReviewIdQuery {
    fn document_id(&self) -> Result<DocumentId, ApiError> {
        let raw = self
            .id
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Missing review id"))?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Serialize)]
pub struct MyReviews {
    pub count: u64,
    pub reviews: Vec<Document>,
}

/// Match a review by id, but only while the caller is still its author
fn authored_review(id: DocumentId, uid: String) -> Filter {
    Filter::by_id(id).eq(AUTHOR_FIELD, uid)
}

/// POST /review?uid=
pub async fn create_review(
    State(state): State<AppState>,
    Owner(uid): Owner,
    Json(review): Json<Document>,
) -> ApiResult<Json<InsertOneResult>> {
    let review = prepare_new_record(review, AUTHOR_FIELD, &uid);
    let result = state.store.insert_one(Collection::Reviews, review).await?;
    Ok(Json(result))
}

/// GET /my-review?uid=
pub async fn list_my_reviews(
    State(state): State<AppState>,
    Owner(uid): Owner,
) -> ApiResult<Json<MyReviews>> {
    let filter = Filter::all().eq(AUTHOR_FIELD, uid);
    let reviews = state
        .store
        .find(Collection::Reviews, &filter, FindOptions::newest_first())
        .await?;
    let count = state.store.count(Collection::Reviews, &filter).await?;
    Ok(Json(MyReviews { count, reviews }))
}

/// PATCH /my-review?id=&uid= - merge the body into the caller's review
pub async fn update_my_review(
    State(state): State<AppState>,
    Owner(uid): Owner,
    Query(query): Query<ReviewIdQuery>,
    Json(mut patch): Json<Document>,
) -> ApiResult<Json<UpdateResult>> {
    let id = query.document_id()?;
    // Authorship is not editable
    patch.remove(AUTHOR_FIELD);
    let result = state
        .store
        .update_one(Collection::Reviews, &authored_review(id, uid), patch)
        .await?;
    if result.matched_count == 0 {
        tracing::debug!("No review {} authored by caller to update", id);
    }
    Ok(Json(result))
}

/// DELETE /my-review?id=&uid=
pub async fn delete_my_review(
    State(state): State<AppState>,
    Owner(uid): Owner,
    Query(query): Query<ReviewIdQuery>,
) -> ApiResult<Json<DeleteResult>> {
    let id = query.document_id()?;
    let result = state
        .store
        .delete_one(Collection::Reviews, &authored_review(id, uid))
        .await?;
    Ok(Json(result))
}
