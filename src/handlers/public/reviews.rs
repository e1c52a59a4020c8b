// handlers/public/reviews.rs - review listing with average rating

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::{Collection, Document, Filter, FindOptions};
use crate::error::ApiResult;
use crate::handlers::pagination::{average_rating, PageQuery};

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub service_id: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewListing {
    pub count: u64,
    pub reviews: Vec<Document>,
    pub average: f64,
}

/// GET /reviews?service_id=&page=&size=
///
/// `count` and `average` cover every review of the service, `reviews` only the
/// requested page. Without `service_id` all reviews are considered.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> ApiResult<Json<ReviewListing>> {
    let page = PageQuery {
        limit: None,
        page: query.page,
        size: query.size,
    }
    .page()?;

    let filter = match query.service_id {
        Some(service_id) => Filter::all().eq("service_id", service_id),
        None => Filter::all(),
    };

    let reviews = state
        .store
        .find(Collection::Reviews, &filter, page.find_options())
        .await?;
    let rated = state
        .store
        .find(Collection::Reviews, &filter, FindOptions::default())
        .await?;
    let count = state.store.count(Collection::Reviews, &filter).await?;

    Ok(Json(ReviewListing {
        count,
        average: average_rating(&rated, count),
        reviews,
    }))
}
