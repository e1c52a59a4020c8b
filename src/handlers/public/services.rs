// handlers/public/services.rs - anonymous service listing and lookup

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::AppState;
use crate::database::{Collection, Document, DocumentId, Filter, FindOptions};
use crate::error::ApiResult;
use crate::handlers::pagination::{ListMode, Listing, PageQuery};

/// GET /services?limit= | ?page=&size=
///
/// With `limit` the response is a bare array of the newest services. Otherwise
/// it is `{count, result}` where `count` is the estimated collection size.
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Response> {
    match query.mode()? {
        ListMode::Limit(limit) => {
            let result = state
                .store
                .find(Collection::Services, &Filter::all(), FindOptions::newest_first().limit(limit))
                .await?;
            Ok(Json(result).into_response())
        }
        ListMode::Page(page) => {
            let count = state.store.estimated_count(Collection::Services).await?;
            let result = state
                .store
                .find(Collection::Services, &Filter::all(), page.find_options())
                .await?;
            Ok(Json(Listing { count, result }).into_response())
        }
    }
}

/// GET /service/:id - one service, or `null` when absent
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Document>>> {
    let id: DocumentId = id.parse()?;
    let service = state
        .store
        .find_one(Collection::Services, &Filter::by_id(id))
        .await?;
    Ok(Json(service))
}
