// handlers/protected/services.rs - owner-scoped service operations

use axum::{extract::State, Json};

use crate::app::AppState;
use crate::database::{Collection, Document, Filter, FindOptions, InsertOneResult};
use crate::error::ApiResult;
use crate::handlers::pagination::Listing;
use crate::middleware::Owner;

use super::prepare_new_record;

/// Field naming the service's creator
pub const CREATOR_FIELD: &str = "createBy";

/// GET /my-service?uid= - services created by the caller
pub async fn list_my_services(
    State(state): State<AppState>,
    Owner(uid): Owner,
) -> ApiResult<Json<Listing>> {
    let filter = Filter::all().eq(CREATOR_FIELD, uid);
    let result = state
        .store
        .find(Collection::Services, &filter, FindOptions::newest_first())
        .await?;
    let count = state.store.count(Collection::Services, &filter).await?;
    Ok(Json(Listing { count, result }))
}

/// POST /services?uid= and POST /add-service?uid=
pub async fn create_service(
    State(state): State<AppState>,
    Owner(uid): Owner,
    Json(service): Json<Document>,
) -> ApiResult<Json<InsertOneResult>> {
    let service = prepare_new_record(service, CREATOR_FIELD, &uid);
    let result = state.store.insert_one(Collection::Services, service).await?;
    tracing::info!("Service created by {}", uid);
    Ok(Json(result))
}
