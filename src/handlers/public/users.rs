// handlers/public/users.rs - user directory with insert-if-absent creation

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::IDENTITY_CLAIM;
use crate::database::{Collection, Document, Filter, FindOptions, InsertOneResult};
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct UserCreated {
    #[serde(flatten)]
    pub result: InsertOneResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<Document>>> {
    let result = state
        .store
        .find(Collection::Users, &Filter::all(), FindOptions::default())
        .await?;
    Ok(Json(result))
}

/// POST /users - insert unless a user with the same `uid` is already stored
pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<Document>,
) -> ApiResult<Json<UserCreated>> {
    if let Some(uid) = user.get(IDENTITY_CLAIM).filter(|v| !v.is_null()) {
        let existing = state
            .store
            .find_one(Collection::Users, &Filter::all().eq(IDENTITY_CLAIM, uid.clone()))
            .await?;

        if existing.is_some() {
            tracing::debug!(uid = %uid, "User already registered");
            return Ok(Json(UserCreated {
                result: InsertOneResult {
                    acknowledged: true,
                    inserted_id: None,
                },
                message: Some("User already exists"),
            }));
        }
    }

    let result = state.store.insert_one(Collection::Users, user).await?;
    Ok(Json(UserCreated {
        result,
        message: None,
    }))
}
