// handlers/protected/login.rs - POST /login handler

use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::database::{Collection, Document, InsertOneResult};
use crate::error::ApiResult;
use crate::middleware::AuthUser;

/// POST /login - record the signed-in user's profile
pub async fn login(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(user): Json<Document>,
) -> ApiResult<Json<InsertOneResult>> {
    tracing::info!("Login recorded for {}", auth_user.uid);
    let result = state.store.insert_one(Collection::Users, user).await?;
    Ok(Json(result))
}
