// handlers/public/token.rs - POST /jwt handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::database::Document;
use crate::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /jwt - sign the posted identity claims (must include `uid`)
pub async fn issue_token(
    State(state): State<AppState>,
    Json(identity): Json<Document>,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.tokens.issue(identity)?;
    Ok(Json(TokenResponse { token }))
}
