use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use super::auth::AuthUser;
use crate::error::ApiError;

/// Reject unless the verified identity equals the identity the caller claims
pub fn authorize_owner(auth_user: &AuthUser, claimed_uid: Option<&str>) -> Result<(), ApiError> {
    match claimed_uid {
        Some(uid) if uid == auth_user.uid => Ok(()),
        claimed => {
            tracing::warn!(
                "Ownership check failed: token uid '{}' claimed '{}'",
                auth_user.uid,
                claimed.unwrap_or("<none>")
            );
            Err(ApiError::forbidden("Access Forbidden"))
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwnerQuery {
    uid: Option<String>,
}

/// Identity of a caller proven to own the `?uid=` scope of the request.
///
/// Requires `jwt_auth_middleware` on the route. Runs before any body extractor.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized Access"))?;

        let Query(query) = Query::<OwnerQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        authorize_owner(&auth_user, query.uid.as_deref())?;
        Ok(Owner(auth_user.uid))
    }
}
