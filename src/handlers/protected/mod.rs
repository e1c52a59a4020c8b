// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`. Handlers scoped to a
// single user take the `Owner` extractor, which rejects a `?uid=` that does
// not match the token before the request body is read.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::database::{Document, CREATED_AT_FIELD};

pub mod login;
pub mod reviews;
pub mod services;

pub use login::login;
pub use reviews::{create_review, delete_my_review, list_my_reviews, update_my_review};
pub use services::{create_service, list_my_services};

/// Stamp `createAt` when absent and pin the owner field to the verified caller
fn prepare_new_record(mut doc: Document, owner_field: &str, owner: &str) -> Document {
    doc.entry(CREATED_AT_FIELD)
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)));
    if let Some(claimed) = doc.insert(owner_field.to_string(), Value::String(owner.to_string())) {
        if claimed.as_str() != Some(owner) {
            tracing::warn!("Replaced {} {} with caller {}", owner_field, claimed, owner);
        }
    }
    doc
}
