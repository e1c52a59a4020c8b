use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::database::DocumentStore;
use crate::error::{ApiError, ApiResult};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let guard = middleware::from_fn_with_state(state.clone(), jwt_auth_middleware);

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/jwt", post(public::issue_token))
        .route(
            "/services",
            get(public::list_services)
                .merge(post(protected::create_service).route_layer(guard.clone())),
        )
        .route("/service/:id", get(public::get_service))
        .route("/reviews", get(public::list_reviews))
        .route("/testimonials", get(public::list_testimonials))
        .route("/blogs", get(public::list_blogs))
        .route("/users", get(public::list_users).post(public::create_user))
        // Protected
        .route("/login", post(protected::login).route_layer(guard.clone()))
        .route(
            "/my-service",
            get(protected::list_my_services).route_layer(guard.clone()),
        )
        .route(
            "/add-service",
            post(protected::create_service).route_layer(guard.clone()),
        )
        .route("/review", post(protected::create_review).route_layer(guard.clone()))
        .route(
            "/my-review",
            get(protected::list_my_reviews)
                .patch(protected::update_my_review)
                .delete(protected::delete_my_review)
                .route_layer(guard),
        )
        .fallback(not_found)
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured browser origins, with credentials
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> &'static str {
    "Welcome to TouristaTravels!"
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store.health_check().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::service_unavailable("Database unavailable")
    })?;

    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "database": "ok"
    })))
}
