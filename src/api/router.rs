use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::auth;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, REQUEST_ID_HEADER};
use super::state::AppState;
use super::users;
use crate::config::CorsConfig;

const WELCOME_BANNER: &str = "Welcome to Scholarship finder";

async fn welcome() -> &'static str {
    WELCOME_BANNER
}

/// Build the CORS layer from the configured origins
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the full router with application state
pub fn create_router_with_state(state: AppState, cors: &CorsConfig) -> Router {
    let request_id = header::HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(welcome))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Account API
        .nest(
            "/api",
            users::create_users_router().merge(auth::create_auth_router()),
        )
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(cors))
}
