//! Login endpoint

use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::users::UserEnvelope;
use crate::domain::user::PublicUser;
use crate::infrastructure::user::LoginRequest;

pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login request body
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginApiRequest {
    #[serde(default, alias = "userName")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// POST /api/login
///
/// Any authentication failure answers 401 with the same message.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginApiRequest>,
) -> Result<Json<UserEnvelope<PublicUser>>, ApiError> {
    debug!(username = %request.username, role = %request.role, "Login attempt");

    let user = state
        .account_service
        .login(LoginRequest {
            username: request.username,
            password: request.password,
            role: request.role,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserEnvelope::new(user)))
}
