//! Health check endpoints for liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;

use super::state::AppState;

/// Health response with optional component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Returns 200 while the process is serving requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness: the account store must answer a ping
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let store = check_account_store(&state).await;
    let overall_status = store.status;

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![store]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_account_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.account_service.check_store().await {
        Ok(_) => (HealthStatus::Healthy, None),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (HealthStatus::Unhealthy, Some("account store unavailable".to_string()))
        }
    };

    HealthCheck {
        name: "account_store".to_string(),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::HashingConfig;
    use crate::domain::user::MockUserRepository;
    use crate::domain::DomainError;
    use crate::infrastructure::user::{Argon2Hasher, InMemoryUserRepository, UserAccountService};

    fn hasher() -> Arc<Argon2Hasher> {
        Arc::new(
            Argon2Hasher::from_config(&HashingConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_check_healthy() {
        let service = UserAccountService::new(Arc::new(InMemoryUserRepository::new()), hasher());
        let state = AppState::new(Arc::new(service));

        let response = ready_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_check_store_down() {
        let mut repo = MockUserRepository::new();
        repo.expect_ping()
            .times(1)
            .returning(|| Err(DomainError::storage("connection refused")));
        repo.expect_list().never();

        let service = UserAccountService::new(Arc::new(repo), hasher());
        let state = AppState::new(Arc::new(service));

        let response = ready_check(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unhealthy).unwrap(),
            "\"unhealthy\""
        );
    }
}
