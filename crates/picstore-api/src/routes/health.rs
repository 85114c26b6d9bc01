//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// 사용자/이미지 메타데이터 저장소
    pub database: ComponentStatus,

    /// 메트릭 레코더
    pub metrics: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down" | "not_configured")
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    pub fn up() -> Self {
        Self {
            status: "up".to_string(),
            message: None,
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "서버 응답 가능", body = String)),
    tag = "health"
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 저장소 연결이 끊기면 503을 반환합니다.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "모든 컴포넌트 정상", body = HealthResponse),
        (status = 503, description = "일부 컴포넌트 비정상", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_status = "healthy";
    let mut status_code = StatusCode::OK;

    let database = if state.is_db_healthy().await {
        ComponentStatus::up()
    } else {
        overall_status = "degraded";
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        ComponentStatus::down("connection failed")
    };

    let metrics = if state.metrics.is_some() {
        ComponentStatus::up()
    } else {
        ComponentStatus::not_configured()
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth { database, metrics },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use picstore_core::{AuthConfig, ServiceError, ServiceResult, User, UserId};
    use tower::ServiceExt;

    use crate::auth::{CredentialVerifier, TokenCodec};
    use crate::repository::{MemoryImageStore, UserStore};
    use crate::storage::MemoryBlobStore;

    /// 항상 연결 실패하는 저장소.
    struct UnreachableUsers;

    #[async_trait]
    impl UserStore for UnreachableUsers {
        async fn find_by_username(&self, _: &str) -> ServiceResult<Option<User>> {
            Err(ServiceError::internal("unreachable"))
        }
        async fn find_by_id(&self, _: UserId) -> ServiceResult<Option<User>> {
            Err(ServiceError::internal("unreachable"))
        }
        async fn create(&self, _: &str, _: &str) -> ServiceResult<User> {
            Err(ServiceError::internal("unreachable"))
        }
        async fn ping(&self) -> ServiceResult<()> {
            Err(ServiceError::internal("unreachable"))
        }
    }

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_secret("health-test-secret-0123456789")).unwrap()
    }

    fn fast() -> CredentialVerifier {
        CredentialVerifier::with_cost(1024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_returns_json() {
        let state = Arc::new(AppState::in_memory(codec(), fast()).unwrap());
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(state);

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.components.database.status, "up");
        assert_eq!(health.components.metrics.status, "not_configured");
    }

    #[tokio::test]
    async fn test_health_ready_degraded_when_database_down() {
        let state = AppState::new(
            Arc::new(UnreachableUsers),
            Arc::new(MemoryImageStore::new()),
            Arc::new(MemoryBlobStore::new()),
            codec(),
            fast(),
        )
        .unwrap();
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(state));

        let response = app
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
