//! API 라우트.
//!
//! # 라우트 구조
//!
//! 공개:
//! - `POST /login` - 토큰 발급
//! - `/health`, `/health/ready` - 헬스 체크
//! - `/metrics` - Prometheus 메트릭
//! - `/swagger-ui`, `/api-docs/openapi.json` - API 문서
//!
//! 인증 필요 (인가 게이트 뒤):
//! - `GET /me`
//! - `POST /upload-picture`
//! - `GET /images`
//! - `GET /?id=<key>`
//! - `DELETE /images/{key}`

pub mod auth;
pub mod health;
pub mod images;

pub use auth::{LoginRequest, MeResponse};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use images::{ImageListResponse, ImageSummary, UploadForm, UploadResponse};

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use crate::auth::require_authentication;
use crate::middleware::metrics_layer;
use crate::openapi::swagger_ui_router;
use crate::state::AppState;

/// multipart 경계/헤더 여유분.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// 보호 라우트 라우터.
///
/// 모든 라우트가 인가 게이트 뒤에 있습니다.
fn protected_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(images::fetch_image))
        .route("/me", get(auth::me))
        .route("/images", get(images::list_images))
        .route("/images/{key}", delete(images::delete_image))
        .route(
            "/upload-picture",
            post(images::upload_picture).layer(DefaultBodyLimit::max(
                state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_authentication,
        ))
}

/// 전체 API 라우터 생성 (상태 주입 전).
pub fn create_api_router(state: &AppState) -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(auth::login))
        .nest("/health", health_router())
        .merge(protected_router(state))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// 상태가 주입된 전체 라우터.
///
/// 메트릭 수집 미들웨어와 문서 라우트를 포함합니다.
/// 트레이싱/타임아웃/CORS 레이어는 바이너리에서 추가합니다.
pub fn create_router(state: Arc<AppState>) -> Router {
    create_api_router(&state)
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
}
