//! OpenAPI 문서화 설정.
//!
//! Swagger UI는 `/swagger-ui`, 스펙 JSON은 `/api-docs/openapi.json`에서 제공됩니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::AccessToken;
use crate::error::ApiErrorResponse;
use crate::routes::{
    ComponentHealth, ComponentStatus, HealthResponse, ImageListResponse, ImageSummary,
    LoginRequest, MeResponse, UploadForm, UploadResponse,
};

/// Picstore API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Picstore API",
        description = r#"
# Picstore 이미지 저장소 REST API

사용자별 이미지 업로드/조회 API입니다.

## 인증

`POST /login`으로 받은 토큰을 `Authorization: Bearer <token>` 헤더에 포함하세요.
토큰은 12시간 동안 유효하며, 다른 사용자의 이미지에는 접근할 수 없습니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 로그인 및 현재 사용자"),
        (name = "images", description = "이미지 - 업로드/목록/조회/삭제")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Auth =====
            LoginRequest,
            AccessToken,
            MeResponse,

            // ===== Images =====
            UploadForm,
            UploadResponse,
            ImageSummary,
            ImageListResponse,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        crate::routes::auth::login,
        crate::routes::auth::me,

        crate::routes::images::upload_picture,
        crate::routes::images::list_images,
        crate::routes::images::fetch_image,
        crate::routes::images::delete_image,
    )
)]
pub struct ApiDoc;

/// Bearer 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
