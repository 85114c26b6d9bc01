//! 로그인 및 현재 사용자 endpoint.
//!
//! - `POST /login` - 자격 증명 확인 후 세션 토큰 발급
//! - `GET /me` - 토큰 주체 정보 (인증 필요)
//!
//! 존재하지 않는 사용자와 비밀번호 불일치는 같은 401 응답이며,
//! 두 경우 모두 해시 비교를 한 번 수행합니다.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use picstore_core::{AuthFailure, ServiceError, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{AccessToken, Authenticated};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::record_login_success;
use crate::state::AppState;

/// 로그인 요청.
#[derive(Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 1024, message = "password must be 1-1024 characters"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 현재 사용자 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub id: UserId,
    pub username: String,
}

/// 로그인.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급 성공", body = AccessToken),
        (status = 400, description = "잘못된 요청", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AccessToken>> {
    let Json(request) = payload.map_err(|e| ServiceError::invalid_input(e.body_text()))?;
    request
        .validate()
        .map_err(|e| ServiceError::invalid_input(e.to_string()))?;

    debug!(username = %request.username, "Login attempt");

    let user = state.users.find_by_username(&request.username).await?;
    let stored_hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.dummy_hash.to_string(),
    };

    let verifier = state.verifier.clone();
    let password = request.password;
    let matched = tokio::task::spawn_blocking(move || verifier.verify(&password, &stored_hash))
        .await
        .map_err(|e| ServiceError::internal(format!("password verification task: {}", e)))?;

    let identity = match user {
        Some(user) if matched => user.identity(),
        _ => return Err(AuthFailure::BadCredentials.into()),
    };

    let token = state.codec.issue(&identity)?;
    record_login_success();
    info!(user_id = %identity.id, "User logged in");

    Ok(Json(token))
}

/// 현재 토큰의 사용자 정보.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "사용자 정보", body = MeResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> ApiResult<Json<MeResponse>> {
    let user_id = auth.user_id()?;
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AuthFailure::UnknownSubject)?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
    }))
}
