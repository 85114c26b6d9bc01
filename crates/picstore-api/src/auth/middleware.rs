//! 인가 게이트.
//!
//! 보호 라우트 앞에 라우터 구성 시점에 붙는 인터셉터입니다.
//!
//! 1. `Authorization: Bearer <token>` 헤더에서 토큰 추출
//! 2. [`TokenCodec`]으로 검증, 실패 시 핸들러 실행 전에 401
//! 3. 검증된 Claims를 [`Authenticated`]로 핸들러에 명시적으로 전달
//!
//! 게이트는 리소스 타입을 모릅니다. 소유권 검사는 핸들러가 [`ensure_owner`]로 수행합니다.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/images", get(list_images))
//!     .route_layer(middleware::from_fn_with_state(gate, require_authentication));
//!
//! async fn list_images(auth: Authenticated) -> ApiResult<Json<ImageListResponse>> {
//!     let user_id = auth.user_id()?;
//!     ...
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use picstore_core::{AuthFailure, UserId};

use super::{Claims, TokenCodec};
use crate::error::ApiError;

/// 토큰 검증 게이트.
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
}

impl AuthGate {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// 요청 헤더를 검증하여 Claims를 반환합니다.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims, AuthFailure> {
        let value = headers
            .get(AUTHORIZATION)
            .ok_or(AuthFailure::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthFailure::MalformedHeader)?;

        let token = bearer_token(value)?;

        self.codec
            .verify(token)
            .map_err(|e| AuthFailure::InvalidToken(e.reason().to_string()))
    }
}

/// `Bearer <token>` 형식에서 토큰을 꺼냅니다.
///
/// 공백 하나로 나눈 결과가 정확히 두 부분이어야 하고, 스킴은 `Bearer`(대소문자 무시),
/// 토큰은 비어 있지 않아야 합니다.
pub fn bearer_token(value: &str) -> Result<&str, AuthFailure> {
    let parts: Vec<&str> = value.split(' ').collect();

    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(AuthFailure::MalformedHeader),
    }
}

/// 인증 미들웨어.
///
/// 검증에 실패하면 내부 핸들러를 호출하지 않고 401을 반환합니다.
pub async fn require_authentication(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = gate.authenticate(request.headers())?;
    request.extensions_mut().insert(Authenticated(claims));

    Ok(next.run(request).await)
}

/// 인증된 요청의 Claims.
///
/// [`require_authentication`] 뒤에 있는 핸들러에서만 얻을 수 있습니다.
/// 게이트를 거치지 않은 요청이면 인증 실패로 거부됩니다.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl Authenticated {
    /// 토큰 subject를 사용자 ID로 변환합니다.
    pub fn user_id(&self) -> Result<UserId, AuthFailure> {
        self.0
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthFailure::UnknownSubject)
    }

    pub fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .ok_or_else(|| AuthFailure::MissingCredentials.into())
    }
}

/// 리소스 소유권 검사.
///
/// 불일치는 잘못된 토큰과 같은 인증 실패로 취급됩니다.
pub fn ensure_owner(user_id: UserId, owner: UserId) -> Result<(), AuthFailure> {
    if user_id == owner {
        Ok(())
    } else {
        Err(AuthFailure::NotOwner)
    }
}
