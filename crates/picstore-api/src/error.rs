//! API 에러 응답.
//!
//! [`ServiceError`]를 HTTP 응답으로 변환하는 유일한 경계입니다.
//! 에러 분류는 빠짐없이 매칭되며, 세부 사유는 서버 로그에만 남습니다.
//!
//! | 분류 | 상태 코드 | 응답 코드 |
//! |---|---|---|
//! | `InvalidInput` | 400 | `INVALID_INPUT` |
//! | `Unauthenticated` | 401 | `UNAUTHORIZED` (사유와 무관하게 동일한 본문) |
//! | `NotFound` | 404 | `NOT_FOUND` |
//! | `Configuration` / `Internal` | 500 | `INTERNAL_ERROR` |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use picstore_core::{AuthFailure, ServiceError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::auth::{JwtError, PasswordError};
use crate::metrics::record_auth_failure;
use crate::storage::StorageError;

/// 인증 실패 시 응답 메시지 (모든 사유 공통).
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// API 에러 응답 본문.
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "unauthorized"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_INPUT", "UNAUTHORIZED", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프 포함 에러.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 타임스탬프 없는 에러.
    ///
    /// 인증 실패 응답은 요청마다 바이트 단위로 동일해야 하므로 이것을 씁니다.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: None,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러 에러.
///
/// `ServiceError`는 다른 크레이트의 타입이므로 응답 변환을 위해 감쌉니다.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

impl From<AuthFailure> for ApiError {
    fn from(failure: AuthFailure) -> Self {
        ApiError(ServiceError::Unauthenticated(failure))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::SigningFailed(e) => {
                ApiError(ServiceError::internal(format!("token signing: {}", e)))
            }
            JwtError::ExpiryOutOfRange => {
                ApiError(ServiceError::internal("token expiry out of range"))
            }
            other => ApiError(AuthFailure::InvalidToken(other.reason().to_string()).into()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError(ServiceError::internal(err.to_string()))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(ServiceError::internal(format!("blob storage: {}", err)))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError(ServiceError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ServiceError::InvalidInput(message) => {
                debug!(%message, "Rejecting invalid input");
                (
                    StatusCode::BAD_REQUEST,
                    ApiErrorResponse::new("INVALID_INPUT", message),
                )
            }
            ServiceError::Unauthenticated(failure) => {
                warn!(reason = failure.reason(), detail = %failure, "Request unauthenticated");
                record_auth_failure(failure.reason());
                (
                    StatusCode::UNAUTHORIZED,
                    ApiErrorResponse::simple("UNAUTHORIZED", UNAUTHORIZED_MESSAGE),
                )
            }
            ServiceError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiErrorResponse::new("NOT_FOUND", message),
            ),
            ServiceError::Configuration(message) | ServiceError::Internal(message) => {
                error!(error = %message, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("INTERNAL_ERROR", "internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
