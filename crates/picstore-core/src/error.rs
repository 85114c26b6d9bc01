//! 서비스 에러 타입.
//!
//! 전송 계층과 무관한 닫힌 에러 분류 체계를 정의합니다.
//! HTTP 경계에서는 이 열거형을 빠짐없이 매칭하여 상태 코드로 변환합니다.
//!
//! | 분류 | 의미 | HTTP |
//! |---|---|---|
//! | `Configuration` | 시작 시점의 치명적 설정 오류 | 프로세스 종료 |
//! | `InvalidInput` | 클라이언트 입력 오류 | 400 |
//! | `Unauthenticated` | 인증/인가 실패 (세부 사유 비공개) | 401 |
//! | `NotFound` | 존재하지 않는 리소스 | 404 |
//! | `Internal` | 저장소/해싱 등 예기치 않은 실패 | 500 |

use thiserror::Error;

/// 인증 실패 세부 사유.
///
/// 서버 로그와 메트릭에만 기록되며, 클라이언트에는 항상 동일한
/// "unauthorized" 응답으로 노출됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Authorization 헤더 없음
    #[error("인증 헤더가 없습니다")]
    MissingCredentials,
    /// Authorization 헤더 형식 오류
    #[error("잘못된 Authorization 헤더 형식")]
    MalformedHeader,
    /// 토큰 검증 실패 (형식/서명/만료/발급자)
    #[error("유효하지 않은 토큰: {0}")]
    InvalidToken(String),
    /// 존재하지 않는 사용자 또는 비밀번호 불일치
    #[error("잘못된 사용자 이름 또는 비밀번호")]
    BadCredentials,
    /// 토큰 subject가 유효한 사용자를 가리키지 않음
    #[error("알 수 없는 토큰 subject")]
    UnknownSubject,
    /// 다른 사용자 소유의 리소스 접근
    #[error("리소스 소유자가 아닙니다")]
    NotOwner,
}

impl AuthFailure {
    /// 메트릭 라벨용 사유 코드.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::MissingCredentials => "missing_credentials",
            AuthFailure::MalformedHeader => "malformed_header",
            AuthFailure::InvalidToken(_) => "invalid_token",
            AuthFailure::BadCredentials => "bad_credentials",
            AuthFailure::UnknownSubject => "unknown_subject",
            AuthFailure::NotOwner => "not_owner",
        }
    }
}

/// 서비스 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 설정 에러 (시작 시점 전용)
    #[error("설정 에러: {0}")]
    Configuration(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 인증 실패
    #[error("인증 실패: {0}")]
    Unauthenticated(#[from] AuthFailure),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ServiceError::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ServiceError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ServiceError::Internal(msg.into())
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Configuration(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Internal(format!("database: {}", err))
    }
}
