//! JWT 세션 토큰 처리.
//!
//! 상태 없는 서명 토큰의 발급/검증 로직.
//! 토큰은 저장되지 않으며 만료 전에는 폐기할 수 없습니다.
//!
//! 토큰 수명: `issued → valid (exp 이전) → expired (영구)`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use picstore_core::{AuthConfig, Identity, ServiceError, MAX_TOKEN_TTL_HOURS};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 토큰 발급자 (고정값).
pub const ISSUER: &str = "picstore";

/// 토큰 타입 (항상 "Bearer").
pub const TOKEN_TYPE: &str = "Bearer";

/// 서명 알고리즘.
const ALGORITHM: Algorithm = Algorithm::HS512;

/// JWT 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer - 항상 [`ISSUER`]
    pub iss: String,
    /// Subject - 사용자 ID (10진 문자열)
    pub sub: String,
    /// Audience - `[username]`
    pub aud: Vec<String>,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    fn new(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or(JwtError::ExpiryOutOfRange)?;

        Ok(Self {
            iss: ISSUER.to_string(),
            sub: identity.id.to_string(),
            aud: vec![identity.username.clone()],
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// `now`가 만료 시각 이후(같음 포함)인지 확인.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// 토큰의 대상 사용자 이름.
    pub fn username(&self) -> Option<&str> {
        self.aud.first().map(String::as_str)
    }
}

/// 로그인 응답으로 내려가는 Access Token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    /// 서명된 JWT
    pub access_token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// JWT 처리 에러.
///
/// 검증 실패 사유는 로그용이며, 호출자는 모두 "인증 안 됨"으로 동일하게 취급해야 합니다.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 서명 실패: {0}")]
    SigningFailed(#[from] jsonwebtoken::errors::Error),
    #[error("잘못된 토큰 형식")]
    Malformed,
    #[error("토큰 서명 불일치")]
    InvalidSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("잘못된 토큰 발급자")]
    WrongIssuer,
    #[error("만료 시각을 계산할 수 없습니다")]
    ExpiryOutOfRange,
}

impl JwtError {
    /// 로그/메트릭용 사유 코드.
    pub fn reason(&self) -> &'static str {
        match self {
            JwtError::SigningFailed(_) => "signing_failed",
            JwtError::Malformed => "malformed",
            JwtError::InvalidSignature => "bad_signature",
            JwtError::Expired => "expired",
            JwtError::WrongIssuer => "wrong_issuer",
            JwtError::ExpiryOutOfRange => "expiry_out_of_range",
        }
    }
}

/// 세션 토큰 코덱.
///
/// 시작 시 한 번 만들어지며 이후 변경되지 않습니다.
/// 검증은 (토큰, 비밀 키, 현재 시각)만의 순수 함수입니다.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// 인증 설정으로 코덱을 생성합니다.
    ///
    /// # Errors
    ///
    /// 비밀 키가 없거나 TTL이 `1..=MAX_TOKEN_TTL_HOURS` 범위를 벗어나면
    /// `ServiceError::Configuration`.
    pub fn new(config: &AuthConfig) -> Result<Self, ServiceError> {
        let secret = config
            .secret()
            .ok_or_else(|| ServiceError::configuration("JWT secret is not configured"))?;

        let ttl = Some(config.token_ttl_hours)
            .filter(|hours| (1..=MAX_TOKEN_TTL_HOURS).contains(hours))
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                ServiceError::configuration(format!(
                    "token TTL must be between 1 and {} hours",
                    MAX_TOKEN_TTL_HOURS
                ))
            })?;

        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // 만료는 주입된 시각으로 직접 검사, 시계 오차 허용 없음
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        })
    }

    /// 토큰 유효 시간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 현재 시각 기준으로 토큰을 발급합니다.
    pub fn issue(&self, identity: &Identity) -> Result<AccessToken, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    /// 주어진 시각을 발급 시각으로 토큰을 발급합니다.
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<AccessToken, JwtError> {
        let claims = Claims::new(identity, issued_at, self.ttl)?;
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;

        Ok(AccessToken {
            access_token: token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// 현재 시각 기준으로 토큰을 검증합니다.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰을 검증합니다.
    ///
    /// 형식 오류, 서명 불일치, 발급자 불일치, 만료(`now >= exp`)는 모두 `Err`입니다.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    JwtError::InvalidSignature
                }
                ErrorKind::InvalidIssuer => JwtError::WrongIssuer,
                ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Malformed,
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(JwtError::Expired);
        }

        Ok(data.claims)
    }
}
