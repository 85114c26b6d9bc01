//! 인증 및 인가.
//!
//! # 구성 요소
//!
//! - [`CredentialVerifier`]: Argon2id 비밀번호 해싱/검증
//! - [`TokenCodec`]: HS512 세션 토큰 발급/검증
//! - [`AuthGate`]: 보호 라우트 앞의 토큰 검증 게이트
//! - [`Authenticated`]: 게이트를 통과한 요청의 Claims 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(auth: Authenticated) -> impl IntoResponse {
//!     format!("Hello, {}!", auth.claims().sub)
//! }
//! ```

mod jwt;
mod middleware;
mod password;

pub use jwt::{AccessToken, Claims, JwtError, TokenCodec, ISSUER, TOKEN_TYPE};
pub use middleware::{bearer_token, ensure_owner, require_authentication, AuthGate, Authenticated};
pub use password::{validate_password_strength, CredentialVerifier, PasswordError};
