//! 비밀번호 해싱 및 검증.
//!
//! Argon2id 기반. 작업 계수는 고정값입니다:
//! 메모리 19 MiB (19456 KiB), 반복 2회, 병렬도 1.
//! 솔트는 호출마다 새로 생성되어 PHC 문자열에 포함되므로,
//! 검증에는 저장된 해시만 있으면 됩니다.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
    #[error("잘못된 Argon2 파라미터: {0}")]
    InvalidParams(String),
}

/// 자격 증명 검증기.
///
/// 상태는 불변 파라미터뿐이므로 여러 요청에서 공유해도 안전합니다.
#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT),
        }
    }
}

impl CredentialVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 지정 작업 계수로 생성합니다.
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// 비밀번호를 해싱합니다.
    ///
    /// # Returns
    ///
    /// PHC 형식의 해시 문자열 (`$argon2id$v=19$m=19456,t=2,p=1$...`)
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// 저장된 해시와 비밀번호를 비교합니다.
    ///
    /// 불일치와 해시 형식 오류 모두 `false`입니다.
    /// 비교는 argon2 크레이트의 상수 시간 비교에 위임합니다.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let parsed = match PasswordHash::new(stored) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// 비밀번호 강도 검증.
///
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("비밀번호는 최소 8자 이상이어야 합니다");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("비밀번호에 최소 1개의 숫자가 포함되어야 합니다");
    }

    if !password.chars().any(char::is_alphabetic) {
        return Err("비밀번호에 최소 1개의 문자가 포함되어야 합니다");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 테스트 속도를 위한 가벼운 작업 계수.
    fn fast() -> CredentialVerifier {
        CredentialVerifier::with_cost(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_uses_documented_work_factor() {
        let verifier = CredentialVerifier::new();
        let hash = verifier.hash("TestPassword123!").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(verifier.verify("TestPassword123!", &hash));
        assert!(!verifier.verify("WrongPassword123!", &hash));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let verifier = fast();
        let hash1 = verifier.hash("Password1").unwrap();
        let hash2 = verifier.hash("Password1").unwrap();

        // 솔트가 다르므로 해시가 다름
        assert_ne!(hash1, hash2);
        assert!(verifier.verify("Password1", &hash1));
        assert!(verifier.verify("Password1", &hash2));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let verifier = fast();
        assert!(!verifier.verify("password", "not-a-valid-hash"));
        assert!(!verifier.verify("password", ""));
        assert!(!verifier.verify("password", "$2b$14$abcdefghijklmnopqrstuv"));
    }

    #[test]
    fn test_verify_uses_params_from_stored_hash() {
        // 다른 작업 계수로 만든 해시도 검증 가능
        let hash = fast().hash("Password1").unwrap();
        assert!(CredentialVerifier::new().verify("Password1", &hash));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(matches!(
            CredentialVerifier::with_cost(1, 0, 0),
            Err(PasswordError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_unicode_password() {
        let verifier = fast();
        let hash = verifier.hash("한글패스워드123").unwrap();
        assert!(verifier.verify("한글패스워드123", &hash));
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Password1").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());
        assert!(validate_password_strength("한글패스워드123").is_ok());

        assert!(validate_password_strength("").is_err());
        assert!(validate_password_strength("Pass1").is_err());
        assert!(validate_password_strength("Password").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_hash_then_verify(password in ".{0,32}") {
            let verifier = fast();
            let hash = verifier.hash(&password).unwrap();
            prop_assert!(verifier.verify(&password, &hash));
        }

        #[test]
        fn prop_other_password_rejected(a in "[a-zA-Z0-9]{1,24}", b in "[a-zA-Z0-9]{1,24}") {
            prop_assume!(a != b);
            let verifier = fast();
            let hash = verifier.hash(&b).unwrap();
            prop_assert!(!verifier.verify(&a, &hash));
        }
    }
}
