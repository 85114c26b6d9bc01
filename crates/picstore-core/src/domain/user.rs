//! 사용자 및 인증 주체.
//!
//! - `UserId` - 사용자 식별자 (토큰의 `sub`로 전달됨)
//! - `User` - 저장된 사용자 레코드 (비밀번호 해시 포함)
//! - `Identity` - 토큰 발급에 필요한 최소한의 사용자 정보

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 사용자 식별자.
///
/// 생성 후 변하지 않으며, 토큰에는 10진 문자열로 실립니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::Type), sqlx(transparent))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(UserId)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        UserId(value)
    }
}

/// 저장된 사용자.
///
/// 등록 시 한 번 생성되고 로그인마다 조회됩니다. 원본 비밀번호는 절대 보관하지 않습니다.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    /// 사용자 ID
    pub id: UserId,
    /// 사용자 이름 (고유, 변경 불가)
    pub username: String,
    /// PHC 형식 비밀번호 해시
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// 토큰 발급용 주체 정보.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// 토큰에 담기는 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// 사용자 ID
    pub id: UserId,
    /// 사용자 이름
    pub username: String,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }
}
