//! 사용자 소유 이미지.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// 저장된 이미지 레코드.
///
/// `image_path`는 blob 저장소 내부 키이므로 클라이언트에 노출하지 않습니다.
/// 외부에서는 `image_key`로만 조회합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Image {
    pub id: i64,
    /// 소유자 ID
    pub user_id: UserId,
    /// blob 저장소 키
    #[serde(skip_serializing)]
    pub image_path: String,
    /// 공개 조회 키 (UUID v4)
    pub image_key: String,
    pub created_at: DateTime<Utc>,
}

/// 새 이미지 입력.
#[derive(Debug, Clone)]
pub struct NewImage {
    pub user_id: UserId,
    pub image_path: String,
    pub image_key: String,
}
