//! 저장소 계층.
//!
//! 라우트 핸들러는 구체 구현이 아니라 [`UserStore`] / [`ImageStore`] 트레이트에 의존합니다.
//! 운영 환경은 PostgreSQL 구현, 테스트는 메모리 구현을 주입합니다.

pub mod images;
pub mod memory;
pub mod users;

use async_trait::async_trait;
use picstore_core::{Image, NewImage, ServiceResult, User, UserId};
use sqlx::PgPool;
use tracing::info;

pub use images::PgImageStore;
pub use memory::{MemoryImageStore, MemoryUserStore};
pub use users::PgUserStore;

/// 스키마 생성 SQL (idempotent).
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// 테이블이 없으면 생성합니다.
pub async fn bootstrap_schema(pool: &PgPool) -> ServiceResult<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}

/// 사용자 조회/생성.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 사용자 이름으로 조회. 없으면 `None`.
    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// ID로 조회. 없으면 `None`.
    async fn find_by_id(&self, id: UserId) -> ServiceResult<Option<User>>;

    /// 새 사용자 생성. 이름 중복이면 `InvalidInput`.
    async fn create(&self, username: &str, password_hash: &str) -> ServiceResult<User>;

    /// 저장소 연결 확인.
    async fn ping(&self) -> ServiceResult<()>;
}

/// 이미지 메타데이터 조회/생성/삭제.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn create(&self, image: NewImage) -> ServiceResult<Image>;

    /// 소유자의 이미지 목록 (최신순).
    async fn list_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Image>>;

    /// 공개 키로 조회. 소유권 검사는 호출자 책임입니다.
    async fn find_by_key(&self, image_key: &str) -> ServiceResult<Option<Image>>;

    /// 삭제. 삭제된 레코드가 있으면 `true`.
    async fn delete(&self, id: i64) -> ServiceResult<bool>;
}
