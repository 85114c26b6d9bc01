//! 메모리 저장소.
//!
//! 테스트와 데이터베이스 없는 로컬 실행에 사용합니다.
//! 의미는 PostgreSQL 구현과 같습니다 (사용자 이름 유일성, 최신순 목록).

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use picstore_core::{Image, NewImage, ServiceError, ServiceResult, User, UserId};
use tokio::sync::RwLock;

use super::{ImageStore, UserStore};

/// 메모리 사용자 저장소.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> ServiceResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(ServiceError::invalid_input(format!(
                "username '{}' already exists",
                username
            )));
        }

        let user = User {
            id: UserId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn ping(&self) -> ServiceResult<()> {
        Ok(())
    }
}

/// 메모리 이미지 저장소.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    images: RwLock<Vec<Image>>,
    next_id: AtomicI64,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn create(&self, image: NewImage) -> ServiceResult<Image> {
        let mut images = self.images.write().await;
        if images.iter().any(|i| i.image_key == image.image_key) {
            return Err(ServiceError::internal(format!(
                "duplicate image key {}",
                image.image_key
            )));
        }

        let record = Image {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: image.user_id,
            image_path: image.image_path,
            image_key: image.image_key,
            created_at: Utc::now(),
        };
        images.push(record.clone());
        Ok(record)
    }

    async fn list_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Image>> {
        let images = self.images.read().await;
        let mut owned: Vec<Image> = images
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn find_by_key(&self, image_key: &str) -> ServiceResult<Option<Image>> {
        let images = self.images.read().await;
        Ok(images.iter().find(|i| i.image_key == image_key).cloned())
    }

    async fn delete(&self, id: i64) -> ServiceResult<bool> {
        let mut images = self.images.write().await;
        let before = images.len();
        images.retain(|i| i.id != id);
        Ok(images.len() != before)
    }
}
