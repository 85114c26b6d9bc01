//! 이미지 바이트 저장소.
//!
//! 메타데이터(DB)와 분리된 blob 저장소입니다. 키는 업로드 시 생성된
//! `<uuid>-<원본 파일명>` 형태의 단일 경로 세그먼트입니다.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// blob 저장소 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// blob 저장소 추상화.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// 없는 키 삭제는 성공으로 취급합니다.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// 키가 단일 일반 경로 세그먼트인지 확인합니다.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let mut components = Path::new(key).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StorageError::InvalidKey(key.to_string())),
    }
}

/// 로컬 디렉터리 저장소.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// 디렉터리가 없으면 생성합니다.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Blob written");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 메모리 저장소 (테스트용).
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.blobs
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.blobs.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("abc-cat.png").is_ok());

        for key in ["", "..", ".", "../etc/passwd", "a/b", "/abs"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "{:?} must be rejected",
                key
            );
        }
    }

    #[tokio::test]
    async fn test_local_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path().join("images")).await.unwrap();

        store.put("k1-cat.png", b"\x89PNG").await.unwrap();
        assert_eq!(store.get("k1-cat.png").await.unwrap(), b"\x89PNG");
        assert!(store.root().join("k1-cat.png").exists());

        store.delete("k1-cat.png").await.unwrap();
        assert!(matches!(
            store.get("k1-cat.png").await,
            Err(StorageError::NotFound(_))
        ));
        // 두 번째 삭제도 성공
        store.delete("k1-cat.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.put("../escape.png", b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty().await);

        store.put("a", b"1").await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("a").await.unwrap(), b"1");

        store.delete("a").await.unwrap();
        assert!(matches!(store.get("a").await, Err(StorageError::NotFound(_))));
    }
}
