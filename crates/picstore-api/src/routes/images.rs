//! 이미지 endpoint (모두 인증 필요).
//!
//! - `POST /upload-picture` - multipart `image` 필드 업로드
//! - `GET /images` - 내 이미지 목록
//! - `GET /?id=<key>` - 이미지 바이트 조회 (소유자만)
//! - `DELETE /images/{key}` - 이미지 삭제 (소유자만)
//!
//! 다른 사용자의 이미지 접근은 잘못된 토큰과 같은 401로 응답합니다.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        Path as UrlPath, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use picstore_core::{Image, NewImage, ServiceError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{ensure_owner, Authenticated};
use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::record_image_uploaded;
use crate::state::AppState;
use crate::storage::StorageError;

/// 업로드 파일 필드 이름.
pub const IMAGE_FIELD: &str = "image";

/// 파일명이 없거나 쓸 수 없을 때의 대체 이름.
const FALLBACK_FILE_NAME: &str = "upload";

/// 저장 키에 들어가는 파일명 최대 길이 (바이트).
const MAX_FILE_NAME_BYTES: usize = 100;

/// 잘라낼 때 보존하는 확장자 최대 길이 (점 포함, 바이트).
const MAX_EXTENSION_BYTES: usize = 16;

/// 업로드 요청 본문 (문서용).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

/// 업로드 결과.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: i64,
    /// 조회 키
    pub key: String,
    /// 조회 URL (`<base>/?id=<key>`)
    pub url: String,
}

/// 목록 항목.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageSummary {
    pub id: i64,
    pub key: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// 이미지 목록 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageListResponse {
    pub images: Vec<ImageSummary>,
    pub total: usize,
}

/// 이미지 조회 쿼리.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FetchQuery {
    /// 이미지 키
    pub id: Option<String>,
}

/// 이미지 조회 URL.
///
/// `base`는 스킴을 포함한 외부 주소이며 끝의 `/`는 무시됩니다.
pub fn image_url(base: &str, image_key: &str) -> String {
    format!("{}/?id={}", base.trim_end_matches('/'), image_key)
}

/// 업로드 파일명에서 경로 성분을 제거합니다.
///
/// 마지막 경로 세그먼트만 남기며, 비어 있거나 `.`/`..`이면 대체 이름을 씁니다.
/// 결과는 [`MAX_FILE_NAME_BYTES`] 이하로 잘립니다.
pub fn sanitize_file_name(raw: Option<&str>) -> String {
    raw.map(|name| name.replace('\\', "/"))
        .as_deref()
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(truncate_file_name)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// 확장자를 유지하면서 문자 경계에서 파일명을 자릅니다.
fn truncate_file_name(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_EXTENSION_BYTES => name.split_at(dot),
        _ => (name, ""),
    };

    let mut end = (MAX_FILE_NAME_BYTES - extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], extension)
}

/// 키로 이미지를 찾고 소유권을 확인합니다.
async fn owned_image(state: &AppState, auth: &Authenticated, key: &str) -> ApiResult<Image> {
    let user_id = auth.user_id()?;
    let image = state
        .images
        .find_by_key(key)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("image {}", key)))?;

    ensure_owner(user_id, image.user_id)?;
    Ok(image)
}

/// 이미지 업로드.
#[utoipa::path(
    post,
    path = "/upload-picture",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "업로드 성공", body = UploadResponse),
        (status = 400, description = "잘못된 요청", body = ApiErrorResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "images"
)]
pub async fn upload_picture(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let user_id = auth.user_id()?;
    let mut multipart = multipart.map_err(|e| ServiceError::invalid_input(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::invalid_input(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = sanitize_file_name(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::invalid_input(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| {
        ServiceError::invalid_input(format!("multipart field '{}' is required", IMAGE_FIELD))
    })?;

    if bytes.is_empty() {
        return Err(ServiceError::invalid_input("image is empty").into());
    }
    if bytes.len() > state.max_upload_bytes {
        return Err(ServiceError::invalid_input(format!(
            "image exceeds {} bytes",
            state.max_upload_bytes
        ))
        .into());
    }

    let image_key = Uuid::new_v4().to_string();
    let image_path = format!("{}-{}", image_key, file_name);

    state.blobs.put(&image_path, &bytes).await?;

    let record = match state
        .images
        .create(NewImage {
            user_id,
            image_path: image_path.clone(),
            image_key,
        })
        .await
    {
        Ok(record) => record,
        Err(e) => {
            if let Err(cleanup) = state.blobs.delete(&image_path).await {
                warn!(error = %cleanup, path = %image_path, "Failed to remove orphaned blob");
            }
            return Err(e.into());
        }
    };

    record_image_uploaded(bytes.len());
    info!(
        user_id = %user_id,
        image_id = record.id,
        size = bytes.len(),
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        id: record.id,
        url: image_url(&state.public_base_url, &record.image_key),
        key: record.image_key,
    }))
}

/// 내 이미지 목록.
#[utoipa::path(
    get,
    path = "/images",
    responses(
        (status = 200, description = "목록 조회 성공", body = ImageListResponse),
        (status = 401, description = "인증 실패", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> ApiResult<Json<ImageListResponse>> {
    let user_id = auth.user_id()?;
    let images = state.images.list_for_user(user_id).await?;

    let images: Vec<ImageSummary> = images
        .into_iter()
        .map(|image| ImageSummary {
            id: image.id,
            url: image_url(&state.public_base_url, &image.image_key),
            key: image.image_key,
            created_at: image.created_at,
        })
        .collect();

    debug!(user_id = %user_id, count = images.len(), "Listed images");

    Ok(Json(ImageListResponse {
        total: images.len(),
        images,
    }))
}

/// 이미지 바이트 조회.
#[utoipa::path(
    get,
    path = "/",
    params(FetchQuery),
    responses(
        (status = 200, description = "이미지 바이트", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, description = "id 누락", body = ApiErrorResponse),
        (status = 401, description = "인증 실패 또는 소유자 아님", body = ApiErrorResponse),
        (status = 404, description = "존재하지 않는 이미지", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "images"
)]
pub async fn fetch_image(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Query(query): Query<FetchQuery>,
) -> ApiResult<Response> {
    let key = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServiceError::invalid_input("query parameter 'id' is required"))?;

    let image = owned_image(&state, &auth, &key).await?;

    let bytes = match state.blobs.get(&image.image_path).await {
        Ok(bytes) => bytes,
        Err(StorageError::NotFound(_)) => {
            warn!(image_id = image.id, "Image record exists but blob is missing");
            return Err(ServiceError::not_found(format!("image {}", key)).into());
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

/// 이미지 삭제.
#[utoipa::path(
    delete,
    path = "/images/{key}",
    params(("key" = String, Path, description = "이미지 키")),
    responses(
        (status = 204, description = "삭제 성공"),
        (status = 401, description = "인증 실패 또는 소유자 아님", body = ApiErrorResponse),
        (status = 404, description = "존재하지 않는 이미지", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    UrlPath(key): UrlPath<String>,
) -> ApiResult<StatusCode> {
    let image = owned_image(&state, &auth, &key).await?;

    if !state.images.delete(image.id).await? {
        return Err(ServiceError::not_found(format!("image {}", key)).into());
    }
    // 레코드가 이미 없으므로 blob 삭제 실패는 응답에 반영하지 않음
    if let Err(e) = state.blobs.delete(&image.image_path).await {
        warn!(error = %e, path = %image.image_path, "Failed to remove blob of deleted image");
    }

    info!(image_id = image.id, user_id = %image.user_id, "Image deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, CredentialVerifier, TokenCodec};
    use crate::repository::{MemoryImageStore, MemoryUserStore};
    use crate::storage::{BlobStore, MemoryBlobStore};
    use async_trait::async_trait;
    use picstore_core::{AuthConfig, UserId};

    /// 삭제만 실패하는 blob 저장소.
    struct UndeletableBlobs(MemoryBlobStore);

    #[async_trait]
    impl BlobStore for UndeletableBlobs {
        async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
            self.0.put(key, bytes).await
        }
        async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.0.get(key).await
        }
        async fn delete(&self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("read-only volume")))
        }
    }

    fn caller(user_id: i64) -> Authenticated {
        Authenticated(Claims {
            iss: "picstore".to_string(),
            sub: user_id.to_string(),
            aud: vec!["owner".to_string()],
            iat: 0,
            exp: i64::MAX,
        })
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_blob_removal_fails() {
        let blobs = Arc::new(UndeletableBlobs(MemoryBlobStore::new()));
        let state = AppState::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryImageStore::new()),
            blobs.clone(),
            TokenCodec::new(&AuthConfig::with_secret("images-test-secret-0123456789")).unwrap(),
            CredentialVerifier::with_cost(1024, 1, 1).unwrap(),
        )
        .unwrap();
        let state = Arc::new(state);

        blobs.put("k1-cat.png", b"meow").await.unwrap();
        state
            .images
            .create(NewImage {
                user_id: UserId(3),
                image_path: "k1-cat.png".to_string(),
                image_key: "k1".to_string(),
            })
            .await
            .unwrap();

        let status = delete_image(State(state.clone()), caller(3), UrlPath("k1".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.images.find_by_key("k1").await.unwrap().is_none());
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://img.example.com/", "abc"),
            "https://img.example.com/?id=abc"
        );
        assert_eq!(image_url("http://127.0.0.1:3000", "k"), "http://127.0.0.1:3000/?id=k");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name(Some("cat.png")), "cat.png");
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("/abs/dir/dog.jpg")), "dog.jpg");
        assert_eq!(sanitize_file_name(Some("C:\\Users\\me\\pic.gif")), "pic.gif");
        assert_eq!(sanitize_file_name(Some("")), "upload");
        assert_eq!(sanitize_file_name(Some("..")), "upload");
        assert_eq!(sanitize_file_name(Some("dir/")), "dir");
        assert_eq!(sanitize_file_name(None), "upload");
    }

    #[test]
    fn test_sanitize_file_name_caps_length() {
        let long = format!("{}.png", "a".repeat(250));
        let name = sanitize_file_name(Some(&long));
        assert_eq!(name.len(), MAX_FILE_NAME_BYTES);
        assert!(name.ends_with(".png"));

        // 멀티바이트 문자 중간에서 자르지 않음
        let korean = format!("{}.jpg", "가".repeat(60));
        let name = sanitize_file_name(Some(&korean));
        assert!(name.len() <= MAX_FILE_NAME_BYTES);
        assert!(name.ends_with(".jpg"));
        assert!(name.starts_with('가'));

        // 확장자가 너무 길면 통째로 자름
        let odd = format!("x.{}", "b".repeat(200));
        assert_eq!(sanitize_file_name(Some(&odd)).len(), MAX_FILE_NAME_BYTES);

        assert_eq!(sanitize_file_name(Some("short.gif")), "short.gif");
    }
}
