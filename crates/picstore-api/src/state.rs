//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 저장소와 인증 구성 요소는 트레이트 객체로 주입되므로,
//! 같은 라우터를 PostgreSQL과 메모리 저장소 모두에서 실행할 수 있습니다.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::auth::{AuthGate, CredentialVerifier, PasswordError, TokenCodec};
use crate::repository::{ImageStore, MemoryImageStore, MemoryUserStore, UserStore};
use crate::storage::{BlobStore, MemoryBlobStore};

/// 존재하지 않는 사용자 로그인 시 비교에 쓰는 더미 비밀번호.
const DUMMY_PASSWORD: &str = "picstore-timing-equalizer-0";

/// 기본 업로드 크기 제한 (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 << 20;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 저장소
    pub users: Arc<dyn UserStore>,

    /// 이미지 메타데이터 저장소
    pub images: Arc<dyn ImageStore>,

    /// 이미지 바이트 저장소
    pub blobs: Arc<dyn BlobStore>,

    /// 세션 토큰 발급/검증
    pub codec: Arc<TokenCodec>,

    /// 비밀번호 검증기
    pub verifier: CredentialVerifier,

    /// 보호 라우트 게이트
    pub gate: AuthGate,

    /// 존재하지 않는 사용자에 대해서도 해시 비교를 수행하기 위한 해시.
    /// 응답 시간으로 사용자 존재 여부가 드러나지 않게 합니다.
    pub dummy_hash: Arc<str>,

    /// 이미지 URL 접두사 (끝의 `/` 제거됨)
    pub public_base_url: String,

    /// 업로드 최대 크기 (바이트)
    pub max_upload_bytes: usize,

    /// Prometheus 렌더링 핸들 (미설치 시 `None`)
    pub metrics: Option<PrometheusHandle>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 더미 해시를 만들기 위해 한 번 해싱을 수행합니다.
    pub fn new(
        users: Arc<dyn UserStore>,
        images: Arc<dyn ImageStore>,
        blobs: Arc<dyn BlobStore>,
        codec: TokenCodec,
        verifier: CredentialVerifier,
    ) -> Result<Self, PasswordError> {
        let codec = Arc::new(codec);
        let dummy_hash = verifier.hash(DUMMY_PASSWORD)?;

        Ok(Self {
            users,
            images,
            blobs,
            gate: AuthGate::new(codec.clone()),
            codec,
            verifier,
            dummy_hash: Arc::from(dummy_hash),
            public_base_url: "http://127.0.0.1:3000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            metrics: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 메모리 저장소로 구성된 상태.
    pub fn in_memory(codec: TokenCodec, verifier: CredentialVerifier) -> Result<Self, PasswordError> {
        Self::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryImageStore::new()),
            Arc::new(MemoryBlobStore::new()),
            codec,
            verifier,
        )
    }

    /// 이미지 URL 접두사 설정.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 사용자 저장소 연결 상태.
    pub async fn is_db_healthy(&self) -> bool {
        self.users.ping().await.is_ok()
    }
}
