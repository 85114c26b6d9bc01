//! Picstore REST API 서버.
//!
//! 사용자별 이미지 저장소를 HTTP로 제공합니다.
//!
//! # 모듈
//!
//! - [`auth`]: 비밀번호 검증, 세션 토큰, 인가 게이트
//! - [`routes`]: 엔드포인트와 라우터 구성
//! - [`repository`]: 사용자/이미지 메타데이터 저장소
//! - [`storage`]: 이미지 바이트 저장소
//! - [`state`]: 핸들러 공유 상태

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod state;
pub mod storage;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::{create_api_router, create_router};
pub use state::AppState;
