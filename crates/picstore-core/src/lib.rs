//! # Picstore Core
//!
//! 이미지 저장 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 / 이미지 / 인증 주체 도메인 타입
//! - 닫힌 에러 분류 체계 (`ServiceError`)
//! - 설정 관리 (파일 + 환경 변수)
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
