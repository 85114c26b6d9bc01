//! 이미지 저장 서비스의 도메인 모델.

mod image;
mod user;

pub use image::*;
pub use user::*;
