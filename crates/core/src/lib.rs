//! sleuth 공통 크레이트 -- 에러 타입과 설정
//!
//! - [`config`]: `sleuth.toml` 파싱, 환경변수 오버라이드, 유효성 검증
//! - [`error`]: 크레이트 간에 공유하는 최상위 에러 타입

pub mod config;
pub mod error;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, PipelineError, SleuthError};

// 설정
pub use config::{AnnotateConfig, GeneralConfig, SleuthConfig};
