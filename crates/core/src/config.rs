//! 설정 관리 -- sleuth.toml 파싱 및 런타임 설정
//!
//! [`SleuthConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SLEUTH_ANNOTATE_MODE=pipeline` 형식)
//! 3. 설정 파일 (`sleuth.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sleuth_core::error::SleuthError> {
//! use sleuth_core::config::SleuthConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SleuthConfig::load("sleuth.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SleuthConfig::parse("[annotate]\nmode = \"pipeline\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SleuthError};

/// 허용되는 로그 레벨
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
/// 허용되는 로그 형식
pub const LOG_FORMATS: &[&str] = &["json", "pretty"];
/// 허용되는 실행 모드
pub const MODES: &[&str] = &["direct", "pipeline"];
/// 허용되는 주석 전략
pub const STRATEGIES: &[&str] = &["line", "section"];
/// 허용되는 색상 정책
pub const COLOR_CHOICES: &[&str] = &["auto", "always", "never"];

/// sleuth 통합 설정
///
/// `sleuth.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SleuthConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 주석 엔진 설정
    #[serde(default)]
    pub annotate: AnnotateConfig,
}

impl SleuthConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SleuthError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작하는 [`load`](Self::load) 변형입니다.
    ///
    /// 기본 경로의 설정 파일은 선택 사항이므로 CLI가 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SleuthError> {
        let mut config = match Self::from_file(path.as_ref()).await {
            Ok(config) => config,
            Err(SleuthError::Config(ConfigError::FileNotFound { path })) => {
                tracing::debug!(path = %path, "config file not found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SleuthError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SleuthError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SleuthError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SleuthError> {
        toml::from_str(toml_str).map_err(|e| {
            SleuthError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SLEUTH_{SECTION}_{FIELD}`
    /// 예: `SLEUTH_ANNOTATE_STRICT=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SLEUTH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SLEUTH_GENERAL_LOG_FORMAT");

        // Annotate
        override_string(&mut self.annotate.rules, "SLEUTH_ANNOTATE_RULES");
        override_string(&mut self.annotate.mode, "SLEUTH_ANNOTATE_MODE");
        override_string(&mut self.annotate.strategy, "SLEUTH_ANNOTATE_STRATEGY");
        override_bool(&mut self.annotate.strict, "SLEUTH_ANNOTATE_STRICT");
        override_string(&mut self.annotate.color, "SLEUTH_ANNOTATE_COLOR");
        override_usize(
            &mut self.annotate.channel_capacity,
            "SLEUTH_ANNOTATE_CHANNEL_CAPACITY",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SleuthError> {
        check_one_of("general.log_level", &self.general.log_level, LOG_LEVELS)?;
        check_one_of("general.log_format", &self.general.log_format, LOG_FORMATS)?;
        check_one_of("annotate.mode", &self.annotate.mode, MODES)?;
        check_one_of("annotate.strategy", &self.annotate.strategy, STRATEGIES)?;
        check_one_of("annotate.color", &self.annotate.color, COLOR_CHOICES)?;

        if self.annotate.rules.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "annotate.rules".to_owned(),
                reason: "rule source must not be empty".to_owned(),
            }
            .into());
        }

        // 섹션 전략은 파이프라인 모드에서만 의미가 있음
        if self.annotate.strategy == "section" && self.annotate.mode != "pipeline" {
            return Err(ConfigError::InvalidValue {
                field: "annotate.strategy".to_owned(),
                reason: "'section' strategy requires mode = \"pipeline\"".to_owned(),
            }
            .into());
        }

        if self.annotate.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "annotate.channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

fn check_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), SleuthError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("must be one of: {}", allowed.join(", ")),
        }
        .into())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 주석 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateConfig {
    /// 규칙 문서 위치 (로컬 경로 또는 http(s) URL)
    pub rules: String,
    /// 실행 모드 (direct, pipeline)
    pub mode: String,
    /// 주석 전략 (line, section)
    pub strategy: String,
    /// 패턴 컴파일 실패 시 실행 중단 여부
    pub strict: bool,
    /// 색상 정책 (auto, always, never)
    pub color: String,
    /// 파이프라인 단계 간 채널 용량
    pub channel_capacity: usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            rules: "sleuth-rules.yml".to_owned(),
            mode: "direct".to_owned(),
            strategy: "line".to_owned(),
            strict: false,
            color: "auto".to_owned(),
            channel_capacity: 16,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
