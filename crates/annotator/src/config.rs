//! 주석 엔진 설정
//!
//! [`AnnotatorConfig`]는 core의 [`AnnotateConfig`](sleuth_core::config::AnnotateConfig)의
//! 문자열 설정을 타입이 있는 값으로 변환한 엔진 전용 설정입니다.
//!
//! # 사용 예시
//! ```ignore
//! use sleuth_core::config::SleuthConfig;
//! use sleuth_annotator::config::AnnotatorConfig;
//!
//! let core_config = SleuthConfig::default();
//! let config = AnnotatorConfig::from_core(&core_config.annotate)?;
//! ```

use std::fmt;
use std::str::FromStr;

use sleuth_core::config::AnnotateConfig;

use crate::error::AnnotatorError;
use crate::rule::{CompileMode, RuleSource};

/// 파이프라인 채널 최대 용량
const MAX_CHANNEL_CAPACITY: usize = 65_536;

/// 실행 모드
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnotateMode {
    /// 단일 동기 루프, 라인 단위 (기본값)
    #[default]
    Direct,
    /// 섹션 분할 → 주석 → 출력 3단계 동시 실행
    Pipeline,
}

/// 주석 전략
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// 라인 규칙을 라인마다 적용 (기본값)
    #[default]
    Line,
    /// 섹션 규칙을 섹션마다 적용
    Section,
}

/// 색상 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// 환경(`NO_COLOR`, `CLICOLOR_FORCE`)과 터미널 여부로 결정 (기본값)
    #[default]
    Auto,
    /// 항상 사용
    Always,
    /// 사용하지 않음
    Never,
}

impl ColorChoice {
    /// 실제 색상 사용 여부를 결정합니다.
    ///
    /// `Auto`는 `colored`의 환경 감지(`NO_COLOR`, `CLICOLOR`, `CLICOLOR_FORCE`,
    /// 표준 출력의 터미널 여부)를 따릅니다.
    pub fn resolve(self) -> bool {
        match self {
            Self::Auto => colored::control::ShouldColorize::from_env().should_colorize(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

macro_rules! choice_enum {
    ($ty:ty, $field:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = AnnotatorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(AnnotatorError::Config {
                        field: $field.to_owned(),
                        reason: format!(
                            "unknown value '{other}', must be one of: {}",
                            [$($name),+].join(", ")
                        ),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                $(if *self == $variant { return f.write_str($name); })+
                Ok(())
            }
        }
    };
}

choice_enum!(AnnotateMode, "mode", {
    "direct" => AnnotateMode::Direct,
    "pipeline" => AnnotateMode::Pipeline,
});

choice_enum!(Strategy, "strategy", {
    "line" => Strategy::Line,
    "section" => Strategy::Section,
});

choice_enum!(ColorChoice, "color", {
    "auto" => ColorChoice::Auto,
    "always" => ColorChoice::Always,
    "never" => ColorChoice::Never,
});

/// 주석 엔진 설정
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    /// 규칙 문서 위치
    pub rules: RuleSource,
    /// 실행 모드
    pub mode: AnnotateMode,
    /// 주석 전략
    pub strategy: Strategy,
    /// 패턴 컴파일 실패 처리 방식
    pub compile_mode: CompileMode,
    /// 색상 정책
    pub color: ColorChoice,
    /// 파이프라인 단계 간 채널 용량
    pub channel_capacity: usize,
    /// 힌트 접두어 재정의 (규칙 문서의 `message_prefix`보다 우선)
    pub prefix: Option<String>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            rules: RuleSource::parse("sleuth-rules.yml"),
            mode: AnnotateMode::Direct,
            strategy: Strategy::Line,
            compile_mode: CompileMode::Lenient,
            color: ColorChoice::Auto,
            channel_capacity: 16,
            prefix: None,
        }
    }
}

impl AnnotatorConfig {
    /// core의 `AnnotateConfig`에서 엔진 설정을 생성합니다.
    ///
    /// # Errors
    /// 열거형 문자열 값이 잘못되었거나 조합이 유효하지 않은 경우
    pub fn from_core(core: &AnnotateConfig) -> Result<Self, AnnotatorError> {
        let config = Self {
            rules: RuleSource::parse(&core.rules),
            mode: core.mode.parse()?,
            strategy: core.strategy.parse()?,
            compile_mode: if core.strict {
                CompileMode::Strict
            } else {
                CompileMode::Lenient
            },
            color: core.color.parse()?,
            channel_capacity: core.channel_capacity,
            prefix: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnnotatorError> {
        if let RuleSource::Path(path) = &self.rules {
            if path.as_os_str().is_empty() {
                return Err(AnnotatorError::Config {
                    field: "rules".to_owned(),
                    reason: "rule document location must not be empty".to_owned(),
                });
            }
        }

        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(AnnotatorError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be 1-{MAX_CHANNEL_CAPACITY}"),
            });
        }

        if self.strategy == Strategy::Section && self.mode != AnnotateMode::Pipeline {
            return Err(AnnotatorError::Config {
                field: "strategy".to_owned(),
                reason: "section strategy requires pipeline mode".to_owned(),
            });
        }

        Ok(())
    }
}

/// 엔진 설정 빌더
#[derive(Default)]
pub struct AnnotatorConfigBuilder {
    config: AnnotatorConfig,
}

impl AnnotatorConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙 문서 위치를 설정합니다.
    pub fn rules(mut self, source: RuleSource) -> Self {
        self.config.rules = source;
        self
    }

    /// 실행 모드를 설정합니다.
    pub fn mode(mut self, mode: AnnotateMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// 주석 전략을 설정합니다.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// 패턴 컴파일 모드를 설정합니다.
    pub fn compile_mode(mut self, mode: CompileMode) -> Self {
        self.config.compile_mode = mode;
        self
    }

    /// 색상 정책을 설정합니다.
    pub fn color(mut self, color: ColorChoice) -> Self {
        self.config.color = color;
        self
    }

    /// 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// 힌트 접두어를 재정의합니다.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = Some(prefix.into());
        self
    }

    /// 설정을 검증하고 `AnnotatorConfig`를 생성합니다.
    pub fn build(self) -> Result<AnnotatorConfig, AnnotatorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
