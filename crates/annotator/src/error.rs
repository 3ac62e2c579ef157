//! 주석 엔진 에러 타입
//!
//! [`AnnotatorError`]는 규칙 문서 로딩부터 스트림 출력까지 엔진 내부에서 발생하는
//! 모든 에러를 표현합니다. `From<AnnotatorError> for SleuthError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use std::fmt;

use sleuth_core::error::{ConfigError, PipelineError, SleuthError};

/// 단일 규칙 패턴의 컴파일 실패
///
/// 다른 규칙의 매칭에는 영향을 주지 않습니다. lenient 모드에서는 해당 규칙만
/// 제외되고, strict 모드에서는 모든 실패가 [`AnnotatorError::InvalidPatterns`]로 모입니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pattern '{pattern}': {reason}")]
pub struct PatternCompileError {
    /// 작성자가 적은 원본 패턴
    pub pattern: String,
    /// 정규식 엔진이 보고한 사유
    pub reason: String,
}

/// 컴파일 실패 목록 (Display용 래퍼)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFailures(pub Vec<PatternCompileError>);

impl fmt::Display for PatternFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, failure) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// 주석 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnnotatorError {
    /// 규칙 문서를 가져오지 못함 (파일 I/O, HTTP)
    #[error("failed to fetch rules from {source_name}: {reason}")]
    ConfigFetch {
        /// 규칙 문서 위치
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 규칙 문서를 해석하지 못함
    #[error("failed to parse rules from {source_name}: {reason} (document starts with: {excerpt:?})")]
    ConfigParse {
        /// 규칙 문서 위치
        source_name: String,
        /// 실패 사유
        reason: String,
        /// 문서 앞부분 발췌 (최대 [`EXCERPT_CHARS`]자)
        excerpt: String,
    },

    /// 단일 패턴 컴파일 실패
    #[error(transparent)]
    PatternCompile(#[from] PatternCompileError),

    /// strict 모드에서 하나 이상의 패턴이 컴파일에 실패함
    #[error("{} rule pattern(s) failed to compile: {}", .0.0.len(), .0)]
    InvalidPatterns(PatternFailures),

    /// 입력 스트림 읽기 실패
    #[error("failed to read input at line {line}: {reason}")]
    StreamRead {
        /// 실패한 라인 번호 (1부터)
        line: u64,
        /// 실패 사유
        reason: String,
    },

    /// 스트림 종료가 아닌 위치에서 빈 라인이 전달됨
    #[error("unexpected empty line at line {line}")]
    EmptyLine {
        /// 라인 번호 (1부터)
        line: u64,
    },

    /// 파이프라인 단계 간 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 파이프라인 단계 태스크가 비정상 종료됨 (panic, 취소)
    #[error("annotation task failed: {0}")]
    Task(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 출력 I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 파싱 에러에 포함할 문서 발췌 길이 (문자 수)
pub const EXCERPT_CHARS: usize = 200;

/// 문서 앞부분을 최대 [`EXCERPT_CHARS`]자까지 잘라냅니다.
pub fn excerpt(document: &str) -> String {
    document.chars().take(EXCERPT_CHARS).collect()
}

impl AnnotatorError {
    /// 채널 닫힘으로 인한 2차 에러인지 확인합니다.
    ///
    /// 파이프라인은 여러 단계가 동시에 실패하면 채널 에러가 아닌 쪽을 원인으로 보고합니다.
    pub fn is_channel(&self) -> bool {
        matches!(self, Self::Channel(_))
    }
}

impl From<AnnotatorError> for SleuthError {
    fn from(err: AnnotatorError) -> Self {
        match err {
            AnnotatorError::Config { field, reason } => {
                SleuthError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnnotatorError::StreamRead { .. } | AnnotatorError::EmptyLine { .. } => {
                SleuthError::Pipeline(PipelineError::StreamRead(err.to_string()))
            }
            AnnotatorError::Channel(reason) => {
                SleuthError::Pipeline(PipelineError::ChannelSend(reason))
            }
            AnnotatorError::Task(reason) => {
                SleuthError::Pipeline(PipelineError::TaskFailed(reason))
            }
            AnnotatorError::Io(e) => SleuthError::Io(e),
            other => SleuthError::Rule(other.to_string()),
        }
    }
}
