//! 에러 타입 -- 도메인별 에러 정의

/// sleuth 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SleuthError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 주석 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 규칙 에러 (규칙 문서 로딩, 패턴 컴파일)
    #[error("rule error: {0}")]
    Rule(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 입력 스트림 읽기 실패
    #[error("stream read failed: {0}")]
    StreamRead(String),

    /// 처리 태스크 비정상 종료
    #[error("task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_sleuth_error() {
        let err: SleuthError = ConfigError::FileNotFound {
            path: "sleuth.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, SleuthError::Config(_)));
        assert!(err.to_string().contains("sleuth.toml"));
    }

    #[test]
    fn invalid_value_names_field() {
        let err = ConfigError::InvalidValue {
            field: "annotate.mode".to_owned(),
            reason: "must be one of: direct, pipeline".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("annotate.mode"));
        assert!(msg.contains("direct, pipeline"));
    }

    #[test]
    fn pipeline_error_display() {
        let err: SleuthError = PipelineError::StreamRead("broken".to_owned()).into();
        assert_eq!(err.to_string(), "pipeline error: stream read failed: broken");
    }
}
