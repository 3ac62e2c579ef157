//! 규칙 문서 로더 -- 로컬 파일 또는 HTTP(S) URL에서 YAML 규칙 문서를 로드합니다.
//!
//! 가져오기 실패는 [`AnnotatorError::ConfigFetch`], 해석 실패는
//! [`AnnotatorError::ConfigParse`]로 보고되며 둘 다 입력을 읽기 전에 실행을 중단시킵니다.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{excerpt, AnnotatorError};

use super::types::RulesDocument;

/// 규칙 문서 최대 크기
const MAX_RULE_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// HTTP 요청 타임아웃
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 규칙 문서 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// 로컬 파일 경로
    Path(PathBuf),
    /// `http://` 또는 `https://` URL
    Url(String),
}

impl RuleSource {
    /// 문자열을 규칙 문서 위치로 해석합니다.
    ///
    /// `http://`, `https://`로 시작하면 URL, 그 외에는 파일 경로로 취급합니다.
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(value.to_owned())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl From<&str> for RuleSource {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// 규칙 문서 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 규칙 문서를 가져와 파싱하고 유효성을 검증합니다.
    ///
    /// # Errors
    /// - 문서를 읽을 수 없는 경우 (`ConfigFetch`)
    /// - YAML 구조가 잘못되었거나 규칙이 없는 경우 (`ConfigParse`)
    pub async fn load(source: &RuleSource) -> Result<RulesDocument, AnnotatorError> {
        let content = match source {
            RuleSource::Path(path) => Self::read_file(path).await?,
            RuleSource::Url(url) => Self::fetch_url(url).await?,
        };

        let document = Self::parse_yaml(&content, &source.to_string())?;

        tracing::info!(
            source = %source,
            line_rules = document.line_rules.len(),
            section_rules = document.section_rules.len(),
            "loaded rule document"
        );

        Ok(document)
    }

    /// 로컬 파일에서 규칙 문서를 로드합니다.
    pub async fn load_file(path: impl AsRef<Path>) -> Result<RulesDocument, AnnotatorError> {
        Self::load(&RuleSource::Path(path.as_ref().to_path_buf())).await
    }

    async fn read_file(path: &Path) -> Result<String, AnnotatorError> {
        let fetch_error = |reason: String| AnnotatorError::ConfigFetch {
            source_name: path.display().to_string(),
            reason,
        };

        // 파일 크기 검증
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| fetch_error(format!("failed to read file metadata: {e}")))?;

        if metadata.len() > MAX_RULE_DOCUMENT_SIZE {
            return Err(fetch_error(format!(
                "file too large: {} bytes (max: {MAX_RULE_DOCUMENT_SIZE})",
                metadata.len()
            )));
        }

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| fetch_error(format!("failed to read file: {e}")))
    }

    async fn fetch_url(url: &str) -> Result<String, AnnotatorError> {
        let fetch_error = |reason: String| AnnotatorError::ConfigFetch {
            source_name: url.to_owned(),
            reason,
        };

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| fetch_error(format!("failed to build http client: {e}")))?;

        tracing::debug!(url, "fetching rule document");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| fetch_error(format!("unexpected response: {e}")))?;

        if let Some(len) = response.content_length() {
            if len > MAX_RULE_DOCUMENT_SIZE {
                return Err(fetch_error(format!(
                    "document too large: {len} bytes (max: {MAX_RULE_DOCUMENT_SIZE})"
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_error(format!("failed to read response body: {e}")))?;

        if body.len() as u64 > MAX_RULE_DOCUMENT_SIZE {
            return Err(fetch_error(format!(
                "document too large: {} bytes (max: {MAX_RULE_DOCUMENT_SIZE})",
                body.len()
            )));
        }

        String::from_utf8(body.to_vec())
            .map_err(|e| fetch_error(format!("document is not valid UTF-8: {e}")))
    }

    /// YAML 문자열을 파싱하여 규칙 문서를 생성합니다.
    pub fn parse_yaml(yaml_str: &str, source: &str) -> Result<RulesDocument, AnnotatorError> {
        let parse_error = |reason: String| AnnotatorError::ConfigParse {
            source_name: source.to_owned(),
            reason,
            excerpt: excerpt(yaml_str),
        };

        if yaml_str.trim().is_empty() {
            return Err(parse_error("document is empty".to_owned()));
        }

        let document: RulesDocument = serde_yaml::from_str(yaml_str)
            .map_err(|e| parse_error(format!("YAML parse error: {e}")))?;

        // 유효성 검증
        document.validate().map_err(|e| parse_error(e.to_string()))?;

        Ok(document)
    }
}
