//! 규칙 문서 데이터 타입
//!
//! YAML 규칙 문서에서 역직렬화되는 구조체들을 정의합니다.
//! 컴파일된 형태는 [`RuleSet`](super::RuleSet)을 참고하세요.

use serde::{Deserialize, Serialize};

use crate::error::AnnotatorError;

/// 규칙 문서 최대 규칙 수 (line_rules + section_rules)
pub const MAX_RULES_COUNT: usize = 10_000;

/// 규칙 문서 -- 하나의 YAML 규칙 문서에 대응합니다.
///
/// # YAML 스키마
/// ```yaml
/// message_prefix: "[ros]"
/// line_rules:
///   - pattern: 'error: (\w+)'
///     message: 'Unknown error $1'
/// section_rules:
///   - line: 1
///     pattern: 'Could not find a package configuration file provided by "(\w+)"'
///     hints:
///       - 'Install the package that provides $1'
/// ```
///
/// 알 수 없는 최상위 키는 무시됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesDocument {
    /// 모든 힌트 앞에 붙는 접두어. 지정하면 기본 태그를 그대로 대체합니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_prefix: Option<String>,
    /// 라인 단위 규칙 (선언 순서대로 평가)
    #[serde(default, alias = "rules")]
    pub line_rules: Vec<RuleDefinition>,
    /// 섹션 단위 규칙
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_rules: Vec<SectionRuleDefinition>,
}

impl RulesDocument {
    /// 전체 규칙 수를 반환합니다.
    pub fn rule_count(&self) -> usize {
        self.line_rules.len() + self.section_rules.len()
    }

    /// 문서의 유효성을 검증합니다.
    ///
    /// 문서 전체에 대한 검사만 수행합니다. 패턴 문법이나 힌트 누락처럼 규칙 하나에 국한된
    /// 문제는 규칙 단위로 격리되어 [`RuleSet::build`](super::RuleSet::build)에서 처리됩니다.
    pub fn validate(&self) -> Result<(), AnnotatorError> {
        if self.rule_count() == 0 {
            return Err(AnnotatorError::Config {
                field: "line_rules".to_owned(),
                reason: "document defines no rules".to_owned(),
            });
        }

        if self.rule_count() > MAX_RULES_COUNT {
            return Err(AnnotatorError::Config {
                field: "line_rules".to_owned(),
                reason: format!("too many rules: max {MAX_RULES_COUNT}"),
            });
        }

        Ok(())
    }
}

/// 라인 규칙 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    /// 라인 어디에서든 매칭되는 정규식 조각
    pub pattern: String,
    /// 힌트 템플릿 (`$1`, `${name}` 캡처 참조 가능)
    pub message: String,
}

impl RuleDefinition {
    /// 새 규칙 정의를 생성합니다.
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// 섹션 규칙 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionRuleDefinition {
    /// 검사할 섹션 내 라인 인덱스 (0 = 헤더). 생략하면 모든 라인을 검사합니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 정규식 조각
    pub pattern: String,
    /// 매칭 시 섹션 끝에 덧붙일 힌트 템플릿 목록
    #[serde(default)]
    pub hints: Vec<String>,
}
