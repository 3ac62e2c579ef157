//! 규칙 엔진 -- 규칙 문서 로딩, 패턴 컴파일, 라인/섹션 매칭
//!
//! YAML 규칙 문서를 로드하여 컴파일된 [`RuleSet`]을 만들고,
//! 라인 또는 섹션 단위로 매칭하여 힌트 메시지를 생성합니다.
//!
//! # 규칙 형식
//! ```yaml
//! message_prefix: "[ros]"
//! line_rules:
//!   - pattern: 'error: (\w+)'
//!     message: 'Unknown error $1'
//! ```
//!
//! # 아키텍처
//! - [`RuleSet`]: 컴파일된 규칙 모음, 실행 동안 읽기 전용으로 공유
//! - [`loader`]: 파일/URL에서 규칙 문서 로딩 및 유효성 검증
//! - [`compiler`]: 패턴 컴파일 및 템플릿 치환
//! - [`types`]: 규칙 문서 데이터 구조 정의

pub mod compiler;
pub mod loader;
pub mod types;

pub use compiler::{CompiledPattern, PatternCompiler};
pub use loader::{RuleLoader, RuleSource};
pub use types::{RuleDefinition, RulesDocument, SectionRuleDefinition};

use crate::error::{AnnotatorError, PatternCompileError, PatternFailures};
use crate::section::Section;

/// 패턴 컴파일 실패 처리 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileMode {
    /// 실패한 규칙만 제외하고 경고를 남김 (기본값)
    #[default]
    Lenient,
    /// 하나라도 실패하면 전체 구성을 중단
    Strict,
}

/// 컴파일된 라인 규칙
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: CompiledPattern,
    message: String,
}

impl Rule {
    /// 규칙 정의를 컴파일합니다.
    pub fn compile(definition: &RuleDefinition) -> Result<Self, PatternCompileError> {
        Ok(Self {
            pattern: PatternCompiler::compile(&definition.pattern)?,
            message: definition.message.clone(),
        })
    }

    /// 컴파일된 패턴을 반환합니다.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// 메시지 템플릿을 반환합니다.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 라인이 매칭되면 치환된 메시지를 반환합니다.
    pub fn message_for(&self, text: &str) -> Option<String> {
        self.pattern.expand(text, &self.message)
    }
}

/// 컴파일된 섹션 규칙
#[derive(Debug, Clone)]
pub struct SectionRule {
    line: Option<usize>,
    pattern: CompiledPattern,
    hints: Vec<String>,
}

impl SectionRule {
    /// 섹션 규칙 정의를 컴파일합니다.
    ///
    /// 힌트가 없는 규칙은 매칭되어도 출력할 것이 없으므로 컴파일 실패로 취급합니다.
    pub fn compile(definition: &SectionRuleDefinition) -> Result<Self, PatternCompileError> {
        if definition.hints.is_empty() {
            return Err(PatternCompileError {
                pattern: definition.pattern.clone(),
                reason: "section rule defines no hints".to_owned(),
            });
        }

        Ok(Self {
            line: definition.line,
            pattern: PatternCompiler::compile(&definition.pattern)?,
            hints: definition.hints.clone(),
        })
    }

    /// 검사 대상 라인 인덱스 (`None`이면 모든 라인)
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// 컴파일된 패턴을 반환합니다.
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// 힌트 템플릿 목록을 반환합니다.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// 섹션이 매칭되면 치환된 힌트 목록을 반환합니다.
    ///
    /// 라인 인덱스가 지정되지 않은 경우 처음 매칭된 라인의 캡처를 사용합니다.
    /// 섹션 길이를 벗어난 인덱스는 매칭되지 않습니다.
    pub fn hints_for(&self, section: &Section) -> Option<Vec<String>> {
        let captured = match self.line {
            Some(idx) => {
                let text = section.text(idx)?;
                let caps = self.pattern.captures(&text)?;
                self.expand_all(&caps)
            }
            None => (0..section.input_len()).find_map(|idx| {
                let text = section.text(idx)?;
                self.pattern.captures(&text).map(|caps| self.expand_all(&caps))
            })?,
        };
        Some(captured)
    }

    fn expand_all(&self, caps: &regex::Captures<'_>) -> Vec<String> {
        self.hints
            .iter()
            .map(|hint| compiler::expand_template(caps, hint))
            .collect()
    }
}

/// 컴파일된 규칙 모음
///
/// 시작 시 한 번 구성되며 이후 읽기 전용으로 모든 라인에서 공유됩니다.
/// 규칙 평가는 라인 간 상태를 갖지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    line_rules: Vec<Rule>,
    section_rules: Vec<SectionRule>,
    prefix: Option<String>,
    compile_failures: Vec<PatternCompileError>,
}

impl RuleSet {
    /// 규칙 문서의 모든 패턴을 컴파일하여 규칙 모음을 구성합니다.
    ///
    /// lenient 모드에서는 실패한 규칙을 제외하고 각 실패를 경고로 남깁니다.
    /// strict 모드에서는 모든 실패를 모아 에러로 반환합니다.
    ///
    /// # Errors
    /// strict 모드에서 하나 이상의 패턴이 컴파일에 실패하면
    /// [`AnnotatorError::InvalidPatterns`]를 반환합니다.
    pub fn build(document: &RulesDocument, mode: CompileMode) -> Result<Self, AnnotatorError> {
        let mut failures = Vec::new();

        let line_rules: Vec<Rule> = document
            .line_rules
            .iter()
            .filter_map(|def| Rule::compile(def).map_err(|e| failures.push(e)).ok())
            .collect();

        let section_rules: Vec<SectionRule> = document
            .section_rules
            .iter()
            .filter_map(|def| SectionRule::compile(def).map_err(|e| failures.push(e)).ok())
            .collect();

        if !failures.is_empty() {
            if mode == CompileMode::Strict {
                return Err(AnnotatorError::InvalidPatterns(PatternFailures(failures)));
            }
            for failure in &failures {
                tracing::warn!(
                    pattern = %failure.pattern,
                    reason = %failure.reason,
                    "rule pattern failed to compile, rule disabled"
                );
            }
        }

        tracing::debug!(
            line_rules = line_rules.len(),
            section_rules = section_rules.len(),
            skipped = failures.len(),
            "rule set built"
        );

        Ok(Self {
            line_rules,
            section_rules,
            prefix: document.message_prefix.clone(),
            compile_failures: failures,
        })
    }

    /// 라인 규칙 목록 (선언 순서)
    pub fn line_rules(&self) -> &[Rule] {
        &self.line_rules
    }

    /// 섹션 규칙 목록 (선언 순서)
    pub fn section_rules(&self) -> &[SectionRule] {
        &self.section_rules
    }

    /// 문서에 지정된 메시지 접두어
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// lenient 모드에서 제외된 패턴 목록
    pub fn compile_failures(&self) -> &[PatternCompileError] {
        &self.compile_failures
    }

    /// 사용 가능한 규칙 수
    pub fn rule_count(&self) -> usize {
        self.line_rules.len() + self.section_rules.len()
    }

    /// 라인 텍스트에 매칭되는 모든 규칙의 메시지를 선언 순서대로 반환합니다.
    pub fn messages_for(&self, text: &str) -> Vec<String> {
        self.line_rules
            .iter()
            .filter_map(|rule| rule.message_for(text))
            .collect()
    }
}
