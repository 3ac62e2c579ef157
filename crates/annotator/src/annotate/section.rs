//! 섹션 단위 주석 -- 섹션 규칙으로 섹션 전체를 검사하고 섹션 끝에 힌트를 추가합니다.

use std::sync::Arc;

use crate::rule::RuleSet;
use crate::section::Section;

use super::{Annotate, HintFormatter};

/// 섹션 규칙 기반 주석기
#[derive(Debug, Clone)]
pub struct SectionAnnotator {
    rules: Arc<RuleSet>,
    formatter: HintFormatter,
}

impl SectionAnnotator {
    /// 주석기를 생성합니다.
    pub fn new(rules: Arc<RuleSet>, formatter: HintFormatter) -> Self {
        Self { rules, formatter }
    }
}

impl Annotate for SectionAnnotator {
    fn name(&self) -> &str {
        "section"
    }

    fn annotate(&self, mut section: Section) -> Section {
        let messages: Vec<String> = self
            .rules
            .section_rules()
            .iter()
            .filter_map(|rule| rule.hints_for(&section))
            .flatten()
            .collect();

        for message in &messages {
            section.push_hint(self.formatter.format(message));
        }
        section
    }
}
