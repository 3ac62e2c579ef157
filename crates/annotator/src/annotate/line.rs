//! 라인 단위 주석 -- 각 라인을 그대로 출력하고 매칭된 규칙의 힌트를 바로 뒤에 추가합니다.
//!
//! 라인 간 상태가 없는 순수 함수입니다. direct 모드에서는 [`LineAnnotator::process`]가
//! 동기 루프로 입력을 처리하고, pipeline 모드에서는 [`Annotate`] 구현이 섹션 내부의
//! 각 라인에 같은 규칙을 적용합니다.

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::error::AnnotatorError;
use crate::input::LineReader;
use crate::rule::RuleSet;
use crate::section::{line_text, Section};

use super::{Annotate, AnnotateStats, HintFormatter};

/// 라인 규칙 기반 주석기
#[derive(Debug, Clone)]
pub struct LineAnnotator {
    rules: Arc<RuleSet>,
    formatter: HintFormatter,
}

impl LineAnnotator {
    /// 주석기를 생성합니다.
    pub fn new(rules: Arc<RuleSet>, formatter: HintFormatter) -> Self {
        Self { rules, formatter }
    }

    /// 라인에 매칭되는 힌트 라인을 규칙 선언 순서대로 반환합니다.
    pub fn hints_for(&self, line: &[u8]) -> Vec<bytes::Bytes> {
        self.rules
            .messages_for(&line_text(line))
            .iter()
            .map(|message| self.formatter.format(message))
            .collect()
    }

    /// 한 라인을 원본 그대로 쓰고 이어서 힌트 라인을 씁니다.
    ///
    /// 개행 없이 끝나는 라인 뒤에 힌트가 붙는 경우 개행을 하나 삽입합니다.
    /// 쓴 힌트 라인 수를 반환합니다.
    pub fn write_line<W: Write>(&self, line: &[u8], out: &mut W) -> Result<usize, AnnotatorError> {
        out.write_all(line)?;
        let hints = self.hints_for(line);
        if !hints.is_empty() && !line.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
        for hint in &hints {
            out.write_all(hint)?;
        }
        Ok(hints.len())
    }

    /// 입력 스트림을 끝까지 읽으며 주석을 붙여 출력합니다 (direct 모드).
    ///
    /// 라인마다 즉시 출력하며 입력 종료 시 출력을 flush 합니다.
    ///
    /// # Errors
    /// - 입력 읽기 실패 (`StreamRead`)
    /// - 출력 쓰기 실패 (`Io`)
    pub fn process<R: BufRead, W: Write>(
        &self,
        reader: R,
        mut writer: W,
    ) -> Result<AnnotateStats, AnnotatorError> {
        let mut reader = LineReader::new(reader);
        let mut stats = AnnotateStats::default();

        while let Some(line) = reader.next_line()? {
            if line.is_empty() {
                return Err(AnnotatorError::EmptyLine {
                    line: reader.line_no(),
                });
            }
            stats.lines += 1;
            stats.hints += self.write_line(&line, &mut writer)? as u64;
        }

        writer.flush()?;

        tracing::debug!(lines = stats.lines, hints = stats.hints, "input exhausted");
        Ok(stats)
    }
}

impl Annotate for LineAnnotator {
    fn name(&self) -> &str {
        "line"
    }

    fn annotate(&self, mut section: Section) -> Section {
        for idx in 0..section.input_len() {
            let hints = match section.lines().get(idx) {
                Some(line) => self.hints_for(line),
                None => continue,
            };
            for hint in hints {
                section.push_hint_after(idx, hint);
            }
        }
        section
    }
}
