//! 섹션 분할 -- 헤더 라인과 이어지는 들여쓰기 라인을 하나의 단위로 묶습니다.
//!
//! 섹션은 스페이스로 시작하지 않는 비어 있지 않은 라인(헤더)에서 시작하여
//! 다음 헤더가 나타나기 전까지의 빈 라인/스페이스 들여쓰기 라인(본문)을 포함합니다.
//! 모든 섹션의 입력 라인을 방출 순서대로 이어 붙이면 원본 입력과 정확히 같습니다.
//!
//! 첫 헤더보다 앞선 본문 라인은 헤더 없는 암시적 섹션으로 묶입니다.

use std::borrow::Cow;

use bytes::Bytes;

use crate::error::AnnotatorError;

/// 라인 그룹 -- 헤더 + 본문 라인, 그리고 주석 단계가 덧붙인 힌트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 첫 라인이 헤더인지 여부 (암시적 선행 섹션이면 false)
    headed: bool,
    /// 원본 입력 라인 (종결자 포함)
    lines: Vec<Bytes>,
    /// (직전 입력 라인 인덱스, 힌트 라인)
    hints: Vec<(usize, Bytes)>,
}

impl Section {
    /// 헤더 라인으로 새 섹션을 엽니다.
    pub fn with_header(header: Bytes) -> Self {
        Self {
            headed: true,
            lines: vec![header],
            hints: Vec::new(),
        }
    }

    /// 헤더 없는 암시적 섹션을 엽니다.
    pub fn headerless(first: Bytes) -> Self {
        Self {
            headed: false,
            lines: vec![first],
            hints: Vec::new(),
        }
    }

    /// 본문 라인을 덧붙입니다.
    pub fn push(&mut self, line: Bytes) {
        self.lines.push(line);
    }

    /// 헤더 라인을 반환합니다.
    pub fn header(&self) -> Option<&Bytes> {
        if self.headed { self.lines.first() } else { None }
    }

    /// 원본 입력 라인 목록
    pub fn lines(&self) -> &[Bytes] {
        &self.lines
    }

    /// 원본 입력 라인 수
    pub fn input_len(&self) -> usize {
        self.lines.len()
    }

    /// 덧붙은 힌트 수
    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    /// 매칭용 라인 텍스트 (종결자 제거, UTF-8 손실 변환)
    pub fn text(&self, idx: usize) -> Option<Cow<'_, str>> {
        self.lines.get(idx).map(|line| line_text(line))
    }

    /// `idx` 번째 입력 라인 바로 뒤에 힌트를 넣습니다.
    ///
    /// 같은 위치의 힌트는 추가된 순서대로 출력됩니다.
    pub fn push_hint_after(&mut self, idx: usize, hint: Bytes) {
        let idx = idx.min(self.lines.len().saturating_sub(1));
        self.hints.push((idx, hint));
    }

    /// 섹션 끝에 힌트를 덧붙입니다.
    pub fn push_hint(&mut self, hint: Bytes) {
        let last = self.lines.len().saturating_sub(1);
        self.hints.push((last, hint));
    }

    /// 출력 순서대로 청크를 반환합니다.
    ///
    /// 종결자 없는 라인 뒤에 힌트가 오면 힌트가 새 라인에서 시작하도록 `\n`을 끼워 넣습니다.
    pub fn into_output(self) -> Vec<Bytes> {
        let mut out = Vec::with_capacity(self.lines.len() + self.hints.len() + 1);
        let mut hints = self.hints;
        // 안정 정렬: 같은 위치의 힌트는 추가 순서 유지
        hints.sort_by_key(|(idx, _)| *idx);
        let mut hints = hints.into_iter().peekable();

        for (idx, line) in self.lines.into_iter().enumerate() {
            let unterminated = !line.ends_with(b"\n");
            out.push(line);
            let mut first = true;
            while let Some((_, hint)) = hints.next_if(|(at, _)| *at == idx) {
                if first && unterminated {
                    out.push(Bytes::from_static(b"\n"));
                }
                first = false;
                out.push(hint);
            }
        }

        out
    }
}

/// 라인이 섹션 헤더인지 확인합니다 (비어 있지 않고 스페이스로 시작하지 않음).
///
/// 탭으로 시작하는 라인도 헤더입니다. 본문 들여쓰기는 스페이스만 인정합니다.
pub fn is_header(line: &[u8]) -> bool {
    match line.first() {
        Some(b' ') | None => false,
        Some(_) => !line.iter().all(u8::is_ascii_whitespace),
    }
}

/// 매칭용 텍스트를 만듭니다 (`\n` / `\r\n` 종결자 제거).
pub fn line_text(line: &[u8]) -> Cow<'_, str> {
    let trimmed = line.strip_suffix(b"\n").unwrap_or(line);
    let trimmed = trimmed.strip_suffix(b"\r").unwrap_or(trimmed);
    String::from_utf8_lossy(trimmed)
}

/// 섹션 분할기 -- 열린 섹션 하나를 상태로 갖는 상태 기계
#[derive(Debug, Default)]
pub struct Sectionizer {
    open: Option<Section>,
    line_no: u64,
}

impl Sectionizer {
    /// 새 분할기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 받은 라인 수
    pub fn line_count(&self) -> u64 {
        self.line_no
    }

    /// 라인을 받아, 새 헤더로 인해 닫힌 섹션이 있으면 반환합니다.
    ///
    /// # Errors
    /// 빈 라인(종결자조차 없는 라인)은 스트림 종료가 아닌 위치에서 올 수 없으므로
    /// [`AnnotatorError::EmptyLine`]을 반환합니다.
    pub fn push(&mut self, line: Bytes) -> Result<Option<Section>, AnnotatorError> {
        self.line_no += 1;
        if line.is_empty() {
            return Err(AnnotatorError::EmptyLine { line: self.line_no });
        }

        if is_header(&line) {
            return Ok(self.open.replace(Section::with_header(line)));
        }

        match self.open.as_mut() {
            Some(section) => section.push(line),
            None => {
                tracing::debug!(line = self.line_no, "body line before first header, opening headerless section");
                self.open = Some(Section::headerless(line));
            }
        }
        Ok(None)
    }

    /// 입력 종료 시 열린 섹션을 반환합니다.
    pub fn finish(&mut self) -> Option<Section> {
        self.open.take()
    }

    /// 라인 목록 전체를 섹션으로 분할합니다.
    pub fn split<I>(lines: I) -> Result<Vec<Section>, AnnotatorError>
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut sectionizer = Self::new();
        let mut sections = Vec::new();
        for line in lines {
            if let Some(closed) = sectionizer.push(line)? {
                sections.push(closed);
            }
        }
        sections.extend(sectionizer.finish());
        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&'static str]) -> Vec<Bytes> {
        raw.iter().map(|l| Bytes::from_static(l.as_bytes())).collect()
    }

    fn concat(chunks: &[Bytes]) -> Vec<u8> {
        chunks.iter().flat_map(|c| c.iter().copied()).collect()
    }

    #[test]
    fn groups_indented_lines_under_header() {
        let sections = Sectionizer::split(lines(&["Foo\n", "  bar\n", "  baz\n", "Qux\n"])).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines(), &lines(&["Foo\n", "  bar\n", "  baz\n"])[..]);
        assert_eq!(sections[1].lines(), &lines(&["Qux\n"])[..]);
    }

    #[test]
    fn blank_lines_belong_to_open_section() {
        let sections = Sectionizer::split(lines(&["A\n", "\n", "\r\n", "B\n"])).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].input_len(), 3);
    }

    #[test]
    fn tab_led_line_opens_new_section() {
        let sections = Sectionizer::split(lines(&["Foo\n", "\tbar\n", "  baz\n"])).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].lines(), &lines(&["Foo\n"])[..]);
        assert_eq!(sections[1].header().map(|h| &h[..]), Some(&b"\tbar\n"[..]));
        assert_eq!(sections[1].input_len(), 2);
    }

    #[test]
    fn whitespace_only_tab_line_is_blank() {
        let sections = Sectionizer::split(lines(&["Foo\n", "\t\n"])).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(!is_header(b"\t\r\n"));
    }

    #[test]
    fn leading_body_lines_form_headerless_section() {
        let sections = Sectionizer::split(lines(&["  orphan\n", "\n", "Head\n"])).unwrap();
        assert_eq!(sections.len(), 2);
        assert!(sections[0].header().is_none());
        assert_eq!(sections[0].input_len(), 2);
        assert_eq!(sections[1].header().map(|h| &h[..]), Some(&b"Head\n"[..]));
    }

    #[test]
    fn empty_input_yields_no_sections() {
        assert!(Sectionizer::split(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn empty_line_is_a_protocol_violation() {
        let err = Sectionizer::split(vec![Bytes::from_static(b"A\n"), Bytes::new()]).unwrap_err();
        assert!(matches!(err, AnnotatorError::EmptyLine { line: 2 }));
    }

    #[test]
    fn unterminated_last_line_is_kept_verbatim() {
        let sections = Sectionizer::split(lines(&["A\n", "B"])).unwrap();
        assert_eq!(sections[1].lines()[0], Bytes::from_static(b"B"));
    }

    #[test]
    fn output_interleaves_hints_after_their_line() {
        let mut section = Section::with_header(Bytes::from_static(b"H\n"));
        section.push(Bytes::from_static(b"  b\n"));
        section.push_hint_after(0, Bytes::from_static(b"h0\n"));
        section.push_hint(Bytes::from_static(b"end\n"));
        section.push_hint_after(0, Bytes::from_static(b"h0b\n"));
        assert_eq!(section.hint_count(), 3);
        assert_eq!(concat(&section.into_output()), b"H\nh0\nh0b\n  b\nend\n".to_vec());
    }

    #[test]
    fn hint_after_unterminated_line_starts_on_new_line() {
        let mut section = Section::with_header(Bytes::from_static(b"last"));
        section.push_hint(Bytes::from_static(b"hint\n"));
        section.push_hint(Bytes::from_static(b"more\n"));
        assert_eq!(concat(&section.into_output()), b"last\nhint\nmore\n".to_vec());
    }

    #[test]
    fn line_text_strips_terminators() {
        assert_eq!(line_text(b"abc\r\n"), "abc");
        assert_eq!(line_text(b"abc\n"), "abc");
        assert_eq!(line_text(b"abc"), "abc");
        assert_eq!(line_text(b"\xffok\n"), "\u{fffd}ok");
    }

    #[test]
    fn header_detection() {
        assert!(is_header(b"Foo\n"));
        assert!(!is_header(b"  bar\n"));
        assert!(!is_header(b"\n"));
        assert!(!is_header(b"\r\n"));
        assert!(!is_header(b""));
    }
}
