//! 주석 전략 -- 섹션 단위 주석 인터페이스와 힌트 라인 포매팅
//!
//! 두 가지 전략이 [`Annotate`] 트레이트 뒤에서 설정으로 선택됩니다.
//! - [`LineAnnotator`]: 라인마다 모든 라인 규칙을 적용하고 매칭된 라인 바로 뒤에 힌트 삽입
//! - [`SectionAnnotator`]: 섹션 규칙으로 섹션 전체를 검사하고 섹션 끝에 힌트 추가
//!
//! 두 전략 모두 원본 라인을 변경하거나 제거하지 않습니다.

pub mod line;
pub mod section;

pub use line::LineAnnotator;
pub use section::SectionAnnotator;

use std::sync::Arc;

use bytes::Bytes;

use crate::section::Section;
use crate::style::{Palette, Style};

/// 규칙 문서에 접두어가 없을 때 사용하는 기본 태그
pub const DEFAULT_TAG: &str = "[sleuth]";

/// 섹션 주석 전략
///
/// 구현체는 섹션을 소유권으로 받아 힌트를 추가한 뒤 돌려줍니다.
/// 여러 파이프라인 태스크에서 공유되므로 `Send + Sync`여야 합니다.
pub trait Annotate: Send + Sync {
    /// 전략 이름 (로그용)
    fn name(&self) -> &str;

    /// 섹션에 힌트를 추가합니다.
    fn annotate(&self, section: Section) -> Section;
}

/// 힌트 라인 포매터
///
/// 출력 형식은 `"{prefix} {message}\n"`이며, 메시지 본문에는 [`Style::Hint`]가 적용됩니다.
#[derive(Clone)]
pub struct HintFormatter {
    prefix: String,
    palette: Arc<dyn Palette>,
}

impl HintFormatter {
    /// 포매터를 생성합니다.
    ///
    /// `prefix`가 주어지면 그대로 사용하고, 없으면 [`DEFAULT_TAG`]에 [`Style::Tag`]를 적용합니다.
    pub fn new(prefix: Option<&str>, palette: Arc<dyn Palette>) -> Self {
        let prefix = match prefix {
            Some(prefix) => prefix.to_owned(),
            None => palette.paint(Style::Tag, DEFAULT_TAG),
        };
        Self { prefix, palette }
    }

    /// 실제로 출력되는 접두어
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 메시지를 개행으로 끝나는 힌트 라인으로 변환합니다.
    pub fn format(&self, message: &str) -> Bytes {
        let body = self.palette.paint(Style::Hint, message);
        Bytes::from(format!("{} {body}\n", self.prefix))
    }
}

impl std::fmt::Debug for HintFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HintFormatter")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// 주석 처리 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateStats {
    /// 읽은 입력 라인 수
    pub lines: u64,
    /// 출력한 힌트 라인 수
    pub hints: u64,
    /// 처리한 섹션 수 (direct 모드에서는 0)
    pub sections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::{Color, Colorize};
    use serial_test::serial;

    use crate::style::{AnsiPalette, PlainPalette};

    #[test]
    fn default_tag_used_without_prefix() {
        let fmt = HintFormatter::new(None, Arc::new(PlainPalette));
        assert_eq!(fmt.prefix(), "[sleuth]");
        assert_eq!(&fmt.format("Unknown error foo")[..], b"[sleuth] Unknown error foo\n");
    }

    #[test]
    #[serial]
    fn document_prefix_used_verbatim() {
        colored::control::set_override(true);
        let fmt = HintFormatter::new(Some("[ros]"), Arc::new(AnsiPalette::default()));
        let line = fmt.format("hint");
        colored::control::unset_override();

        assert!(line.starts_with(b"[ros] \x1b["));
        assert!(line.ends_with(b"\x1b[0m\n"));
    }

    #[test]
    #[serial]
    fn ansi_palette_colors_default_tag() {
        colored::control::set_override(true);
        let fmt = HintFormatter::new(None, Arc::new(AnsiPalette::new(Color::Red, Color::Cyan)));
        let expected_tag = "[sleuth]".red().bold().to_string();
        let expected_hint = "x".cyan().to_string();
        let line = fmt.format("x");
        colored::control::unset_override();

        assert_eq!(fmt.prefix(), expected_tag);
        assert_eq!(&line[..], format!("{expected_tag} {expected_hint}\n").as_bytes());
    }
}
