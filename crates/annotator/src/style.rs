//! 출력 스타일 -- 의미 단위 스타일을 터미널 색상으로 변환합니다.
//!
//! 주석 엔진은 색상 코드를 직접 알지 못하고 주입된 [`Palette`]에 스타일링을 위임합니다.
//! 파이프로 연결된 출력이나 테스트에서는 [`PlainPalette`]를 사용합니다.
//!
//! [`AnsiPalette`]는 `colored`로 색을 입히므로 실제 이스케이프 출력 여부는
//! `colored::control` 전역 설정(`NO_COLOR`, `CLICOLOR_FORCE`, `set_override`)을 따릅니다.

use std::sync::Arc;

use colored::{Color, Colorize};

/// 의미 단위 스타일
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// 기본 메시지 접두어 (`[sleuth]`)
    Tag,
    /// 힌트 본문
    Hint,
}

/// 스타일을 적용하는 포매팅 기능
pub trait Palette: Send + Sync {
    /// `text`에 `style`을 적용한 문자열을 반환합니다.
    fn paint(&self, style: Style, text: &str) -> String;
}

/// 스타일을 적용하지 않는 팔레트
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPalette;

impl Palette for PlainPalette {
    fn paint(&self, _style: Style, text: &str) -> String {
        text.to_owned()
    }
}

/// 터미널 색상 팔레트
#[derive(Debug, Clone, Copy)]
pub struct AnsiPalette {
    tag: Color,
    hint: Color,
}

impl AnsiPalette {
    /// 태그와 힌트 색상을 지정합니다. 태그는 항상 굵게 표시됩니다.
    pub fn new(tag: Color, hint: Color) -> Self {
        Self { tag, hint }
    }
}

impl Default for AnsiPalette {
    /// 굵은 파란색 태그, 노란색 힌트
    fn default() -> Self {
        Self::new(Color::Blue, Color::Yellow)
    }
}

impl Palette for AnsiPalette {
    fn paint(&self, style: Style, text: &str) -> String {
        match style {
            Style::Tag => text.color(self.tag).bold().to_string(),
            Style::Hint => text.color(self.hint).to_string(),
        }
    }
}

/// 색상 사용 여부에 맞는 팔레트를 생성합니다.
pub fn palette_for(color: bool) -> Arc<dyn Palette> {
    if color {
        Arc::new(AnsiPalette::default())
    } else {
        Arc::new(PlainPalette)
    }
}
