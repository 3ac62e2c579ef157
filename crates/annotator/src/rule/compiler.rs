//! 패턴 컴파일러 -- 규칙 패턴을 캡처 가능한 정규식으로 변환합니다.
//!
//! 규칙 작성자는 전체 라인 정규식이 아니라 부분 패턴만 작성합니다.
//! 컴파일러는 패턴을 `.*?(?:pattern).*` 형태로 감싸 라인 어디에서든 매칭되게 합니다.
//! 앞쪽 와일드카드는 lazy이므로 캡처 그룹의 위치는 비앵커 검색과 동일합니다.

use regex::{Captures, Regex};

use crate::error::PatternCompileError;

/// 컴파일된 규칙 패턴
///
/// 원본 패턴에서 결정적으로 유도되며 생성 이후 변경되지 않습니다.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// 작성자가 적은 원본 패턴
    raw: String,
    /// 와일드카드로 감싼 정규식
    regex: Regex,
}

impl CompiledPattern {
    /// 원본 패턴을 반환합니다.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 감싼 형태의 정규식 문자열을 반환합니다.
    pub fn wrapped(&self) -> &str {
        self.regex.as_str()
    }

    /// 캡처 그룹 수를 반환합니다 (그룹 0 제외).
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// 라인 텍스트에 매칭되는지 확인합니다.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// 라인 텍스트에 매칭하여 캡처를 반환합니다.
    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }

    /// 매칭되면 템플릿의 캡처 참조를 치환한 메시지를 반환합니다.
    ///
    /// 매칭되지 않은 그룹이나 존재하지 않는 그룹은 빈 문자열로 치환됩니다.
    pub fn expand(&self, text: &str, template: &str) -> Option<String> {
        self.captures(text)
            .map(|caps| expand_template(&caps, template))
    }
}

/// 캡처를 템플릿에 치환합니다 (`$1`, `${1}`, `$name`, `$$`).
pub fn expand_template(caps: &Captures<'_>, template: &str) -> String {
    let mut message = String::with_capacity(template.len());
    caps.expand(template, &mut message);
    message
}

/// 패턴 컴파일러
pub struct PatternCompiler;

impl PatternCompiler {
    /// 원본 패턴을 컴파일합니다.
    ///
    /// 원본을 먼저 단독으로 컴파일하여 에러가 작성자의 패턴 기준으로 보고되게 하고,
    /// 이후 감싼 형태를 컴파일합니다.
    ///
    /// # Errors
    /// 패턴 문법이 잘못된 경우 원본 패턴을 담은 [`PatternCompileError`]를 반환합니다.
    pub fn compile(raw: &str) -> Result<CompiledPattern, PatternCompileError> {
        Regex::new(raw).map_err(|e| compile_error(raw, &e))?;

        let regex = Regex::new(&format!(".*?(?:{raw}).*")).map_err(|e| compile_error(raw, &e))?;

        Ok(CompiledPattern {
            raw: raw.to_owned(),
            regex,
        })
    }
}

fn compile_error(raw: &str, err: &regex::Error) -> PatternCompileError {
    PatternCompileError {
        pattern: raw.to_owned(),
        reason: err.to_string(),
    }
}
