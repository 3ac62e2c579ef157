#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sleuth_annotator::rule::{Rule, RuleDefinition};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 작성자 패턴 (컴파일 실패 허용)
    pattern: String,
    /// `$1`, `${name}` 등을 포함할 수 있는 메시지 템플릿
    message: String,
    /// 매칭 대상 라인
    line: String,
}

fuzz_target!(|input: FuzzInput| {
    let definition = RuleDefinition::new(input.pattern, input.message);

    // 컴파일 실패는 정상 경로
    let Ok(rule) = Rule::compile(&definition) else {
        return;
    };

    // 치환은 크래시 없이 Some/None 반환해야 함
    let _ = rule.message_for(&input.line);
});
