#![no_main]

use libfuzzer_sys::fuzz_target;
use sleuth_annotator::rule::{CompileMode, RuleLoader, RuleSet};

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        if let Ok(document) = RuleLoader::parse_yaml(yaml_str, "fuzz-input.yml") {
            // 잘못된 패턴은 lenient 모드에서 제외될 뿐 크래시는 안 됨
            let _ = RuleSet::build(&document, CompileMode::Lenient);
        }
    }
});
