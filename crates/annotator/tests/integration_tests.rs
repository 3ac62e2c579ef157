//! 통합 테스트 -- 규칙 문서 로딩부터 주석 출력까지의 전체 흐름 검증

use serial_test::serial;
use tokio::io::AsyncReadExt;

use sleuth_annotator::{
    AnnotateMode, AnnotationEngine, AnnotatorConfigBuilder, AnnotatorError, CompileMode,
    RuleLoader, RuleSet, RuleSource, Sectionizer, Strategy,
};

const ROS_RULES: &str = r#"
message_prefix: "[ros]"
line_rules:
  - pattern: 'error: (\w+)'
    message: 'Unknown error $1'
  - pattern: "undefined reference to `(\\w+)'"
    message: 'Missing symbol $1, check target_link_libraries'
  - pattern: 'undefined reference'
    message: 'Linker error'
section_rules:
  - line: 1
    pattern: 'Could not find a package configuration file provided by "(\w+)"'
    hints:
      - 'Install the ROS package for $1'
      - 'Then re-run the build'
"#;

async fn write_rules(dir: &tempfile::TempDir, content: &str) -> RuleSource {
    let path = dir.path().join("rules.yml");
    tokio::fs::write(&path, content).await.expect("write rules");
    RuleSource::Path(path)
}

async fn engine(mode: AnnotateMode, strategy: Strategy) -> (AnnotationEngine, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_rules(&dir, ROS_RULES).await;
    let config = AnnotatorConfigBuilder::new()
        .rules(source)
        .mode(mode)
        .strategy(strategy)
        .build()
        .expect("config");
    let engine = AnnotationEngine::load(config).await.expect("engine");
    (engine, dir)
}

fn run_direct(engine: &AnnotationEngine, input: &[u8]) -> String {
    let mut out = Vec::new();
    engine
        .line_annotator(false)
        .process(input, &mut out)
        .expect("direct run");
    String::from_utf8(out).expect("utf8")
}

async fn run_pipeline(engine: &AnnotationEngine, input: &'static [u8]) -> String {
    let pipeline = engine.pipeline(false).expect("pipeline");
    let (client, mut server) = tokio::io::duplex(1 << 16);
    pipeline.run(input, client).await.expect("pipeline run");
    let mut out = Vec::new();
    server.read_to_end(&mut out).await.expect("read output");
    String::from_utf8(out).expect("utf8")
}

/// 매칭된 라인 바로 뒤에 치환된 힌트가 출력되는지 확인
#[tokio::test]
async fn test_direct_mode_substitution() {
    let (engine, _dir) = engine(AnnotateMode::Direct, Strategy::Line).await;
    let out = run_direct(&engine, b"[ 10%] Building\nerror: foo\n[100%] Done\n");
    assert_eq!(
        out,
        "[ 10%] Building\nerror: foo\n[ros] Unknown error foo\n[100%] Done\n"
    );
}

/// 한 라인에 여러 규칙이 매칭되면 선언 순서대로 모두 출력
#[tokio::test]
async fn test_multi_match_declaration_order() {
    let (engine, _dir) = engine(AnnotateMode::Direct, Strategy::Line).await;
    let out = run_direct(&engine, b"main.cpp:(.text+0x1f): undefined reference to `foo'\n");
    assert_eq!(
        out,
        "main.cpp:(.text+0x1f): undefined reference to `foo'\n\
         [ros] Missing symbol foo, check target_link_libraries\n\
         [ros] Linker error\n"
    );
}

/// 매칭이 없는 입력은 바이트 그대로 통과
#[tokio::test]
async fn test_pass_through_without_matches() {
    let (engine, _dir) = engine(AnnotateMode::Direct, Strategy::Line).await;
    let input = "-- Configuring done\r\n-- Generating done\n\tcompiled \u{00e9}t\u{00e9}\n";
    assert_eq!(run_direct(&engine, input.as_bytes()), input);
}

/// pipeline 모드의 라인 전략은 direct 모드와 같은 출력을 생성
#[tokio::test]
async fn test_pipeline_line_strategy_matches_direct() {
    let input: &'static [u8] = b"Scanning\n  error: alpha\n  detail\nerror: beta\nlast line";
    let (direct, _d1) = engine(AnnotateMode::Direct, Strategy::Line).await;
    let (piped, _d2) = engine(AnnotateMode::Pipeline, Strategy::Line).await;
    assert_eq!(run_direct(&direct, input), run_pipeline(&piped, input).await);
}

/// section 전략은 섹션 끝에 고정 힌트를 추가
#[tokio::test]
async fn test_pipeline_section_strategy() {
    let (engine, _dir) = engine(AnnotateMode::Pipeline, Strategy::Section).await;
    let input: &'static [u8] = b"CMake Error at CMakeLists.txt:9 (find_package):\n  \
Could not find a package configuration file provided by \"roscpp\" with any\n  \
of the following names:\n\n-- Configuring incomplete\n";
    let out = run_pipeline(&engine, input).await;
    assert_eq!(
        out,
        "CMake Error at CMakeLists.txt:9 (find_package):\n  \
Could not find a package configuration file provided by \"roscpp\" with any\n  \
of the following names:\n\n\
[ros] Install the ROS package for roscpp\n\
[ros] Then re-run the build\n\
-- Configuring incomplete\n"
    );
}

/// 섹션 분할 예시: 헤더 + 들여쓰기 라인이 한 섹션
#[test]
fn test_section_grouping() {
    let sections = Sectionizer::split(["Foo\n", "  bar\n", "  baz\n", "Qux\n"].map(Into::into))
        .expect("split");
    let grouped: Vec<Vec<&[u8]>> = sections
        .iter()
        .map(|s| s.lines().iter().map(|l| &l[..]).collect())
        .collect();
    assert_eq!(
        grouped,
        vec![
            vec![&b"Foo\n"[..], b"  bar\n", b"  baz\n"],
            vec![&b"Qux\n"[..]],
        ]
    );
}

/// "Not Found" 응답 본문 같은 문서는 파싱 에러
#[tokio::test]
async fn test_not_found_document_is_config_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_rules(&dir, ":error: Not Found").await;
    let err = RuleLoader::load(&source).await.expect_err("must fail");
    assert!(matches!(err, AnnotatorError::ConfigParse { .. }));
}

/// 빈 문서는 파싱 에러
#[tokio::test]
async fn test_empty_document_is_config_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_rules(&dir, "").await;
    let err = RuleLoader::load(&source).await.expect_err("must fail");
    assert!(matches!(err, AnnotatorError::ConfigParse { .. }));
}

/// 존재하지 않는 파일은 가져오기 에러
#[tokio::test]
async fn test_missing_document_is_config_fetch_error() {
    let config = AnnotatorConfigBuilder::new()
        .rules(RuleSource::parse("/nonexistent/sleuth/rules.yml"))
        .build()
        .expect("config");
    let err = AnnotationEngine::load(config).await.err().expect("must fail");
    assert!(matches!(err, AnnotatorError::ConfigFetch { .. }));
}

/// lenient 모드는 잘못된 패턴만 제외, strict 모드는 전체 실패
#[tokio::test]
async fn test_strict_vs_lenient_compile() {
    let yaml = "line_rules:\n  - pattern: '[bad'\n    message: never\n  - pattern: 'warning: (.*)'\n    message: 'W: $1'\n";
    let doc = RuleLoader::parse_yaml(yaml, "mixed.yml").expect("parse");

    let lenient = RuleSet::build(&doc, CompileMode::Lenient).expect("lenient build");
    assert_eq!(lenient.line_rules().len(), 1);
    assert_eq!(lenient.messages_for("warning: unused x"), vec!["W: unused x"]);

    let strict = RuleSet::build(&doc, CompileMode::Strict);
    assert!(matches!(strict, Err(AnnotatorError::InvalidPatterns(_))));
}

/// lenient 모드는 실패한 패턴을 첫 번째만이 아니라 모두 선언 순서대로 보고
#[tokio::test]
async fn test_lenient_compile_reports_every_failure() {
    let yaml = "line_rules:\n  - pattern: '[bad'\n    message: a\n  - pattern: 'warning: (.*)'\n    message: 'W: $1'\n  - pattern: '(worse'\n    message: c\n";
    let doc = RuleLoader::parse_yaml(yaml, "mixed.yml").expect("parse");

    let set = RuleSet::build(&doc, CompileMode::Lenient).expect("lenient build");
    assert_eq!(set.line_rules().len(), 1);
    let failed: Vec<&str> = set
        .compile_failures()
        .iter()
        .map(|f| f.pattern.as_str())
        .collect();
    assert_eq!(failed, vec!["[bad", "(worse"]);
}

/// 규칙 하나의 문제는 다른 규칙과 문서 전체에 영향을 주지 않음
#[tokio::test]
async fn test_per_rule_problems_are_isolated() {
    let yaml = "version: 2\nline_rules:\n  - pattern: 'error: (\\w+)'\n    message: 'E $1'\n  - pattern: ''\n    message: seen\nsection_rules:\n  - pattern: 'CMake'\n";
    let doc = RuleLoader::parse_yaml(yaml, "r.yml").expect("document stays usable");

    let set = RuleSet::build(&doc, CompileMode::Lenient).expect("lenient build");
    assert_eq!(set.line_rules().len(), 2);
    assert!(set.section_rules().is_empty());
    assert_eq!(set.compile_failures().len(), 1);
    assert_eq!(set.messages_for("error: foo"), vec!["E foo", "seen"]);
}

/// 색상 팔레트가 적용되어도 원본 라인은 변경되지 않음
#[tokio::test]
#[serial]
async fn test_color_only_affects_hint_lines() {
    let (engine, _dir) = engine(AnnotateMode::Direct, Strategy::Line).await;
    let mut out = Vec::new();
    colored::control::set_override(true);
    let result = engine
        .line_annotator(true)
        .process(&b"error: foo\n"[..], &mut out);
    colored::control::unset_override();
    result.expect("run");
    assert!(out.starts_with(b"error: foo\n[ros] \x1b["));
    assert!(out.ends_with(b"\x1b[0m\n"));
}
