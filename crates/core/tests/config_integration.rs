//! sleuth.toml 통합 설정 테스트
//!
//! - sleuth.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::fs;

use sleuth_core::config::SleuthConfig;
use sleuth_core::error::{ConfigError, SleuthError};

// =============================================================================
// sleuth.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../sleuth.toml.example");
    let config = SleuthConfig::parse(content).expect("example config should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../sleuth.toml.example");
    let from_file = SleuthConfig::parse(content).expect("should parse");
    let from_code = SleuthConfig::default();

    assert_eq!(from_file.general.log_level, from_code.general.log_level);
    assert_eq!(from_file.general.log_format, from_code.general.log_format);

    assert_eq!(from_file.annotate.rules, from_code.annotate.rules);
    assert_eq!(from_file.annotate.mode, from_code.annotate.mode);
    assert_eq!(from_file.annotate.strategy, from_code.annotate.strategy);
    assert_eq!(from_file.annotate.strict, from_code.annotate.strict);
    assert_eq!(from_file.annotate.color, from_code.annotate.color);
    assert_eq!(
        from_file.annotate.channel_capacity,
        from_code.annotate.channel_capacity
    );
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
log_format = "json"
"#;
    let config = SleuthConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    // annotate 섹션은 기본값
    assert_eq!(config.annotate.mode, "direct");
}

#[test]
fn partial_config_pipeline_section_strategy() {
    let toml = r#"
[annotate]
mode = "pipeline"
strategy = "section"
channel_capacity = 4
"#;
    let config = SleuthConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.annotate.strategy, "section");
    assert_eq!(config.annotate.channel_capacity, 4);
    assert_eq!(config.general.log_level, "warn");
}

#[test]
fn unknown_color_choice_fails_validation() {
    let toml = r#"
[annotate]
color = "rainbow"
"#;
    let config = SleuthConfig::parse(toml).expect("should parse");
    let err = config.validate().expect_err("should reject color");
    assert!(matches!(
        err,
        SleuthError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "annotate.color"
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[annotate]
mode = "direct"
"#;

    let original = std::env::var("SLEUTH_ANNOTATE_MODE").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SLEUTH_ANNOTATE_MODE", "pipeline");
    }

    let mut config = SleuthConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.annotate.mode.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SLEUTH_ANNOTATE_MODE", val),
            None => std::env::remove_var("SLEUTH_ANNOTATE_MODE"),
        }
    }

    assert_eq!(result, "pipeline");
}

#[test]
#[serial_test::serial]
fn env_override_bool_field() {
    let original = std::env::var("SLEUTH_ANNOTATE_STRICT").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SLEUTH_ANNOTATE_STRICT", "true");
    }

    let mut config = SleuthConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.annotate.strict;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SLEUTH_ANNOTATE_STRICT", val),
            None => std::env::remove_var("SLEUTH_ANNOTATE_STRICT"),
        }
    }

    assert!(result);
}

#[test]
#[serial_test::serial]
fn env_override_numeric_field() {
    let original = std::env::var("SLEUTH_ANNOTATE_CHANNEL_CAPACITY").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SLEUTH_ANNOTATE_CHANNEL_CAPACITY", "256");
    }

    let mut config = SleuthConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.annotate.channel_capacity;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SLEUTH_ANNOTATE_CHANNEL_CAPACITY", val),
            None => std::env::remove_var("SLEUTH_ANNOTATE_CHANNEL_CAPACITY"),
        }
    }

    assert_eq!(result, 256);
}

#[tokio::test]
#[serial_test::serial]
async fn load_applies_env_then_validates() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("sleuth.toml");
    fs::write(&path, "[annotate]\nmode = \"pipeline\"\n").expect("should write config");

    let original = std::env::var("SLEUTH_ANNOTATE_STRATEGY").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SLEUTH_ANNOTATE_STRATEGY", "section");
    }

    let result = SleuthConfig::load(&path).await;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SLEUTH_ANNOTATE_STRATEGY", val),
            None => std::env::remove_var("SLEUTH_ANNOTATE_STRATEGY"),
        }
    }

    let config = result.expect("pipeline + section should be valid");
    assert_eq!(config.annotate.strategy, "section");
}

// =============================================================================
// 에러 케이스
// =============================================================================

#[tokio::test]
async fn empty_file_loads_defaults() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("empty.toml");
    fs::write(&path, "").expect("should write empty file");

    let config = SleuthConfig::from_file(&path)
        .await
        .expect("empty file should use defaults");
    assert_eq!(config.annotate.mode, "direct");
}

#[tokio::test]
async fn malformed_file_returns_parse_error() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("bad.toml");
    fs::write(&path, "[annotate\nmode = \"direct\"\n").expect("should write bad config");

    let err = SleuthConfig::from_file(&path)
        .await
        .expect_err("malformed TOML should fail");
    assert!(matches!(
        err,
        SleuthError::Config(ConfigError::ParseFailed { .. })
    ));
}

#[test]
fn wrong_type_returns_parse_error() {
    let err = SleuthConfig::parse("[annotate]\nstrict = \"yes\"\n").expect_err("should fail");
    assert!(matches!(
        err,
        SleuthError::Config(ConfigError::ParseFailed { .. })
    ));
}
