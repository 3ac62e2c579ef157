//! sleuth 주석 엔진 -- 빌드 도구 출력 스트림에 규칙 기반 힌트를 덧붙입니다.
//!
//! 입력 라인은 바이트 그대로 통과하며, 규칙이 매칭된 라인(또는 섹션) 뒤에
//! `"{prefix} {message}"` 형식의 힌트 라인이 삽입됩니다.
//!
//! # 모듈 구성
//!
//! - [`rule`]: YAML 규칙 문서 로딩, 패턴 컴파일, 라인/섹션 매칭
//! - [`section`]: 헤더 + 들여쓰기 라인을 섹션으로 묶는 상태 기계
//! - [`annotate`]: 라인/섹션 주석 전략 ([`Annotate`] trait)과 힌트 포매팅
//! - [`pipeline`]: 섹션 분할 → 주석 → 출력 3단계 동시 실행
//! - [`engine`]: 설정과 규칙을 묶어 표준 입출력에 대해 실행
//! - [`input`]: 원시 라인 리더 (동기/비동기)
//! - [`style`]: 출력 팔레트 (ANSI / plain)
//! - [`config`]: 엔진 설정 (core 설정의 타입 변환)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! direct:   stdin -> LineReader -> LineAnnotator -> stdout
//! pipeline: stdin -> Sectionizer -> Annotate -> Printer -> stdout
//!                      (mpsc)        (mpsc)
//! ```

pub mod annotate;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod rule;
pub mod section;
pub mod style;

// --- 주요 타입 re-export ---

// 엔진
pub use engine::AnnotationEngine;

// 파이프라인
pub use pipeline::{AnnotationPipeline, AnnotationPipelineBuilder};

// 주석 전략
pub use annotate::{Annotate, AnnotateStats, HintFormatter, LineAnnotator, SectionAnnotator};

// 설정
pub use config::{AnnotateMode, AnnotatorConfig, AnnotatorConfigBuilder, ColorChoice, Strategy};

// 에러
pub use error::{AnnotatorError, PatternCompileError};

// 규칙
pub use rule::{CompileMode, Rule, RuleLoader, RuleSet, RuleSource, RulesDocument, SectionRule};

// 섹션
pub use section::{Section, Sectionizer};

// 스타일
pub use style::{AnsiPalette, Palette, PlainPalette, Style};
