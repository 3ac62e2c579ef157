//! 주석 엔진 -- 설정, 규칙 모음, 주석 전략을 묶어 표준 입출력에 대해 실행합니다.

use std::sync::Arc;

use crate::annotate::{Annotate, AnnotateStats, HintFormatter, LineAnnotator, SectionAnnotator};
use crate::config::{AnnotateMode, AnnotatorConfig, Strategy};
use crate::error::AnnotatorError;
use crate::pipeline::{AnnotationPipeline, AnnotationPipelineBuilder};
use crate::rule::{RuleLoader, RuleSet};
use crate::style::palette_for;

/// 주석 엔진
///
/// 규칙 모음은 시작 시 한 번 구성되며 실행 동안 읽기 전용으로 공유됩니다.
pub struct AnnotationEngine {
    config: AnnotatorConfig,
    rules: Arc<RuleSet>,
}

impl AnnotationEngine {
    /// 규칙 문서를 로드하고 컴파일하여 엔진을 생성합니다.
    ///
    /// 입력을 읽기 전에 호출되므로 여기서 발생한 에러는 어떤 출력보다 먼저 보고됩니다.
    ///
    /// # Errors
    /// - 규칙 문서 로딩 실패 (`ConfigFetch`, `ConfigParse`)
    /// - strict 모드에서 패턴 컴파일 실패 (`InvalidPatterns`)
    pub async fn load(config: AnnotatorConfig) -> Result<Self, AnnotatorError> {
        config.validate()?;
        let document = RuleLoader::load(&config.rules).await?;
        let rules = RuleSet::build(&document, config.compile_mode)?;

        tracing::info!(
            source = %config.rules,
            mode = %config.mode,
            strategy = %config.strategy,
            rules = rules.rule_count(),
            "annotation engine ready"
        );

        Ok(Self::with_rules(config, rules))
    }

    /// 이미 구성된 규칙 모음으로 엔진을 생성합니다.
    pub fn with_rules(config: AnnotatorConfig, rules: RuleSet) -> Self {
        Self {
            config,
            rules: Arc::new(rules),
        }
    }

    /// 엔진 설정
    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// 컴파일된 규칙 모음
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 힌트 포매터를 생성합니다. 설정의 접두어가 규칙 문서의 접두어보다 우선합니다.
    pub fn formatter(&self, color: bool) -> HintFormatter {
        let prefix = self.config.prefix.as_deref().or(self.rules.prefix());
        HintFormatter::new(prefix, palette_for(color))
    }

    /// 라인 단위 주석기를 생성합니다.
    pub fn line_annotator(&self, color: bool) -> LineAnnotator {
        LineAnnotator::new(Arc::clone(&self.rules), self.formatter(color))
    }

    /// 설정된 전략의 주석기를 생성합니다.
    pub fn annotator(&self, color: bool) -> Arc<dyn Annotate> {
        match self.config.strategy {
            Strategy::Line => Arc::new(self.line_annotator(color)),
            Strategy::Section => Arc::new(SectionAnnotator::new(
                Arc::clone(&self.rules),
                self.formatter(color),
            )),
        }
    }

    /// 설정된 전략과 채널 용량으로 파이프라인을 생성합니다.
    pub fn pipeline(&self, color: bool) -> Result<AnnotationPipeline, AnnotatorError> {
        AnnotationPipelineBuilder::new()
            .annotator(self.annotator(color))
            .channel_capacity(self.config.channel_capacity)
            .build()
    }

    /// 표준 입력을 끝까지 읽어 주석을 붙여 표준 출력에 씁니다.
    ///
    /// direct 모드는 blocking 스레드에서 동기 루프로, pipeline 모드는 3개 태스크로 실행됩니다.
    pub async fn run_stdio(&self) -> Result<AnnotateStats, AnnotatorError> {
        let color = self.config.color.resolve();
        colored::control::set_override(color);
        tracing::debug!(color, choice = %self.config.color, "resolved hint coloring");

        match self.config.mode {
            AnnotateMode::Direct => {
                let annotator = self.line_annotator(color);
                tokio::task::spawn_blocking(move || {
                    let stdin = std::io::stdin();
                    let stdout = std::io::stdout();
                    annotator.process(stdin.lock(), stdout.lock())
                })
                .await
                .map_err(|e| AnnotatorError::Task(format!("direct annotator: {e}")))?
            }
            AnnotateMode::Pipeline => {
                let pipeline = self.pipeline(color)?;
                let reader = tokio::io::BufReader::new(tokio::io::stdin());
                pipeline.run(reader, tokio::io::stdout()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotatorConfigBuilder;
    use crate::rule::{CompileMode, RuleSource};

    const RULES: &str = "message_prefix: '[ros]'\nline_rules:\n  - pattern: 'error: (\\w+)'\n    message: 'Unknown error $1'\n";

    fn engine(config: AnnotatorConfig) -> AnnotationEngine {
        let doc = RuleLoader::parse_yaml(RULES, "rules.yml").unwrap();
        AnnotationEngine::with_rules(config, RuleSet::build(&doc, CompileMode::Strict).unwrap())
    }

    #[test]
    fn document_prefix_used_by_default() {
        let engine = engine(AnnotatorConfig::default());
        assert_eq!(engine.formatter(false).prefix(), "[ros]");
    }

    #[test]
    fn configured_prefix_overrides_document() {
        let config = AnnotatorConfigBuilder::new().prefix("[ci]").build().unwrap();
        let engine = engine(config);
        assert_eq!(engine.formatter(true).prefix(), "[ci]");
    }

    #[test]
    fn strategy_selects_annotator() {
        let config = AnnotatorConfigBuilder::new()
            .mode(AnnotateMode::Pipeline)
            .strategy(Strategy::Section)
            .build()
            .unwrap();
        let engine = engine(config);
        assert_eq!(engine.annotator(false).name(), "section");
        assert_eq!(engine.pipeline(false).unwrap().strategy_name(), "section");
    }

    #[tokio::test]
    async fn load_reads_rule_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        tokio::fs::write(&path, RULES).await.unwrap();

        let config = AnnotatorConfigBuilder::new()
            .rules(RuleSource::Path(path))
            .build()
            .unwrap();
        let engine = AnnotationEngine::load(config).await.unwrap();
        assert_eq!(engine.rules().rule_count(), 1);
    }

    #[tokio::test]
    async fn load_strict_rejects_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yml");
        tokio::fs::write(&path, "line_rules:\n  - pattern: '[bad'\n    message: x\n")
            .await
            .unwrap();

        let config = AnnotatorConfigBuilder::new()
            .rules(RuleSource::Path(path))
            .compile_mode(CompileMode::Strict)
            .build()
            .unwrap();
        let err = AnnotationEngine::load(config).await.err().unwrap();
        assert!(matches!(err, AnnotatorError::InvalidPatterns(_)));
    }
}
