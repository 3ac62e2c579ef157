//! 파이프라인 오케스트레이션 -- 섹션 분할/주석/출력 3단계를 동시에 실행합니다.
//!
//! # 내부 아키텍처
//! ```text
//! reader -> Sectionizer -> mpsc -> Annotate -> mpsc -> Printer -> writer
//! ```
//!
//! 각 채널은 FIFO이고 각 단계는 섹션 단위 1:1 변환이므로 출력 순서는 입력 순서와 같습니다.
//! 채널 용량이 작아 출력이 느리면 주석 단계, 분할 단계, 입력 읽기 순으로 역압이 전파됩니다.
//! 각 단계는 입력 쪽이 모두 소진된 뒤에만 송신자를 drop 하여 하류 채널을 닫습니다.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::annotate::{Annotate, AnnotateStats};
use crate::error::AnnotatorError;
use crate::input::AsyncLineReader;
use crate::section::{Section, Sectionizer};

/// 기본 채널 용량
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// 3단계 주석 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use sleuth_annotator::pipeline::AnnotationPipelineBuilder;
///
/// let pipeline = AnnotationPipelineBuilder::new()
///     .annotator(annotator)
///     .channel_capacity(16)
///     .build()?;
///
/// let stats = pipeline.run(reader, writer).await?;
/// ```
pub struct AnnotationPipeline {
    annotator: Arc<dyn Annotate>,
    channel_capacity: usize,
}

impl AnnotationPipeline {
    /// 사용 중인 주석 전략 이름
    pub fn strategy_name(&self) -> &str {
        self.annotator.name()
    }

    /// 단계 간 채널 용량
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// 입력 스트림이 끝날 때까지 파이프라인을 실행합니다.
    ///
    /// 세 단계가 모두 종료된 뒤 반환합니다. 여러 단계가 실패하면 채널 닫힘으로 인한
    /// 2차 에러보다 원인 에러를 우선하여 보고합니다.
    ///
    /// # Errors
    /// - 입력 읽기 실패 (`StreamRead`), 빈 라인 (`EmptyLine`)
    /// - 출력 쓰기 실패 (`Io`)
    /// - 단계 태스크 비정상 종료 (`Task`)
    pub async fn run<R, W>(&self, reader: R, writer: W) -> Result<AnnotateStats, AnnotatorError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (section_tx, section_rx) = mpsc::channel(self.channel_capacity);
        let (annotated_tx, annotated_rx) = mpsc::channel(self.channel_capacity);

        tracing::debug!(
            strategy = self.annotator.name(),
            channel_capacity = self.channel_capacity,
            "starting annotation pipeline"
        );

        let sectionizer = tokio::spawn(sectionize_stage(reader, section_tx));
        let annotator = tokio::spawn(annotate_stage(
            Arc::clone(&self.annotator),
            section_rx,
            annotated_tx,
        ));
        let printer = tokio::spawn(print_stage(writer, annotated_rx));

        let (sectionized, annotated, printed) = tokio::join!(sectionizer, annotator, printer);
        let sectionized = flatten(sectionized, "sectionizer");
        let annotated = flatten(annotated, "annotator");
        let printed = flatten(printed, "printer");

        match (sectionized, annotated, printed) {
            (Ok((lines, sections)), Ok(_), Ok(hints)) => {
                let stats = AnnotateStats {
                    lines,
                    hints,
                    sections,
                };
                tracing::debug!(
                    lines = stats.lines,
                    sections = stats.sections,
                    hints = stats.hints,
                    "annotation pipeline finished"
                );
                Ok(stats)
            }
            (s, a, p) => {
                let errors = [s.err(), a.err(), p.err()].into_iter().flatten();
                Err(root_cause(errors).unwrap_or_else(|| {
                    AnnotatorError::Task("pipeline failed without an error".to_owned())
                }))
            }
        }
    }
}

/// 실패한 단계들의 에러 중 원인 에러를 고릅니다.
///
/// 채널 에러가 아닌 첫 에러를 우선하며, 모두 채널 에러이면 첫 에러를 반환합니다.
pub fn root_cause<I>(errors: I) -> Option<AnnotatorError>
where
    I: IntoIterator<Item = AnnotatorError>,
{
    let mut first = None;
    for err in errors {
        if !err.is_channel() {
            return Some(err);
        }
        if first.is_none() {
            first = Some(err);
        }
    }
    first
}

fn flatten<T>(
    joined: Result<Result<T, AnnotatorError>, JoinError>,
    stage: &str,
) -> Result<T, AnnotatorError> {
    joined.map_err(|e| AnnotatorError::Task(format!("{stage}: {e}")))?
}

async fn send(
    tx: &mpsc::Sender<Section>,
    section: Section,
    stage: &str,
) -> Result<(), AnnotatorError> {
    tx.send(section)
        .await
        .map_err(|_| AnnotatorError::Channel(format!("{stage}: downstream stage closed")))
}

/// 입력을 섹션으로 분할하여 전달합니다. (읽은 라인 수, 섹션 수)를 반환합니다.
async fn sectionize_stage<R>(
    reader: R,
    tx: mpsc::Sender<Section>,
) -> Result<(u64, u64), AnnotatorError>
where
    R: AsyncBufRead + Unpin,
{
    let mut reader = AsyncLineReader::new(reader);
    let mut sectionizer = Sectionizer::new();
    let mut sections = 0u64;

    while let Some(line) = reader.next_line().await? {
        if let Some(closed) = sectionizer.push(line)? {
            send(&tx, closed, "sectionizer").await?;
            sections += 1;
        }
    }

    if let Some(last) = sectionizer.finish() {
        send(&tx, last, "sectionizer").await?;
        sections += 1;
    }

    tracing::trace!(lines = sectionizer.line_count(), sections, "sectionizer drained");
    Ok((sectionizer.line_count(), sections))
}

/// 섹션마다 주석을 붙여 전달합니다. 처리한 섹션 수를 반환합니다.
async fn annotate_stage(
    annotator: Arc<dyn Annotate>,
    mut rx: mpsc::Receiver<Section>,
    tx: mpsc::Sender<Section>,
) -> Result<u64, AnnotatorError> {
    let mut count = 0u64;
    while let Some(section) = rx.recv().await {
        let annotated = annotator.annotate(section);
        send(&tx, annotated, "annotator").await?;
        count += 1;
    }
    tracing::trace!(sections = count, "annotator drained");
    Ok(count)
}

/// 섹션을 순서대로 출력합니다. 출력한 힌트 라인 수를 반환합니다.
async fn print_stage<W>(mut writer: W, mut rx: mpsc::Receiver<Section>) -> Result<u64, AnnotatorError>
where
    W: AsyncWrite + Unpin,
{
    let mut hints = 0u64;
    while let Some(section) = rx.recv().await {
        hints += section.hint_count() as u64;
        for chunk in section.into_output() {
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;
    }
    writer.shutdown().await?;
    tracing::trace!(hints, "printer drained");
    Ok(hints)
}

/// 파이프라인 빌더
pub struct AnnotationPipelineBuilder {
    annotator: Option<Arc<dyn Annotate>>,
    channel_capacity: usize,
}

impl AnnotationPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            annotator: None,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// 주석 전략을 설정합니다.
    pub fn annotator(mut self, annotator: Arc<dyn Annotate>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// 단계 간 채널 용량을 설정합니다.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// 파이프라인을 생성합니다.
    ///
    /// # Errors
    /// 주석 전략이 없거나 채널 용량이 0인 경우
    pub fn build(self) -> Result<AnnotationPipeline, AnnotatorError> {
        let annotator = self.annotator.ok_or_else(|| AnnotatorError::Config {
            field: "annotator".to_owned(),
            reason: "an annotation strategy is required".to_owned(),
        })?;

        if self.channel_capacity == 0 {
            return Err(AnnotatorError::Config {
                field: "channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(AnnotationPipeline {
            annotator,
            channel_capacity: self.channel_capacity,
        })
    }
}

impl Default for AnnotationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
