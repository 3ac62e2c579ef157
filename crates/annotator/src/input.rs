//! 입력 라인 리더 -- 종결자를 포함한 원시 라인 단위로 스트림을 읽습니다.
//!
//! 라인은 읽은 바이트 그대로 보존되므로 UTF-8이 아닌 입력도 변형 없이 통과합니다.
//! 정상적인 스트림 종료는 `Ok(None)`, 읽기 실패는 [`AnnotatorError::StreamRead`]입니다.

use std::io::BufRead;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::AnnotatorError;

/// 동기 라인 리더 (direct 모드)
pub struct LineReader<R> {
    inner: R,
    line_no: u64,
}

impl<R: BufRead> LineReader<R> {
    /// 새 리더를 생성합니다.
    pub fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// 지금까지 읽은 라인 수
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// 다음 라인을 읽습니다. 스트림이 끝나면 `None`을 반환합니다.
    pub fn next_line(&mut self) -> Result<Option<Bytes>, AnnotatorError> {
        let mut buf = Vec::new();
        let n = self
            .inner
            .read_until(b'\n', &mut buf)
            .map_err(|e| AnnotatorError::StreamRead {
                line: self.line_no + 1,
                reason: e.to_string(),
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(Bytes::from(buf)))
    }
}

/// 비동기 라인 리더 (pipeline 모드)
pub struct AsyncLineReader<R> {
    inner: R,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin> AsyncLineReader<R> {
    /// 새 리더를 생성합니다.
    pub fn new(inner: R) -> Self {
        Self { inner, line_no: 0 }
    }

    /// 지금까지 읽은 라인 수
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// 다음 라인을 읽습니다. 스트림이 끝나면 `None`을 반환합니다.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, AnnotatorError> {
        let mut buf = Vec::new();
        let n = self
            .inner
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| AnnotatorError::StreamRead {
                line: self.line_no + 1,
                reason: e.to_string(),
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(Bytes::from(buf)))
    }
}
