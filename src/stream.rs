//! 从流的开头提取嗅探窗口
//!
//! 异步路径通过 [`PeekStream`] 预读，字节保留给流的后续消费者；
//! 同步路径从流背后的本地文件读取窗口。此处从不关闭流。

use std::io;

use bytes::Bytes;

use crate::chunk::{read_chunk, read_file_prefix};
use crate::common::detection::{Chunk, MAX_WINDOW_LENGTH};
use crate::error::DetectError;

mod local;
mod peek;

pub use local::{FileStream, LocalStream};
pub use peek::{PeekReader, PeekStream};

/// 从阻塞流背后的文件读取嗅探窗口
///
/// 已关闭的流或 `len` 为 0 时直接返回 `None`。
/// 所有失败（包括没有本地文件的流）都报告为 [`DetectError::NotLocalOrMissing`]。
pub fn prefix_blocking(stream: &dyn LocalStream, len: usize) -> Result<Option<Chunk>, DetectError> {
    if stream.is_closed() || len == 0 {
        return Ok(None);
    }
    let path = stream.local_path().map(|path| path.to_path_buf());
    if let Some(file) = stream.local_file() {
        return read_file_prefix(file, len)
            .map(Some)
            .map_err(|source| DetectError::not_local(path, source));
    }
    if let Some(path) = path {
        return read_chunk(&path, len).map(Some).map_err(|err| match err {
            DetectError::Read { path, source } => DetectError::not_local(Some(path), source),
            other => other,
        });
    }
    Err(DetectError::not_local(
        None,
        io::Error::new(io::ErrorKind::Unsupported, "stream is not backed by a local file"),
    ))
}

/// 预读异步流的嗅探窗口
///
/// `len` 为 0 或流在产生任何字节前结束时返回 `None`。
/// 流在可读前出错时返回 [`DetectError::StreamRead`]。
pub async fn prefix_async<S>(stream: &mut S, len: usize) -> Result<Option<Bytes>, DetectError>
where
    S: PeekStream + ?Sized,
{
    if len == 0 {
        return Ok(None);
    }
    let len = len.min(MAX_WINDOW_LENGTH);
    let head = stream.peek_head(len).await.map_err(DetectError::StreamRead)?;
    if head.is_empty() {
        tracing::debug!("[Stream] Stream ended before producing any bytes");
        return Ok(None);
    }
    Ok(Some(head))
}
