//! 本地文件的存在性检查与有界前缀读取
//!
//! 同步与异步读取器均从偏移 0 读取至多一个嗅探窗口，任何退出路径上都会释放文件句柄。
//! 读取不足窗口长度不视为错误。

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::common::detection::{Chunk, MAX_WINDOW_LENGTH};
use crate::error::DetectError;

mod normalize;

pub use normalize::normalize_path;

/// 检查路径是否存在（不打开文件）
pub fn exists(path: impl AsRef<Path>) -> bool {
    normalize_path(path.as_ref()).try_exists().unwrap_or(false)
}

/// [`exists`] 的异步版本
pub async fn exists_async(path: impl AsRef<Path>) -> bool {
    tokio::fs::try_exists(normalize_path(path.as_ref()))
        .await
        .unwrap_or(false)
}

/// 读取 `path` 处文件的前 `len` 个字节（不超过 [`MAX_WINDOW_LENGTH`]）
///
/// 路径不存在或无法打开时返回 [`DetectError::NotLocalOrMissing`]，
/// 读取本身失败时返回 [`DetectError::Read`]。
pub fn read_chunk(path: impl AsRef<Path>, len: usize) -> Result<Chunk, DetectError> {
    let path = normalize_path(path.as_ref());
    if !path.try_exists().unwrap_or(false) {
        return Err(DetectError::missing(path));
    }
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(source) => return Err(DetectError::not_local(Some(path), source)),
    };
    // 句柄随作用域结束关闭
    match read_window(file, len) {
        Ok(chunk) => {
            tracing::trace!("[Chunk] Read {} bytes from {}", chunk.bytes_read, path.display());
            Ok(chunk)
        }
        Err(source) => Err(DetectError::Read { path, source }),
    }
}

/// [`read_chunk`] 的异步版本，读取语义一致
pub async fn read_chunk_async(path: impl AsRef<Path>, len: usize) -> Result<Chunk, DetectError> {
    let len = len.min(MAX_WINDOW_LENGTH);
    let path = normalize_path(path.as_ref());
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(DetectError::missing(path));
    }
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(source) => return Err(DetectError::not_local(Some(path), source)),
    };
    let mut buffer = Vec::with_capacity(len);
    let result = file.take(len as u64).read_to_end(&mut buffer).await;
    match result {
        Ok(_) => {
            tracing::trace!("[Chunk] Read {} bytes from {}", buffer.len(), path.display());
            Ok(Chunk::from_buffer(buffer))
        }
        Err(source) => Err(DetectError::Read { path, source }),
    }
}

/// 从已打开文件的偏移 0 读取至多 `len` 个字节
///
/// 读取后恢复句柄的游标位置，句柄保持打开。
pub fn read_file_prefix(file: &File, len: usize) -> io::Result<Chunk> {
    let mut handle = file;
    let position = handle.stream_position()?;
    handle.seek(SeekFrom::Start(0))?;
    let result = read_window(handle, len);
    handle.seek(SeekFrom::Start(position))?;
    result
}

fn read_window<R: Read>(reader: R, len: usize) -> io::Result<Chunk> {
    let len = len.min(MAX_WINDOW_LENGTH);
    let mut buffer = Vec::with_capacity(len);
    reader.take(len as u64).read_to_end(&mut buffer)?;
    Ok(Chunk::from_buffer(buffer))
}
