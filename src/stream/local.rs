use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// 可能由本地文件支撑的阻塞流
///
/// 同步探测器无法原地预读流，因此改为从流背后的文件读取嗅探窗口。
/// 既没有文件句柄也没有路径的流无法嗅探。
pub trait LocalStream {
    /// 流的来源路径
    fn local_path(&self) -> Option<&Path> {
        None
    }

    /// 流正在读取的文件句柄
    fn local_file(&self) -> Option<&File> {
        None
    }

    /// 已关闭的流不产生 Chunk
    fn is_closed(&self) -> bool {
        false
    }
}

impl LocalStream for File {
    fn local_file(&self) -> Option<&File> {
        Some(self)
    }
}

/// 本地文件上的阻塞读取流
///
/// 由路径创建的流在首次读取时才打开文件。
#[derive(Debug)]
pub struct FileStream {
    path: Option<PathBuf>,
    file: Option<File>,
    closed: bool,
}

impl FileStream {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            path: Some(path),
            file: Some(file),
            closed: false,
        })
    }

    /// 基于 `path` 创建流，暂不打开文件
    pub fn lazy(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            file: None,
            closed: false,
        }
    }

    pub fn from_file(file: File) -> Self {
        Self {
            path: None,
            file: Some(file),
            closed: false,
        }
    }

    /// 释放文件句柄，之后的读取均返回流结束
    pub fn close(&mut self) {
        self.file = None;
        self.closed = true;
    }
}

impl From<File> for FileStream {
    fn from(file: File) -> Self {
        Self::from_file(file)
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }
        if self.file.is_none() {
            if let Some(path) = &self.path {
                self.file = Some(File::open(path)?);
            }
        }
        match self.file.as_mut() {
            Some(file) => file.read(buf),
            None => Ok(0),
        }
    }
}

impl LocalStream for FileStream {
    fn local_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn local_file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
