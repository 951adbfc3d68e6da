use std::io;
use std::path::PathBuf;

/// 探测器及其读取器对外暴露的错误
///
/// “无法识别类型”不是错误，而是 `None` 结果。
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// 路径（或阻塞流背后的文件）不存在或无法打开
    #[error("the file must be local and exist{}", display_path(.path))]
    NotLocalOrMissing {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },

    /// 文件已打开，但读取嗅探窗口失败
    #[error("failed to read sniff window from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 流在可读之前即出错
    #[error("stream failed before its head could be read")]
    StreamRead(#[source] io::Error),
}

impl DetectError {
    pub(crate) fn not_local(path: Option<PathBuf>, source: io::Error) -> Self {
        Self::NotLocalOrMissing { path, source }
    }

    pub(crate) fn missing(path: PathBuf) -> Self {
        Self::NotLocalOrMissing {
            path: Some(path),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        }
    }

    pub fn is_not_local(&self) -> bool {
        matches!(self, Self::NotLocalOrMissing { .. })
    }

    pub fn is_stream_error(&self) -> bool {
        matches!(self, Self::StreamRead(_))
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(": {}", path.display()),
        None => String::new(),
    }
}
