use serde::{Deserialize, Serialize};

/// 内容嗅探所需的前导字节数，可覆盖所有支持的格式
/// 调用方预分配缓冲区时应使用该值
pub const SNIFF_WINDOW_LENGTH: usize = 262;

/// 嗅探窗口上限（64 KiB），配置值超过该上限会被拒绝或截断
pub const MAX_WINDOW_LENGTH: usize = 64 * 1024;

/// 识别结果：`{ext, mime}` 二元组
///
/// 两个字段总是同时存在。来自注册表的结果可经注册表互相推导；
/// 来自内容嗅探的结果沿用嗅探器自身的配对。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetectionResult {
    pub ext: String,
    pub mime: String,
}

impl DetectionResult {
    pub fn new(ext: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            ext: ext.into(),
            mime: mime.into(),
        }
    }
}

impl std::fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.mime, self.ext)
    }
}

/// 从文件或流中读取嗅探窗口的结果
///
/// `buffer` 恰好包含 `bytes_read` 个字节。长度为 0 的 Chunk 是合法结果
/// （空文件），表示“没有可用的签名”。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chunk {
    pub bytes_read: usize,
    pub buffer: Vec<u8>,
}

impl Chunk {
    pub(crate) fn from_buffer(buffer: Vec<u8>) -> Self {
        Self {
            bytes_read: buffer.len(),
            buffer,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.bytes_read]
    }

    pub fn is_empty(&self) -> bool {
        self.bytes_read == 0
    }
}
