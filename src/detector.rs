//! 探测流水线：依次查询注册表、嗅探内容、回退到调用方默认值

use std::path::Path;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::chunk;
use crate::common::detection::{Chunk, DetectionResult, MAX_WINDOW_LENGTH, SNIFF_WINDOW_LENGTH};
use crate::config::Settings;
use crate::defaults::DefaultSpec;
use crate::error::DetectError;
use crate::input::{AsyncInput, Input};
use crate::registry::{MimeGuessRegistry, Registry};
use crate::sniff::{ContentSniffer, InferSniffer};
use crate::stream;

/// 读取路径或阻塞流失败时的处理策略
///
/// 无论采用哪种策略，不存在的路径总是回退到默认值，异步流出错总是返回错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// 视为“无签名”，继续回退到默认值
    #[default]
    Lenient,
    /// 将错误返回给调用方
    Strict,
}

/// 识别路径、缓冲区与流的 MIME 类型和扩展名
#[derive(Clone)]
pub struct Detector {
    window_length: usize,
    policy: ErrorPolicy,
    sniffer: Arc<dyn ContentSniffer + Send + Sync>,
    registry: Arc<dyn Registry + Send + Sync>,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            window_length: SNIFF_WINDOW_LENGTH,
            policy: ErrorPolicy::default(),
            sniffer: Arc::new(InferSniffer),
            registry: Arc::new(MimeGuessRegistry),
        }
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("window_length", &self.window_length)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::default()
            .with_window_length(settings.sniff.window_length)
            .with_policy(settings.sniff.error_policy)
    }

    /// 设置嗅探窗口长度，超过 [`MAX_WINDOW_LENGTH`] 时截断
    pub fn with_window_length(mut self, window_length: usize) -> Self {
        if window_length > MAX_WINDOW_LENGTH {
            tracing::warn!(
                "[Detect] Window length {} capped at {}",
                window_length,
                MAX_WINDOW_LENGTH
            );
        }
        self.window_length = window_length.min(MAX_WINDOW_LENGTH);
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sniffer(mut self, sniffer: impl ContentSniffer + Send + Sync + 'static) -> Self {
        self.sniffer = Arc::new(sniffer);
        self
    }

    pub fn with_registry(mut self, registry: impl Registry + Send + Sync + 'static) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// 同步探测
    ///
    /// 输入无法识别且默认值缺失或无法解析时返回 `Ok(None)`
    pub fn detect<'a>(
        &self,
        input: impl Into<Input<'a>>,
        default: Option<&DefaultSpec>,
    ) -> Result<Option<DetectionResult>, DetectError> {
        let input = input.into();
        tracing::trace!("[Detect] Classified input as {}", input.kind());

        let sniffed = match input {
            Input::Absent => None,
            Input::Path(token) => {
                if let Some(hit) = self.lookup(token) {
                    return Ok(Some(hit));
                }
                self.read_path(token)?
                    .and_then(|chunk| self.sniff(chunk.as_bytes()))
            }
            Input::Bytes(bytes) => self.sniff(bytes),
            Input::Stream(source) => {
                let chunk = match stream::prefix_blocking(source, self.window_length) {
                    Ok(chunk) => chunk,
                    Err(err) => self.recover(err)?,
                };
                chunk.and_then(|chunk| self.sniff(chunk.as_bytes()))
            }
        };

        Ok(sniffed.or_else(|| self.resolve_default(default)))
    }

    /// 异步探测，仅在文件系统调用与等待流可读时挂起
    pub async fn detect_async<'a>(
        &self,
        input: impl Into<AsyncInput<'a>>,
        default: Option<&DefaultSpec>,
    ) -> Result<Option<DetectionResult>, DetectError> {
        let input = input.into();
        tracing::trace!("[Detect] Classified input as {}", input.kind());

        let sniffed = match input {
            AsyncInput::Absent => None,
            AsyncInput::Path(token) => {
                if let Some(hit) = self.lookup(token) {
                    return Ok(Some(hit));
                }
                self.read_path_async(token)
                    .await?
                    .and_then(|chunk| self.sniff(chunk.as_bytes()))
            }
            AsyncInput::Bytes(bytes) => self.sniff(bytes),
            AsyncInput::Stream(source) => stream::prefix_async(source, self.window_length)
                .await?
                .and_then(|head| self.sniff(&head)),
        };

        Ok(sniffed.or_else(|| self.resolve_default(default)))
    }

    /// 通过本探测器的注册表解析默认值
    pub fn resolve_default(&self, default: Option<&DefaultSpec>) -> Option<DetectionResult> {
        let resolved = default?.resolve(self.registry.as_ref());
        match &resolved {
            Some(result) => tracing::debug!("[Detect] Fell back to default {}", result),
            None => tracing::debug!("[Detect] Default did not resolve"),
        }
        resolved
    }

    fn lookup(&self, token: &str) -> Option<DetectionResult> {
        let hit = self.registry.lookup(token);
        if let Some(result) = &hit {
            tracing::debug!("[Detect] Registry resolved {:?} to {}", token, result);
        }
        hit
    }

    fn sniff(&self, bytes: &[u8]) -> Option<DetectionResult> {
        let window = &bytes[..bytes.len().min(self.window_length)];
        if window.is_empty() {
            return None;
        }
        let sniffed = self.sniffer.sniff(window);
        match &sniffed {
            Some(result) => tracing::debug!("[Detect] Sniffed {}", result),
            None => tracing::trace!("[Detect] No signature in {} bytes", window.len()),
        }
        sniffed
    }

    fn read_path(&self, token: &str) -> Result<Option<Chunk>, DetectError> {
        let path = Path::new(token);
        if self.window_length == 0 {
            return Ok(None);
        }
        if !chunk::exists(path) {
            tracing::debug!("[Detect] {} does not exist", path.display());
            return Ok(None);
        }
        match chunk::read_chunk(path, self.window_length) {
            Ok(chunk) => Ok(Some(chunk)),
            Err(err) => self.recover(err),
        }
    }

    async fn read_path_async(&self, token: &str) -> Result<Option<Chunk>, DetectError> {
        let path = Path::new(token);
        if self.window_length == 0 {
            return Ok(None);
        }
        if !chunk::exists_async(path).await {
            tracing::debug!("[Detect] {} does not exist", path.display());
            return Ok(None);
        }
        match chunk::read_chunk_async(path, self.window_length).await {
            Ok(chunk) => Ok(Some(chunk)),
            Err(err) => self.recover(err),
        }
    }

    fn recover<T>(&self, err: DetectError) -> Result<Option<T>, DetectError> {
        if self.policy == ErrorPolicy::Strict || err.is_stream_error() {
            return Err(err);
        }
        tracing::warn!("[Detect] Continuing without a signature: {}", err);
        Ok(None)
    }
}

static SHARED: OnceLock<Detector> = OnceLock::new();

fn shared() -> &'static Detector {
    SHARED.get_or_init(Detector::default)
}

/// 使用默认探测器进行同步探测
pub fn detect<'a>(
    input: impl Into<Input<'a>>,
    default: Option<&DefaultSpec>,
) -> Result<Option<DetectionResult>, DetectError> {
    shared().detect(input, default)
}

/// 使用默认探测器进行异步探测
pub async fn detect_async<'a>(
    input: impl Into<AsyncInput<'a>>,
    default: Option<&DefaultSpec>,
) -> Result<Option<DetectionResult>, DetectError> {
    shared().detect_async(input, default).await
}

#[cfg(test)]
mod tests;
