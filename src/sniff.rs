//! 基于魔数的内容嗅探

use crate::common::detection::DetectionResult;

/// 根据内容前导字节识别格式
pub trait ContentSniffer {
    /// 识别到签名时返回 `{ext, mime}`
    fn sniff(&self, bytes: &[u8]) -> Option<DetectionResult>;
}

/// 基于 `infer` 签名表的嗅探器
#[derive(Debug, Clone, Copy, Default)]
pub struct InferSniffer;

impl ContentSniffer for InferSniffer {
    fn sniff(&self, bytes: &[u8]) -> Option<DetectionResult> {
        if bytes.is_empty() {
            return None;
        }
        infer::get(bytes).map(|kind| DetectionResult::new(kind.extension(), kind.mime_type()))
    }
}
