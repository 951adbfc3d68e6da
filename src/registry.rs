//! 扩展名 <-> MIME 双向查询

use mime_guess::Mime;

use crate::common::detection::DetectionResult;

/// 探测器使用的静态扩展名 / MIME 映射表
pub trait Registry {
    /// 返回 `ext` 对应的 MIME（前导点可选）
    fn mime_for_extension(&self, ext: &str) -> Option<String>;

    /// 返回 `mime` 对应的规范扩展名
    fn extension_for_mime(&self, mime: &str) -> Option<String>;

    /// 解析原始字符串：路径、扩展名（可带点）或 MIME 字符串
    /// 扩展名优先于 MIME 解析
    fn lookup(&self, token: &str) -> Option<DetectionResult> {
        if let Some(ext) = extension_of(token) {
            if let Some(mime) = self.mime_for_extension(ext) {
                let ext = self
                    .extension_for_mime(&mime)
                    .unwrap_or_else(|| ext.to_ascii_lowercase());
                return Some(DetectionResult { ext, mime });
            }
        }
        let essence = mime_essence(token)?;
        let ext = self.extension_for_mime(&essence)?;
        Some(DetectionResult::new(ext, essence))
    }
}

/// 基于 `mime_guess` 数据表的注册表实现
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeGuessRegistry;

impl Registry for MimeGuessRegistry {
    fn mime_for_extension(&self, ext: &str) -> Option<String> {
        let ext = normalize_extension(ext)?;
        mime_guess::from_ext(&ext).first_raw().map(str::to_string)
    }

    fn extension_for_mime(&self, mime: &str) -> Option<String> {
        let essence = mime_essence(mime)?;
        if let Some(ext) = preferred_extension(&essence) {
            return Some(ext.to_string());
        }
        let candidates = mime_guess::get_mime_extensions_str(&essence)?;
        candidates
            .iter()
            .find(|ext| mime_guess::from_ext(ext).first_raw() == Some(essence.as_str()))
            .or_else(|| candidates.first())
            .map(|ext| ext.to_string())
    }
}

/// 提取字符串所指的扩展名
///
/// `c:/a.jpg`、`a.jpg`、`.jpg` 与 `jpg` 均得到 `jpg`。
/// 含路径分隔符且最后一段不含点的字符串没有扩展名。
pub fn extension_of(token: &str) -> Option<&str> {
    let token = token.trim();
    let (segment, has_separator) = match token.rfind(|c| c == '/' || c == '\\') {
        Some(idx) => (&token[idx + 1..], true),
        None => (token, false),
    };
    let ext = match segment.rfind('.') {
        Some(idx) => &segment[idx + 1..],
        None if !has_separator => segment,
        None => return None,
    };
    (!ext.is_empty()).then_some(ext)
}

/// MIME 字符串的小写 `type/subtype`，丢弃参数部分
pub fn mime_essence(value: &str) -> Option<String> {
    let mime: Mime = value.trim().parse().ok()?;
    Some(mime.essence_str().to_ascii_lowercase())
}

pub(crate) fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// 以下类型在 `mime_guess` 中的扩展名顺序不可用，手动指定规范扩展名
fn preferred_extension(essence: &str) -> Option<&'static str> {
    let ext = match essence {
        "application/octet-stream" => "bin",
        "application/javascript" | "text/javascript" => "js",
        "application/xml" | "text/xml" => "xml",
        "application/json" => "json",
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "text/html" => "html",
        "text/markdown" => "md",
        "image/jpeg" => "jpg",
        "image/tiff" => "tif",
        "image/svg+xml" => "svg",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/mp4" => "m4a",
        "video/mp4" => "mp4",
        "video/mpeg" => "mpeg",
        "video/quicktime" => "mov",
        _ => return None,
    };
    Some(ext)
}
