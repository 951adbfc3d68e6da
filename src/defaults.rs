//! 调用方提供的默认值及其解析

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::detection::DetectionResult;
use crate::registry::{mime_essence, normalize_extension, Registry};

/// 默认值：仅在注册表与内容嗅探都无法识别输入时使用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultSpec {
    /// MIME 字符串或扩展名
    Token(String),
    Fields(DefaultFields),
}

/// 结构化默认值。`type` 与 `mime` 同义，仅在 `mime` 缺失时使用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

impl DefaultSpec {
    pub fn ext(ext: impl Into<String>) -> Self {
        Self::Fields(DefaultFields {
            ext: Some(ext.into()),
            ..Default::default()
        })
    }

    pub fn mime(mime: impl Into<String>) -> Self {
        Self::Fields(DefaultFields {
            mime: Some(mime.into()),
            ..Default::default()
        })
    }

    pub fn pair(ext: impl Into<String>, mime: impl Into<String>) -> Self {
        Self::Fields(DefaultFields {
            ext: Some(ext.into()),
            mime: Some(mime.into()),
            type_: None,
        })
    }

    /// 对动态类型的值进行分类：仅字符串与对象可作为默认值，
    /// 数组、数字、布尔值与 null 均视为缺省
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(token) => Some(Self::Token(token.clone())),
            Value::Object(_) => serde_json::from_value(value.clone()).ok().map(Self::Fields),
            _ => None,
        }
    }

    /// 解析为与注册表一致的结果
    pub fn resolve(&self, registry: &dyn Registry) -> Option<DetectionResult> {
        match self {
            Self::Token(token) => resolve_token(token, registry),
            Self::Fields(fields) => resolve_fields(fields, registry),
        }
    }
}

impl From<&str> for DefaultSpec {
    fn from(value: &str) -> Self {
        Self::Token(value.to_string())
    }
}

impl From<String> for DefaultSpec {
    fn from(value: String) -> Self {
        Self::Token(value)
    }
}

impl From<DefaultFields> for DefaultSpec {
    fn from(value: DefaultFields) -> Self {
        Self::Fields(value)
    }
}

fn resolve_token(token: &str, registry: &dyn Registry) -> Option<DetectionResult> {
    if let Some(mime) = present(Some(token)).and_then(mime_essence) {
        if let Some(ext) = registry.extension_for_mime(&mime) {
            return Some(DetectionResult { ext, mime });
        }
    }
    let ext = normalize_extension(token)?;
    let mime = registry.mime_for_extension(&ext)?;
    Some(DetectionResult { ext, mime })
}

fn resolve_fields(fields: &DefaultFields, registry: &dyn Registry) -> Option<DetectionResult> {
    if let Some(ext) = present(fields.ext.as_deref()).and_then(normalize_extension) {
        if let Some(mime) = registry.mime_for_extension(&ext) {
            return Some(DetectionResult { ext, mime });
        }
    }
    let mime = present(fields.mime.as_deref()).or_else(|| present(fields.type_.as_deref()))?;
    let mime = mime_essence(mime)?;
    let ext = registry.extension_for_mime(&mime)?;
    Some(DetectionResult { ext, mime })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
