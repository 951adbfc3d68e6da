use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::common::detection::{MAX_WINDOW_LENGTH, SNIFF_WINDOW_LENGTH};
use crate::detector::ErrorPolicy;

/// 探测器配置总结构
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    #[serde(default)]
    pub sniff: SniffSettings,
}

/// 内容嗅探相关配置（窗口长度、I/O 失败处理策略）
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SniffSettings {
    /// 嗅探窗口长度（单位：字节），默认 262，上限 64 KiB
    /// 为 0 时不读取任何内容，直接回退到默认值
    pub window_length: usize,
    /// 路径 / 流读取失败时是否向调用方抛出错误
    pub error_policy: ErrorPolicy,
}

impl Default for SniffSettings {
    fn default() -> Self {
        Self {
            window_length: SNIFF_WINDOW_LENGTH,
            error_policy: ErrorPolicy::Lenient,
        }
    }
}

impl Settings {
    /// 加载配置：支持默认值、可选配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name("mime-sniff").required(false))
            .add_source(Environment::with_prefix("MIME_SNIFF").separator("__"));

        let config = builder.build()?;
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(
            "[Config] window_length={} error_policy={:?}",
            settings.sniff.window_length,
            settings.sniff.error_policy
        );
        Ok(settings)
    }

    /// 从指定配置文件加载（文件必须存在），不读取环境变量
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .add_source(File::from(path.as_ref()).required(true))
            .build()?;
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验配置取值范围
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sniff.window_length <= MAX_WINDOW_LENGTH,
            "sniff.window_length {} exceeds the maximum of {} bytes",
            self.sniff.window_length,
            MAX_WINDOW_LENGTH
        );
        Ok(())
    }

    fn defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            // 默认值（代码内硬编码）
            .set_default("sniff.window_length", SNIFF_WINDOW_LENGTH as u64)?
            .set_default("sniff.error_policy", "lenient")?)
    }
}
