//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化及其层级结构映射，缺省项回退到内置默认值。

use std::path::Path;

use bon::Builder;
use config::{Config, File};
use serde::Deserialize;

use crate::core::error::{Result, SubError};

/// 内置优选 IP 排行接口
pub const DEFAULT_TOP_IP_API: &str = "https://vps789.com/openApi/cfIpTop20";

/// 内置兜底地址列表 (Last-resort Address List)
pub const DEFAULT_FALLBACK_ADDRESSES: &str =
    "time.is:2053#Keaeye提优支持,icook.hk:2083#备用节点,sk.moe:2096#备用节点,142.171.137.37:8443#备用节点";

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct AppConfig {
    /// 上游地址源配置
    #[serde(default)]
    #[builder(default)]
    pub upstream: UpstreamConfig,

    /// 上游全部失败时使用的静态地址列表
    pub static_addresses: Option<String>,

    /// 最终兜底地址列表
    #[serde(default = "default_fallback_addresses")]
    #[builder(default = default_fallback_addresses())]
    pub fallback_addresses: String,

    /// 标准模式下附加的 ALPN，置空则不附加
    #[serde(default = "default_alpn")]
    #[builder(default = default_alpn())]
    pub alpn: String,

    /// 排行榜地址源统一使用的端口
    #[serde(default = "default_top_ip_port")]
    #[builder(default = default_top_ip_port())]
    pub top_ip_port: u16,
}

/// 上游抓取配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct UpstreamConfig {
    /// 纯文本地址列表接口
    #[serde(default)]
    #[builder(default)]
    pub address_apis: Vec<String>,
    /// 排行榜 JSON 接口
    #[serde(default = "default_top_ip_apis")]
    #[builder(default = default_top_ip_apis())]
    pub top_ip_apis: Vec<String>,
    #[serde(default = "default_user_agent")]
    #[builder(default = default_user_agent())]
    pub user_agent: String,
    /// 为空时沿用传输层默认超时
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address_apis: Vec::new(),
            top_ip_apis: default_top_ip_apis(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            static_addresses: None,
            fallback_addresses: default_fallback_addresses(),
            alpn: default_alpn(),
            top_ip_port: default_top_ip_port(),
        }
    }
}

fn default_fallback_addresses() -> String {
    DEFAULT_FALLBACK_ADDRESSES.to_string()
}
fn default_alpn() -> String {
    "h3".to_string()
}
fn default_top_ip_apis() -> Vec<String> {
    vec![DEFAULT_TOP_IP_API.to_string()]
}
fn default_top_ip_port() -> u16 {
    443
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

impl AppConfig {
    /// 从文件系统中加载并解析配置，文件缺失时使用默认值
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref();
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder.build().map_err(SubError::Config)?;
        settings.try_deserialize().map_err(SubError::Config)
    }

    pub fn alpn(&self) -> Option<&str> {
        Some(self.alpn.trim()).filter(|a| !a.is_empty())
    }

    /// 上游全部失败时的替补地址
    pub fn fallback_text(&self) -> &str {
        match self.static_addresses.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => &self.fallback_addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("does-not-exist/config.toml").unwrap();
        assert_eq!(config.alpn(), Some("h3"));
        assert_eq!(config.top_ip_port, 443);
        assert!(config.upstream.address_apis.is_empty());
        assert_eq!(config.upstream.top_ip_apis, vec![DEFAULT_TOP_IP_API]);
        assert!(config.upstream.timeout_secs.is_none());
        assert_eq!(config.fallback_text(), DEFAULT_FALLBACK_ADDRESSES);
    }

    #[test]
    fn test_static_addresses_take_precedence() {
        let config = AppConfig::builder()
            .static_addresses("1.1.1.1:443#a".to_string())
            .build();
        assert_eq!(config.fallback_text(), "1.1.1.1:443#a");

        let blank = AppConfig::builder().static_addresses("  ".to_string()).build();
        assert_eq!(blank.fallback_text(), DEFAULT_FALLBACK_ADDRESSES);
    }

    #[test]
    fn test_builder_matches_serde_defaults() {
        let built = AppConfig::builder().build();
        let loaded = AppConfig::load("does-not-exist/config.toml").unwrap();
        assert_eq!(built.alpn(), Some("h3"));
        assert_eq!(built.alpn, loaded.alpn);
        assert_eq!(built.upstream.top_ip_apis, loaded.upstream.top_ip_apis);
        assert_eq!(built.upstream.user_agent, loaded.upstream.user_agent);

        let disabled = AppConfig::builder().alpn("  ".to_string()).build();
        assert_eq!(disabled.alpn(), None);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = std::env::temp_dir().join(format!("subgen-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
alpn = "h2"
top_ip_port = 8443

[upstream]
address_apis = ["https://a.example/list.txt"]
timeout_secs = 10
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.alpn(), Some("h2"));
        assert_eq!(config.upstream.top_ip_apis, vec![DEFAULT_TOP_IP_API]);
        assert_eq!(config.top_ip_port, 8443);
        assert_eq!(config.upstream.address_apis, vec!["https://a.example/list.txt"]);
        assert_eq!(config.upstream.timeout_secs, Some(10));
        assert!(config.upstream.user_agent.starts_with("Mozilla/5.0"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
