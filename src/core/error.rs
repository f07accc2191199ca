//! 错误处理体系 (Error Handling System)
//!
//! 定义模板解析失败原因、领域错误类型、错误类别以及全局 Result 别名。

use thiserror::Error;

/// 模板链接拒绝原因 (Template Rejection Reasons)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateIssue {
    /// 模板链接为空
    Empty,
    /// 协议头既不是 vless:// 也不是 vmess://
    UnsupportedScheme,
    /// VLESS 链接缺少 `@` 分隔符
    MissingUserInfo,
    /// 主机段为空
    MissingHost,
    /// IPv6 方括号未闭合
    MalformedIpv6,
    /// VMess 负载为空
    MissingPayload,
    /// VMess 负载在补齐后仍无法解码
    UndecodablePayload,
    /// VMess 负载不是 JSON 对象
    MalformedPayload,
}

impl std::fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateIssue::Empty => write!(f, "template link is empty"),
            TemplateIssue::UnsupportedScheme => {
                write!(f, "only VLESS and VMess template links are supported")
            }
            TemplateIssue::MissingUserInfo => write!(f, "VLESS link is missing the \"@\" segment"),
            TemplateIssue::MissingHost => write!(f, "VLESS link is missing a host"),
            TemplateIssue::MalformedIpv6 => write!(f, "VLESS link has a malformed IPv6 host"),
            TemplateIssue::MissingPayload => write!(f, "VMess link is missing its payload"),
            TemplateIssue::UndecodablePayload => write!(f, "VMess payload is not valid base64"),
            TemplateIssue::MalformedPayload => write!(f, "VMess payload is not a JSON object"),
        }
    }
}

/// 错误类别 (Error Categories)
///
/// 调用方据此统一映射响应，而非匹配错误文本。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Decode,
    Upstream,
    Internal,
}

/// 全局错误定义 (Subscription Domain Errors)
#[derive(Error, Debug)]
pub enum SubError {
    #[error("Invalid template: {0}")]
    InvalidTemplate(TemplateIssue),

    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream {url} failed: {reason}")]
    Upstream { url: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    Query(#[from] serde_urlencoded::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, SubError>;

impl SubError {
    /// 归类错误
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubError::InvalidTemplate(TemplateIssue::UndecodablePayload) => ErrorKind::Decode,
            SubError::InvalidTemplate(_) | SubError::Validation(_) | SubError::Query(_) => {
                ErrorKind::Validation
            }
            SubError::Decode(_) => ErrorKind::Decode,
            SubError::Upstream { .. } | SubError::Network(_) => ErrorKind::Upstream,
            SubError::Serialization(_) | SubError::Config(_) | SubError::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn upstream(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        SubError::Upstream {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
