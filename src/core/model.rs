//! 领域数据模型 (Domain Model)

use bon::Builder;
use serde::Serialize;
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

/// 缺省端口
pub const DEFAULT_PORT: &str = "443";

/// 缺省路径
pub const DEFAULT_PATH: &str = "/?ed=2560";

/// 规范化后的地址条目 (Address Record)
///
/// `host` 不含方括号，`port` 为纯数字字符串，`remark` 若存在则非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub host: String,
    pub port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl AddressRecord {
    pub fn new(host: impl Into<String>, port: impl Into<String>, remark: Option<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            remark,
        }
    }

    /// 条目自身端口优先，否则回退到给定默认值
    pub fn port_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self.port.trim() {
            "" => fallback,
            port => port,
        }
    }
}

/// 传输层类型 (Transport)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Transport {
    #[default]
    Ws,
    Tcp,
    Http,
}

impl Transport {
    /// 是否需要携带 host/path 伪装字段
    pub fn carries_host_path(self) -> bool {
        matches!(self, Transport::Ws | Transport::Http)
    }
}

/// 链接输出格式 (Link Format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkFormat {
    #[default]
    Vless,
    Vmess,
}

/// 标准模式参数 (Standard Parameters)
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct StandardParameters {
    #[builder(into)]
    pub host: String,
    #[builder(into)]
    pub uuid: String,
    #[builder(into, default = DEFAULT_PATH.to_string())]
    pub path: String,
    /// 为空时使用 `host`
    #[builder(into)]
    pub sni: Option<String>,
    #[builder(default)]
    pub transport: Transport,
    #[builder(default)]
    pub format: LinkFormat,
    #[builder(into)]
    pub alpn: Option<String>,
}

impl StandardParameters {
    pub fn sni(&self) -> &str {
        match self.sni.as_deref().map(str::trim) {
            Some(sni) if !sni.is_empty() => sni,
            _ => &self.host,
        }
    }

    pub fn alpn(&self) -> Option<&str> {
        self.alpn.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

/// VMess 负载字段 (有序，未知字段原样透传)
pub type VmessFields = Map<String, Value>;

/// VLESS 模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlessTemplate {
    /// `vless://` 与首个 `@` 之间的内容，原样复制
    pub user_info: String,
    /// 主机段之后的全部内容 (路径、查询串、片段)
    pub suffix: String,
    pub default_port: String,
}

/// VMess 模板
#[derive(Debug, Clone, PartialEq)]
pub struct VmessTemplate {
    pub base_fields: VmessFields,
    pub original_port_was_numeric: bool,
}

impl VmessTemplate {
    /// 模板自身的端口文本，缺失时为 443
    pub fn original_port(&self) -> String {
        match self.base_fields.get("port") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => DEFAULT_PORT.to_string(),
        }
    }
}

/// 链接模板 (Link Template)
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTemplate {
    Vless(VlessTemplate),
    Vmess(VmessTemplate),
}

impl LinkTemplate {
    pub fn format(&self) -> LinkFormat {
        match self {
            LinkTemplate::Vless(_) => LinkFormat::Vless,
            LinkTemplate::Vmess(_) => LinkFormat::Vmess,
        }
    }
}

/// 链接合成来源：标准参数或模板，二者互斥
#[derive(Debug, Clone, PartialEq)]
pub enum LinkSource {
    Standard(StandardParameters),
    Template(LinkTemplate),
}
