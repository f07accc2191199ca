//! 请求参数边界 (Request Boundary)
//!
//! 从查询串或命令行参数提取原始字段，完成必填校验与缺省值填充，产出
//! 二选一的 [`SubscribeRequest`]。

use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::debug;

use crate::core::error::{Result, SubError};
use crate::core::model::{DEFAULT_PATH, LinkFormat, StandardParameters, Transport};

/// 生成模式 (Subscribe Mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SubscribeMode {
    #[default]
    Standard,
    #[strum(to_string = "template", serialize = "link")]
    Template,
}

/// 未经校验的请求字段
#[derive(Debug, Clone, Default)]
pub struct SubscribeQuery {
    pub host: Option<String>,
    pub uuid: Option<String>,
    pub path: Option<String>,
    pub sni: Option<String>,
    /// 查询串中的 `type`
    pub transport: Option<String>,
    pub format: Option<String>,
    pub mode: Option<String>,
    pub template_link: Option<String>,
    pub template: Option<String>,
    pub extra: Option<String>,
}

/// 校验后的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeRequest {
    Standard(StandardParameters),
    Template(String),
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SubscribeQuery {
    /// 解析 `application/x-www-form-urlencoded` 查询串，重复键取首个值
    pub fn from_query(query: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(query.trim_start_matches('?'))?;

        let mut parsed = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "host" => &mut parsed.host,
                "uuid" => &mut parsed.uuid,
                "path" => &mut parsed.path,
                "sni" => &mut parsed.sni,
                "type" => &mut parsed.transport,
                "format" => &mut parsed.format,
                "mode" => &mut parsed.mode,
                "templateLink" => &mut parsed.template_link,
                "template" => &mut parsed.template,
                "extra" => &mut parsed.extra,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        Ok(parsed)
    }

    pub fn mode(&self) -> SubscribeMode {
        non_empty(&self.mode)
            .and_then(|m| SubscribeMode::from_str(m).ok())
            .unwrap_or_default()
    }

    /// 校验必填字段并填充缺省值
    pub fn resolve(&self, alpn: Option<&str>) -> Result<SubscribeRequest> {
        let mode = self.mode();
        debug!(
            %mode,
            template_provided = self.template_link.is_some() || self.template.is_some(),
            extra = ?self.extra,
            "Resolving subscribe request"
        );

        if mode == SubscribeMode::Template {
            let link = non_empty(&self.template_link)
                .or_else(|| non_empty(&self.template))
                .ok_or_else(|| SubError::Validation("missing templateLink parameter".into()))?;
            return Ok(SubscribeRequest::Template(link.to_string()));
        }

        let (Some(host), Some(uuid)) = (non_empty(&self.host), non_empty(&self.uuid)) else {
            return Err(SubError::Validation(
                "missing required parameters: host and uuid".into(),
            ));
        };

        let transport = non_empty(&self.transport)
            .and_then(|t| Transport::from_str(t).ok())
            .unwrap_or_default();

        let format = match non_empty(&self.format) {
            None => LinkFormat::default(),
            Some(f) => LinkFormat::from_str(f)
                .map_err(|_| SubError::Validation(format!("unsupported format: {}", f)))?,
        };

        let params = StandardParameters::builder()
            .host(host)
            .uuid(uuid)
            .path(non_empty(&self.path).unwrap_or(DEFAULT_PATH))
            .sni(non_empty(&self.sni).unwrap_or(host))
            .transport(transport)
            .format(format)
            .maybe_alpn(alpn.map(str::to_string))
            .build();

        Ok(SubscribeRequest::Standard(params))
    }
}
