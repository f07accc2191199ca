//! 模板链接解析 (Template Link Parsing)
//!
//! 把现成的 VLESS/VMess 链接拆成可复用模板：除主机与端口外的所有部分原样保留。

use serde_json::Value;

use crate::core::error::{Result, SubError, TemplateIssue};
use crate::core::model::{DEFAULT_PORT, LinkTemplate, VlessTemplate, VmessFields, VmessTemplate};
use crate::engine::address::split_host_port;
use crate::utils::codec;

pub const VLESS_SCHEME: &str = "vless://";
pub const VMESS_SCHEME: &str = "vmess://";

pub fn parse_template(link: &str) -> Result<LinkTemplate> {
    let link = link.trim();
    if link.is_empty() {
        return Err(SubError::InvalidTemplate(TemplateIssue::Empty));
    }

    if let Some(body) = strip_scheme(link, VLESS_SCHEME) {
        parse_vless(body).map(LinkTemplate::Vless)
    } else if let Some(body) = strip_scheme(link, VMESS_SCHEME) {
        parse_vmess(body).map(LinkTemplate::Vmess)
    } else {
        Err(SubError::InvalidTemplate(TemplateIssue::UnsupportedScheme))
    }
}

/// 大小写不敏感地剥离协议头
fn strip_scheme<'a>(link: &'a str, scheme: &str) -> Option<&'a str> {
    let head = link.get(..scheme.len())?;
    head.eq_ignore_ascii_case(scheme).then(|| &link[scheme.len()..])
}

fn parse_vless(body: &str) -> Result<VlessTemplate> {
    let (user_info, remainder) = body
        .split_once('@')
        .ok_or(SubError::InvalidTemplate(TemplateIssue::MissingUserInfo))?;

    let boundary = remainder.find(['/', '?', '#']).unwrap_or(remainder.len());
    let (segment, suffix) = remainder.split_at(boundary);

    let segment = segment.trim();
    if segment.is_empty() {
        return Err(SubError::InvalidTemplate(TemplateIssue::MissingHost));
    }

    let (_, port) = split_host_port(segment)
        .ok_or(SubError::InvalidTemplate(TemplateIssue::MalformedIpv6))?;

    Ok(VlessTemplate {
        user_info: user_info.to_string(),
        suffix: suffix.to_string(),
        default_port: port.unwrap_or(DEFAULT_PORT).to_string(),
    })
}

fn parse_vmess(body: &str) -> Result<VmessTemplate> {
    let payload = body.trim();
    if payload.is_empty() {
        return Err(SubError::InvalidTemplate(TemplateIssue::MissingPayload));
    }

    let decoded = codec::decode_repaired(payload)
        .map_err(|_| SubError::InvalidTemplate(TemplateIssue::UndecodablePayload))?;
    let base_fields: VmessFields = serde_json::from_slice(&decoded)
        .map_err(|_| SubError::InvalidTemplate(TemplateIssue::MalformedPayload))?;

    let original_port_was_numeric = matches!(base_fields.get("port"), Some(Value::Number(_)));

    Ok(VmessTemplate {
        base_fields,
        original_port_was_numeric,
    })
}
