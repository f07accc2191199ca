//! 地址列表解析 (Address List Parsing)
//!
//! 把多来源拼接的松散文本整理成 [`AddressRecord`] 序列。无法解析的条目直接丢弃。
//!
//! 已知局限：不带方括号且恰好含一个冒号的 IPv6 字面量与 `host:port` 无法区分，
//! 按 `host:port` 处理。

use crate::core::model::{AddressRecord, DEFAULT_PORT};

const DELIMITERS: [char; 6] = [',', '|', '"', '\'', '\r', '\n'];

/// 解析原始地址文本，保持输入顺序且不去重
pub fn parse(raw: &str) -> Vec<AddressRecord> {
    raw.split(DELIMITERS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Option<AddressRecord> {
    let (address, remark) = match token.split_once('#') {
        Some((address, remark)) => (address, Some(remark.trim())),
        None => (token, None),
    };
    let remark = remark.filter(|r| !r.is_empty()).map(str::to_string);

    let (host, port) = split_host_port(address.trim())?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() || host.contains(['[', ']']) {
        return None;
    }

    Some(AddressRecord::new(host, port.unwrap_or(DEFAULT_PORT), remark))
}

/// 拆分主机与端口，方括号未闭合时返回 `None`
///
/// 端口仅在全部为数字时才被采纳。
pub(crate) fn split_host_port(address: &str) -> Option<(&str, Option<&str>)> {
    if let Some(rest) = address.strip_prefix('[') {
        let close = rest.find(']')?;
        let host = rest[..close].trim();
        let port = rest[close + 1..]
            .trim()
            .strip_prefix(':')
            .map(str::trim)
            .filter(|p| is_numeric(p));
        return Some((host, port));
    }

    if address.matches(':').count() == 1
        && let Some((host, port)) = address.rsplit_once(':')
        && is_numeric(port.trim())
    {
        return Some((host.trim(), Some(port.trim())));
    }

    Some((address, None))
}

pub(crate) fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
