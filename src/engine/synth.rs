//! 链接合成 (Link Synthesis)
//!
//! 针对每个地址条目生成一条链接：标准模式从零拼装，模板模式只替换主机与端口。
//! 纯函数，不做 I/O。

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::core::model::{
    AddressRecord, DEFAULT_PORT, LinkFormat, LinkSource, LinkTemplate, StandardParameters,
    VlessTemplate, VmessTemplate,
};
use crate::engine::template::{VLESS_SCHEME, VMESS_SCHEME};
use crate::utils::codec;

/// 与 encodeURIComponent 保持一致的保留字符集
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn synthesize(records: &[AddressRecord], source: &LinkSource) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| match source {
            LinkSource::Template(LinkTemplate::Vless(t)) => vless_from_template(t, record),
            LinkSource::Template(LinkTemplate::Vmess(t)) => vmess_from_template(t, record),
            LinkSource::Standard(params) => match params.format {
                LinkFormat::Vless => standard_vless(params, record, index),
                LinkFormat::Vmess => standard_vmess(params, record, index),
            },
        })
        .collect()
}

/// IPv6 字面量嵌入链接时需要方括号
fn format_host(host: &str) -> String {
    let host = host.trim();
    if (host.starts_with('[') && host.ends_with(']')) || !host.contains(':') {
        host.to_string()
    } else {
        format!("[{}]", host)
    }
}

fn remark_or_default(params: &StandardParameters, record: &AddressRecord, index: usize) -> String {
    match record.remark.as_deref().map(str::trim) {
        Some(remark) if !remark.is_empty() => remark.to_string(),
        _ => format!("{}-{}", params.host, index + 1),
    }
}

fn vmess_link(fields: &Map<String, Value>) -> String {
    format!("{}{}", VMESS_SCHEME, codec::encode(Value::Object(fields.clone()).to_string()))
}

fn vless_from_template(template: &VlessTemplate, record: &AddressRecord) -> String {
    format!(
        "{}{}@{}:{}{}",
        VLESS_SCHEME,
        template.user_info,
        format_host(&record.host),
        record.port_or(&template.default_port),
        template.suffix
    )
}

fn vmess_from_template(template: &VmessTemplate, record: &AddressRecord) -> String {
    let original_port = template.original_port();
    let port = record.port_or(&original_port);

    let mut fields = template.base_fields.clone();
    fields.insert("add".into(), Value::from(record.host.trim()));

    let port_value = if template.original_port_was_numeric {
        match port.parse::<u64>() {
            Ok(n) => Value::from(n),
            Err(_) => template.base_fields.get("port").cloned().unwrap_or(Value::Null),
        }
    } else {
        Value::from(port)
    };
    fields.insert("port".into(), port_value);

    vmess_link(&fields)
}

fn standard_vless(params: &StandardParameters, record: &AddressRecord, index: usize) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("encryption", "none")
        .append_pair("security", "tls")
        .append_pair("fp", "random")
        .append_pair("type", params.transport.as_ref())
        .append_pair("allowInsecure", "1");

    let sni = params.sni();
    if !sni.is_empty() {
        query.append_pair("sni", sni);
    }
    if let Some(alpn) = params.alpn() {
        query.append_pair("alpn", alpn);
    }
    query
        .append_pair("host", &params.host)
        .append_pair("path", &params.path);

    let remark = remark_or_default(params, record, index);
    format!(
        "{}{}@{}:{}?{}#{}",
        VLESS_SCHEME,
        params.uuid,
        format_host(&record.host),
        record.port_or(DEFAULT_PORT),
        query.finish(),
        utf8_percent_encode(&remark, COMPONENT)
    )
}

fn standard_vmess(params: &StandardParameters, record: &AddressRecord, index: usize) -> String {
    let mut fields = Map::new();
    let mut set = |key: &str, value: &str| {
        fields.insert(key.to_string(), Value::from(value));
    };

    set("v", "2");
    set("ps", &remark_or_default(params, record, index));
    set("add", record.host.trim());
    set("port", record.port_or(DEFAULT_PORT));
    set("id", &params.uuid);
    set("aid", "0");
    set("scy", "auto");
    set("net", params.transport.as_ref());
    set("type", "none");
    set("tls", "tls");

    if params.transport.carries_host_path() {
        set("host", &params.host);
        set("path", &params.path);
    }

    let sni = params.sni();
    if !sni.is_empty() {
        set("sni", sni);
    }
    if let Some(alpn) = params.alpn() {
        set("alpn", alpn);
    }
    set("fp", "random");

    vmess_link(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Transport, VmessFields};
    use crate::engine::template::parse_template;

    const UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn record(host: &str, port: &str, remark: Option<&str>) -> AddressRecord {
        AddressRecord::new(host, port, remark.map(str::to_string))
    }

    fn decode_vmess(link: &str) -> VmessFields {
        let payload = link.strip_prefix(VMESS_SCHEME).unwrap();
        serde_json::from_slice(&codec::decode(payload).unwrap()).unwrap()
    }

    fn template_source(link: &str) -> LinkSource {
        LinkSource::Template(parse_template(link).unwrap())
    }

    #[test]
    fn test_template_vless_preserves_suffix() {
        let source = template_source("vless://U@old.host:443?encryption=none#tag");
        let links = synthesize(&[record("1.2.3.4", "2053", None)], &source);
        assert_eq!(links, vec!["vless://U@1.2.3.4:2053?encryption=none#tag"]);
    }

    #[test]
    fn test_template_vless_default_port_and_ipv6() {
        let source = template_source("vless://U@old.host:8443/p?x=1");
        let links = synthesize(&[record("2001:db8::1", "", None)], &source);
        assert_eq!(links, vec!["vless://U@[2001:db8::1]:8443/p?x=1"]);
    }

    #[test]
    fn test_template_vmess_numeric_port_stays_numeric() {
        let base = r#"{"v":"2","ps":"keep","add":"old","port":443,"id":"abc","custom":[1,2]}"#;
        let source = template_source(&format!("vmess://{}", codec::encode(base)));
        let links = synthesize(&[record("1.2.3.4", "2053", None)], &source);

        let fields = decode_vmess(&links[0]);
        assert_eq!(fields["add"], Value::from("1.2.3.4"));
        assert_eq!(fields["port"], Value::from(2053));
        assert_eq!(fields["ps"], Value::from("keep"));
        assert_eq!(fields["custom"], serde_json::json!([1, 2]));
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec!["v", "ps", "add", "port", "id", "custom"]
        );
    }

    #[test]
    fn test_template_vmess_textual_override_falls_back_to_original_number() {
        let template = VmessTemplate {
            base_fields: serde_json::from_str(r#"{"add":"old","port":8443}"#).unwrap(),
            original_port_was_numeric: true,
        };
        let link = vmess_from_template(&template, &record("h", "https", None));
        assert_eq!(decode_vmess(&link)["port"], Value::from(8443));

        let link = vmess_from_template(&template, &record("h", "", None));
        assert_eq!(decode_vmess(&link)["port"], Value::from(8443));
    }

    #[test]
    fn test_template_vmess_textual_port_stays_textual() {
        let base = r#"{"add":"old","port":"443"}"#;
        let source = template_source(&format!("vmess://{}", codec::encode(base)));
        let links = synthesize(&[record("1.2.3.4", "8443", None)], &source);
        assert_eq!(decode_vmess(&links[0])["port"], Value::from("8443"));
    }

    #[test]
    fn test_standard_vless_end_to_end() {
        let params = StandardParameters::builder()
            .host("example.com")
            .uuid(UUID)
            .transport(Transport::Ws)
            .format(LinkFormat::Vless)
            .build();
        let links = synthesize(
            &[record("1.1.1.1", "443", Some("node1"))],
            &LinkSource::Standard(params),
        );
        let link = &links[0];
        assert!(link.starts_with(&format!("vless://{}@1.1.1.1:443?", UUID)));
        assert!(link.contains("host=example.com"));
        assert!(link.ends_with("#node1"));
        assert_eq!(
            link.as_str(),
            "vless://550e8400-e29b-41d4-a716-446655440000@1.1.1.1:443?encryption=none&security=tls&fp=random&type=ws&allowInsecure=1&sni=example.com&host=example.com&path=%2F%3Fed%3D2560#node1"
        );
    }

    #[test]
    fn test_standard_vless_default_remark_and_alpn() {
        let params = StandardParameters::builder()
            .host("example.com")
            .uuid(UUID)
            .sni("sni.example.com")
            .alpn("h3")
            .build();
        let links = synthesize(
            &[record("::1", "8443", None), record("a.com", "443", Some("香港 1"))],
            &LinkSource::Standard(params),
        );
        assert!(links[0].starts_with(&format!("vless://{}@[::1]:8443?", UUID)));
        assert!(links[0].contains("&sni=sni.example.com&alpn=h3&"));
        assert!(links[0].ends_with("#example.com-1"));
        assert!(links[1].ends_with("#%E9%A6%99%E6%B8%AF%201"));
    }

    #[test]
    fn test_standard_vmess_fields() {
        let params = StandardParameters::builder()
            .host("example.com")
            .uuid(UUID)
            .transport(Transport::Tcp)
            .format(LinkFormat::Vmess)
            .alpn("h3")
            .build();
        let links = synthesize(&[record("1.1.1.1", "2053", None)], &LinkSource::Standard(params));
        let fields = decode_vmess(&links[0]);

        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            vec!["v", "ps", "add", "port", "id", "aid", "scy", "net", "type", "tls", "sni", "alpn", "fp"]
        );
        assert_eq!(fields["ps"], Value::from("example.com-1"));
        assert_eq!(fields["port"], Value::from("2053"));
        assert_eq!(fields["net"], Value::from("tcp"));
        assert_eq!(fields["sni"], Value::from("example.com"));
    }

    #[test]
    fn test_standard_vmess_ws_carries_host_and_path() {
        let params = StandardParameters::builder()
            .host("example.com")
            .uuid(UUID)
            .path("/ws")
            .format(LinkFormat::Vmess)
            .build();
        let links = synthesize(&[record("1.1.1.1", "443", Some("n"))], &LinkSource::Standard(params));
        let fields = decode_vmess(&links[0]);
        assert_eq!(fields["host"], Value::from("example.com"));
        assert_eq!(fields["path"], Value::from("/ws"));
        assert_eq!(fields["v"], Value::from("2"));
        assert!(!fields.contains_key("alpn"));
    }

    #[test]
    fn test_empty_records() {
        let source = template_source("vless://U@h:1");
        assert!(synthesize(&[], &source).is_empty());
    }
}
