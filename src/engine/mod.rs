//! 订阅生成引擎 (Subscription Engine)
//!
//! 地址文本 → [`AddressRecord`] → 链接 → Base64 订阅正文。整个流程同步且无副作用。

pub mod address;
pub mod synth;
pub mod template;

use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::model::{AddressRecord, LinkSource};
use crate::core::request::SubscribeRequest;
use crate::utils::codec;

/// 一次请求产出的链接集合
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscription {
    pub links: Vec<String>,
}

impl Subscription {
    /// 换行拼接的明文链接，非空时带一个结尾换行
    pub fn plain(&self) -> String {
        if self.links.is_empty() {
            return String::new();
        }
        let mut text = self.links.join("\n");
        text.push('\n');
        text
    }

    /// Base64 编码的订阅正文
    pub fn body(&self) -> String {
        codec::encode(self.plain())
    }
}

/// 解析请求来源：模板模式在此处完成模板校验
pub fn link_source(request: &SubscribeRequest) -> Result<LinkSource> {
    Ok(match request {
        SubscribeRequest::Standard(params) => LinkSource::Standard(params.clone()),
        SubscribeRequest::Template(link) => {
            let template = template::parse_template(link)?;
            debug!(format = %template.format(), "Template link accepted");
            LinkSource::Template(template)
        }
    })
}

/// 对已解析的地址条目生成订阅
pub fn build_from_records(request: &SubscribeRequest, records: &[AddressRecord]) -> Result<Subscription> {
    let source = link_source(request)?;
    let links = synth::synthesize(records, &source);
    info!("Generated {} links from {} address records", links.len(), records.len());
    Ok(Subscription { links })
}

/// 从原始地址文本生成订阅
pub fn build(request: &SubscribeRequest, raw_addresses: &str) -> Result<Subscription> {
    let records = address::parse(raw_addresses);
    debug!("Parsed {} address records", records.len());
    build_from_records(request, &records)
}
