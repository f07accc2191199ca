//! 文本抓取能力定义
//!
//! 聚合器只依赖这一接口，不关心底层是 HTTP 还是其他来源。

use async_trait::async_trait;

use crate::core::error::Result;

/// 抓取 URL 对应的原始文本
///
/// 非成功状态码与网络错误都应以 `Err` 返回，由调用方决定是否容忍。
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
