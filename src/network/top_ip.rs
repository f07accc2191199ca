//! 优选 IP 排行接口适配 (Top-IP Ranking Adapter)
//!
//! 排行接口返回 `{ data: { good: [{ ip, label, avgScore, .. }] } }`，此处将其
//! 转换为 `ip:port#label-score` 的逐行文本，以便接入普通的地址聚合流程。

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::core::error::{Result, SubError};
use crate::interfaces::TextFetcher;

/// 将排行接口的 JSON 转换为地址行
pub fn transform(json: &str, port: u16) -> Result<String> {
    let root: Value = serde_json::from_str(json)?;
    let Some(entries) = root
        .get("data")
        .and_then(|d| d.get("good"))
        .and_then(|g| g.as_array())
    else {
        return Ok(String::new());
    };

    let lines: Vec<String> = entries
        .iter()
        .filter_map(|item| {
            let ip = item.get("ip")?.as_str()?.trim();
            let label = item.get("label")?.as_str()?;
            let score = item.get("avgScore")?.as_f64()?;
            if ip.is_empty() || label.is_empty() {
                return None;
            }

            if is_ip_address(ip) || is_valid_domain(ip) {
                Some(format!("{}:{}#{}-{}", ip, port, label, format_score(score)))
            } else {
                warn!("Invalid address format: {}, skipping", ip);
                None
            }
        })
        .collect();

    Ok(lines.join("\n"))
}

/// 整数分值不带小数部分
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}

static IPV4: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap());
static IPV6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}$").unwrap());
/// 仅首段允许数字与连字符，其后各段均为至少两个字母
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z]{2,})+$").unwrap()
});

fn is_ip_address(s: &str) -> bool {
    IPV4.is_match(s) || IPV6.is_match(s)
}

fn is_valid_domain(s: &str) -> bool {
    DOMAIN.is_match(s)
}

/// 先抓取排行接口，再转换为地址行的装饰器
#[derive(Clone)]
pub struct TopIpFetcher<F> {
    inner: F,
    port: u16,
}

impl<F> TopIpFetcher<F> {
    pub fn new(inner: F, port: u16) -> Self {
        Self { inner, port }
    }
}

#[async_trait]
impl<F: TextFetcher> TextFetcher for TopIpFetcher<F> {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.inner.fetch_text(url).await?;
        transform(&body, self.port).map_err(|e| SubError::upstream(url, e))
    }
}
