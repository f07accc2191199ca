//! 多源地址聚合 (Multi-source Aggregation)
//!
//! 并发抓取全部上游并等待每个任务落定，单个来源失败只贡献空文本。

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::interfaces::TextFetcher;

/// 单个来源的抓取结果
#[derive(Debug)]
pub struct SourceOutcome {
    pub url: String,
    /// 成功时为逗号拼接后的非空行
    pub result: Result<String>,
}

impl SourceOutcome {
    /// 失败视为空贡献
    pub fn contribution(&self) -> &str {
        self.result.as_deref().unwrap_or_default()
    }
}

/// 非空行以逗号拼接
fn join_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// 并发抓取所有来源，按输入顺序返回逐个结果
pub async fn fetch_all<F>(fetcher: &F, urls: &[String]) -> Vec<SourceOutcome>
where
    F: TextFetcher + ?Sized,
{
    let tasks = urls.iter().map(|url| async move {
        let result = fetcher.fetch_text(url).await.map(|text| join_lines(&text));
        match &result {
            Ok(text) => debug!("Source {} contributed {} bytes", url, text.len()),
            Err(e) => warn!("Failed to fetch from {}: {}", url, e),
        }
        SourceOutcome {
            url: url.clone(),
            result,
        }
    });
    join_all(tasks).await
}

/// 聚合所有来源为单个文本块，全部失败时返回空串
pub async fn aggregate<F>(fetcher: &F, urls: &[String]) -> String
where
    F: TextFetcher + ?Sized,
{
    if urls.is_empty() {
        return String::new();
    }

    let outcomes = fetch_all(fetcher, urls).await;
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.url.as_str())
        .collect();
    info!(
        failed = ?failed,
        "Address sources settled: {}/{} succeeded",
        outcomes.len() - failed.len(),
        outcomes.len()
    );

    outcomes
        .iter()
        .map(SourceOutcome::contribution)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
